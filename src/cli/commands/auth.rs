use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::services::LoginRequest;

pub async fn login(
    client: &ApiClient,
    request: LoginRequest,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let data = client.post("/auth/login", &request).await?;
    let token = field(&data, "access_token");

    match output_format {
        OutputFormat::Json => output_record(&output_format, &data),
        OutputFormat::Text => {
            output_success(
                &output_format,
                &format!("Logged in as {} (expires in {}s)", request.email, field(&data, "expires_in")),
                None,
            )?;
            println!("export NOTES_TOKEN={}", token);
            Ok(())
        }
    }
}
