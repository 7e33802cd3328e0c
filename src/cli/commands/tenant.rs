use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Show your tenant, its plan and note usage")]
    Show,

    #[command(about = "Upgrade a tenant to the Pro plan (admin only)")]
    Upgrade {
        #[arg(help = "Tenant slug")]
        slug: String,
    },
}

pub async fn handle(cmd: TenantCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TenantCommands::Show => {
            let tenant = client.get("/tenants/me").await?;
            match output_format {
                OutputFormat::Json => output_record(&output_format, &tenant),
                OutputFormat::Text => {
                    println!("Tenant: {} ({})", field(&tenant, "name"), field(&tenant, "slug"));
                    println!("Plan:   {}", field(&tenant, "subscription_plan"));
                    let limit = tenant
                        .get("note_limit")
                        .and_then(|v| v.as_u64())
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "unlimited".to_string());
                    println!("Notes:  {} / {}", field(&tenant, "note_count"), limit);
                    Ok(())
                }
            }
        }
        TenantCommands::Upgrade { slug } => {
            let result = client.post(&format!("/tenants/{}/upgrade", slug), &json!({})).await?;
            output_success(&output_format, &field(&result, "message"), Some(result))
        }
    }
}
