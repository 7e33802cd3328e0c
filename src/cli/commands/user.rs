use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::services::CreateUserRequest;
use crate::types::Role;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Show your own profile")]
    Me,

    #[command(about = "List users in your tenant (admin only)")]
    List,

    #[command(about = "Invite a user into your tenant (admin only)")]
    Invite {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, env = "NOTES_INVITE_PASSWORD", help = "Initial password")]
        password: String,
        #[arg(long, default_value = "member", help = "Role: admin or member")]
        role: Role,
    },
}

pub async fn handle(cmd: UserCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Me => {
            let user = client.get("/users/me").await?;
            output_record(&output_format, &user)
        }
        UserCommands::List => {
            let data = client.get("/users").await?;
            let users = data.as_array().cloned().unwrap_or_default();
            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "users": users }))?);
                }
                OutputFormat::Text => {
                    println!("{:<8} {:<32} {:<8}", "ID", "EMAIL", "ROLE");
                    println!("{}", "-".repeat(50));
                    for user in &users {
                        println!("{:<8} {:<32} {:<8}", field(user, "id"), field(user, "email"), field(user, "role"));
                    }
                }
            }
            Ok(())
        }
        UserCommands::Invite { email, password, role } => {
            let user = client
                .post("/users", &CreateUserRequest { email, password, role })
                .await?;
            output_success(
                &output_format,
                &format!("Invited {} as {}", field(&user, "email"), field(&user, "role")),
                Some(user),
            )
        }
    }
}
