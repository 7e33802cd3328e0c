pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::services::LoginRequest;
use client::ApiClient;

#[derive(Parser)]
#[command(name = "notes")]
#[command(about = "Command-line client for the multi-tenant notes API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "NOTES_SERVER",
        default_value = "http://localhost:3000",
        help = "Base URL of the notes server"
    )]
    pub server: String,

    #[arg(long, global = true, env = "NOTES_TOKEN", hide_env_values = true, help = "Bearer token from `notes login`")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Log in and print an access token")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, env = "NOTES_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
        #[arg(long, help = "Tenant slug, when the email exists in several tenants")]
        tenant: Option<String>,
    },

    #[command(about = "Create, read, update and delete notes")]
    Note {
        #[command(subcommand)]
        cmd: commands::note::NoteCommands,
    },

    #[command(about = "Tenant information and plan upgrades")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },

    #[command(about = "User administration")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(cli.server, cli.token)?;

    match cli.command {
        Commands::Login { email, password, tenant } => {
            let request = LoginRequest { email, password, tenant };
            commands::auth::login(&client, request, output_format).await
        }
        Commands::Note { cmd } => commands::note::handle(cmd, &client, output_format).await,
        Commands::Tenant { cmd } => commands::tenant::handle(cmd, &client, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, &client, output_format).await,
    }
}
