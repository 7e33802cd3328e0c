use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum NoteCommands {
    #[command(about = "List notes in your tenant")]
    List {
        #[arg(long, help = "Number of notes to skip")]
        skip: Option<i64>,
        #[arg(long, help = "Maximum number of notes to return")]
        limit: Option<i64>,
    },

    #[command(about = "Show a single note")]
    Get {
        #[arg(help = "Note ID")]
        id: i64,
    },

    #[command(about = "Create a note")]
    Create {
        #[arg(help = "Note title")]
        title: String,
        #[arg(long, help = "Note body")]
        content: Option<String>,
    },

    #[command(about = "Update a note; omitted fields are left unchanged")]
    Update {
        #[arg(help = "Note ID")]
        id: i64,
        #[arg(long, help = "New title")]
        title: Option<String>,
        #[arg(long, help = "New body")]
        content: Option<String>,
    },

    #[command(about = "Delete a note")]
    Delete {
        #[arg(help = "Note ID")]
        id: i64,
    },
}

fn list_path(skip: Option<i64>, limit: Option<i64>) -> String {
    let mut params = Vec::new();
    if let Some(skip) = skip {
        params.push(format!("skip={}", skip));
    }
    if let Some(limit) = limit {
        params.push(format!("limit={}", limit));
    }
    if params.is_empty() {
        "/notes".to_string()
    } else {
        format!("/notes?{}", params.join("&"))
    }
}

pub async fn handle(cmd: NoteCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        NoteCommands::List { skip, limit } => {
            let data = client.get(&list_path(skip, limit)).await?;
            let notes = data.as_array().cloned().unwrap_or_default();
            if notes.is_empty() {
                return output_empty_collection(&output_format, "notes", "No notes found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "notes": notes }))?);
                }
                OutputFormat::Text => {
                    println!("{:<8} {:<8} {:<40} {}", "ID", "AUTHOR", "TITLE", "UPDATED");
                    println!("{}", "-".repeat(80));
                    for note in &notes {
                        println!(
                            "{:<8} {:<8} {:<40} {}",
                            field(note, "id"),
                            field(note, "user_id"),
                            field(note, "title"),
                            field(note, "updated_at")
                        );
                    }
                }
            }
            Ok(())
        }
        NoteCommands::Get { id } => {
            let note = client.get(&format!("/notes/{}", id)).await?;
            output_record(&output_format, &note)
        }
        NoteCommands::Create { title, content } => {
            let note = client.post("/notes", &json!({ "title": title, "content": content })).await?;
            output_success(&output_format, &format!("Created note {}", field(&note, "id")), Some(note))
        }
        NoteCommands::Update { id, title, content } => {
            let mut patch = Map::new();
            if let Some(title) = title {
                patch.insert("title".to_string(), Value::String(title));
            }
            if let Some(content) = content {
                patch.insert("content".to_string(), Value::String(content));
            }
            if patch.is_empty() {
                anyhow::bail!("nothing to update: pass --title and/or --content");
            }
            let note = client.put(&format!("/notes/{}", id), &Value::Object(patch)).await?;
            output_success(&output_format, &format!("Updated note {}", id), Some(note))
        }
        NoteCommands::Delete { id } => {
            let ack = client.delete(&format!("/notes/{}", id)).await?;
            output_success(&output_format, &field(&ack, "message"), None)
        }
    }
}
