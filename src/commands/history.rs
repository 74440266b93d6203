//! History command handlers

use crate::cli::HistoryCommands;
use crate::commands::build_store;
use crate::config::Config;
use crate::error::{MentoraError, Result};
use crate::store::Sender;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history subcommands
pub async fn handle_history(config: &Config, command: HistoryCommands) -> Result<()> {
    let store = build_store(config)?;

    match command {
        HistoryCommands::List => {
            let chats = store.load().await?;

            if chats.is_empty() {
                println!("{}", "No chat history found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "Session".bold(),
                "First Question".bold(),
                "Messages".bold(),
                "Last Updated".bold()
            ]);

            for chat in &chats {
                table.add_row(prettytable::row![
                    chat.session_id.cyan(),
                    chat.preview(40),
                    chat.messages.len(),
                    format_timestamp(&chat.timestamp)
                ]);
            }

            println!("\nChat History:");
            table.printstd();
            println!();
            println!(
                "Use {} to view a session.",
                "mentora history show <SESSION>".cyan()
            );
            println!();
        }
        HistoryCommands::Show { id } => {
            let chat = store
                .get(&id)?
                .ok_or_else(|| MentoraError::NotFound(format!("No saved session with id {}", id)))?;

            println!();
            println!(
                "Session {} ({} messages)",
                chat.session_id.cyan(),
                chat.messages.len()
            );
            println!();
            for message in &chat.messages {
                let label = match message.sender {
                    Sender::User => "You".green().bold(),
                    Sender::Assistant => "Assistant".blue().bold(),
                };
                println!("{} [{}]", label, format_timestamp(&message.timestamp));
                if message.image.is_some() {
                    println!("{}", "(image attached)".dimmed());
                }
                println!("{}", message.text);
                println!();
            }
        }
        HistoryCommands::Delete { id } => {
            if store.delete_one(&id).await? {
                println!("{}", format!("Deleted session {}", id).green());
            } else {
                println!("{}", format!("No saved session with id {}", id).yellow());
            }
        }
        HistoryCommands::DeleteAll { force } => {
            if !force {
                println!(
                    "This deletes all saved chats. Re-run with {} to confirm.",
                    "--force".cyan()
                );
                return Ok(());
            }
            store.delete_all().await?;
            println!("{}", "Deleted all chat history.".green());
        }
    }

    Ok(())
}

/// Render an RFC 3339 timestamp as a short local-style date
fn format_timestamp(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}
