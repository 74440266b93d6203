//! Ask command handler
//!
//! Builds the provider and gateway, resolves the chat session, sends the
//! question, and records both sides of the exchange in the chat store.

use crate::cli::Commands;
use crate::commands::build_store;
use crate::config::Config;
use crate::error::{MentoraError, Result};
use crate::gateway::ChatGateway;
use crate::providers::{GeminiProvider, InlineAttachment};
use crate::store::{ChatMessage, ChatRecord, Sender};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

/// Handle the `ask` command
pub async fn handle_ask(config: &Config, command: Commands) -> Result<()> {
    let Commands::Ask {
        message,
        image,
        session,
        no_save,
    } = command
    else {
        unreachable!("handle_ask called with a non-ask command");
    };

    let provider = Arc::new(GeminiProvider::new(config.provider.gemini.clone())?);
    let gateway = ChatGateway::new(provider, &config.retry);
    let store = build_store(config)?;

    let attachment = match &image {
        Some(path) => Some(load_attachment(path)?),
        None => None,
    };

    let mut chat = match &session {
        Some(id) => store.get(id)?.ok_or_else(|| {
            MentoraError::NotFound(format!("No saved session with id {}", id))
        })?,
        None => ChatRecord::new(),
    };

    let user_image = attachment
        .as_ref()
        .map(|a| format!("data:{};base64,{}", a.mime_type, a.data));
    chat.push(ChatMessage::new(Sender::User, message.clone(), user_image));

    println!("{}", "Thinking...".dimmed());
    let response = gateway.send(&message, attachment).await?;

    chat.push(ChatMessage::new(Sender::Assistant, response.clone(), None));

    if no_save {
        tracing::debug!("Skipping history save for session {}", chat.session_id);
    } else {
        store.save(&chat).await?;
    }

    println!();
    println!("{}", response);
    println!();
    if !no_save {
        println!(
            "Session {} saved. Continue with {}.",
            chat.session_id.cyan(),
            format!("mentora ask --session {} <message>", chat.session_id).cyan()
        );
    }

    Ok(())
}

/// Read an image file and encode it for the provider
///
/// The MIME type is inferred from the file extension.
fn load_attachment(path: &Path) -> Result<InlineAttachment> {
    let mime_type = mime_for_extension(path).ok_or_else(|| {
        MentoraError::InvalidArgument(format!(
            "Unsupported image type: {}. Use png, jpg, gif, or webp.",
            path.display()
        ))
    })?;

    let bytes = std::fs::read(path)
        .map_err(|e| MentoraError::InvalidArgument(format!("Cannot read {}: {}", path.display(), e)))?;

    Ok(InlineAttachment::new(mime_type, STANDARD.encode(bytes)))
}

fn mime_for_extension(path: &Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => Some("image/png"),
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        _ => None,
    }
}
