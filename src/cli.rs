//! Command-line interface definitions for Mentora

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mentora: an AI learning assistant for your terminal
#[derive(Parser, Debug)]
#[command(name = "mentora")]
#[command(about = "Ask an AI tutor questions and keep your chat history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the assistant a question
    Ask {
        /// The question or message to send
        message: String,

        /// Attach an image file to the question
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Continue an existing chat session by id
        #[arg(short, long)]
        session: Option<String>,

        /// Do not save this exchange to chat history
        #[arg(long)]
        no_save: bool,
    },

    /// Manage saved chat history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List saved chat sessions, newest first
    List,

    /// Show the full transcript of one session
    Show {
        /// Session id to display
        id: String,
    },

    /// Delete one session
    Delete {
        /// Session id to delete
        id: String,
    },

    /// Delete every saved session
    DeleteAll {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
