//! CLI argument parsing and subcommand dispatch.

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::{ClientConfig, RagChatClient};
use compact_str::CompactString;
use std::path::PathBuf;

pub mod chat;
pub mod config;
pub mod ingest;
pub mod serve;

/// Retrieval-augmented chat over your documents.
#[derive(Parser, Debug)]
#[command(name = "ragchat", about = "Retrieval-augmented chat over your documents")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Gateway base URL.
    #[arg(
        long,
        global = true,
        env = "RAGCHAT_GATEWAY_URL",
        default_value = "http://127.0.0.1:3000"
    )]
    pub gateway_url: CompactString,

    /// Ingestion backend base URL.
    #[arg(
        long,
        global = true,
        env = "BACKEND_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    pub backend_url: CompactString,

    /// Model requested for chat; the gateway default when unset.
    #[arg(long, global = true)]
    pub model: Option<CompactString>,

    /// Gateway config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the gateway server.
    Serve(serve::Serve),
    /// Start an interactive chat REPL.
    Chat,
    /// Ask a single question and print the streamed answer.
    Ask {
        /// The question.
        prompt: String,
    },
    /// Upload files (pdf, csv, docx, txt) to the ingestion backend.
    Upload {
        /// Files to upload; other extensions are skipped.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Process the files right after uploading.
        #[arg(long)]
        process: bool,
    },
    /// Process uploaded files into the vector store.
    Process,
    /// Ingest web pages.
    Urls {
        /// Page URLs.
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Ingest a YouTube transcript.
    Youtube {
        /// Video URL.
        url: String,
    },
    /// Ingest a Git repository.
    Git {
        /// Repository URL.
        url: String,
    },
    /// Delete all ingested context from the vector store.
    Delete,
    /// Manage gateway configuration.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

/// Config management subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a default gateway.toml.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Show the resolved configuration file.
    Show,
}

impl Cli {
    /// Client built from the global flags.
    pub fn client(&self) -> RagChatClient {
        RagChatClient::new(ClientConfig {
            gateway_url: self.gateway_url.clone(),
            backend_url: self.backend_url.clone(),
            model: self.model.clone(),
        })
    }

    /// Run the selected subcommand.
    pub async fn run(self) -> Result<()> {
        let client = self.client();
        match self.command {
            Command::Serve(serve) => serve.run(self.config.as_deref()).await,
            Command::Chat => chat::repl(client).await,
            Command::Ask { prompt } => chat::ask(client, &prompt).await,
            Command::Upload { files, process } => {
                ingest::upload(&client.backend(), files, process).await
            }
            Command::Process => ingest::process(&client.backend()).await,
            Command::Urls { urls } => ingest::urls(&client.backend(), urls).await,
            Command::Youtube { url } => ingest::youtube(&client.backend(), &url).await,
            Command::Git { url } => ingest::git(&client.backend(), &url).await,
            Command::Delete => ingest::delete(&client.backend()).await,
            Command::Config { action } => config::run(&action, self.config.as_deref()),
        }
    }
}
