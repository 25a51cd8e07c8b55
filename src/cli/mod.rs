use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-transcripts",
    about = "Extract plain-text transcripts from YouTube videos",
    version,
    long_about = "Resolves YouTube links into plain-text transcripts by trying several caption sources in turn: the player API, the transcript panel, and finally the watch page itself. Runs as a one-shot CLI or as a small HTTP service."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a config file (defaults to ./config.yaml, then the user config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP transcript service
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long, env = "TRANSCRIPTS_HOST")]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(long, env = "TRANSCRIPTS_PORT")]
        port: Option<u16>,
    },

    /// Fetch transcripts for one or more links and save them to files
    Fetch {
        /// YouTube links or video ids (comma or newline separated lists are accepted)
        #[arg(value_name = "LINKS")]
        links: Vec<String>,

        /// Read additional links from a file, one per line
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Directory to write transcripts into (defaults to app.output_dir, then the current directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the video id extracted from a link
    Id {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with video id, title and fetch time
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
