use crate::display::OutputFormat;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "oda-cli")]
#[command(about = "Ask a /query service questions in plain language and page through the results")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// Base URL of the query service; `/query` is appended
    #[arg(long, global = true, env = "ODA_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one question and print the plan and results
    Query {
        /// The question, in plain language
        question: String,
        /// Rows per page (defaults to the profile's default_limit)
        #[arg(short, long)]
        limit: Option<u32>,
        /// Offset of the first page
        #[arg(long, default_value = "0")]
        offset: u64,
        /// Follow next_offset for up to this many pages
        #[arg(long, default_value = "1")]
        pages: u32,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Interactive session: type questions, `:more` for the next page
    Shell {
        /// Rows per page (defaults to the profile's default_limit)
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set a profile value (api_url, default_limit, timeout_seconds)
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}
