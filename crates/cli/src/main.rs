//! wordsplit CLI, the main entry point.
//!
//! Commands:
//! - `init`: Create the config directory, models directory, and config file
//! - `serve`: Start the HTTP API
//! - `segment`: Segment a single string
//! - `model`: Build model artifacts from word lists
//! - `status`: Show configuration and model status
//! - `doctor`: Diagnose setup problems
//! - `config`: Validate, show, or locate the configuration

use clap::{Parser, Subcommand};
use wordsplit_config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "wordsplit",
    about = "wordsplit: word segmentation service",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the models directory
    Init,

    /// Start the HTTP API server
    Serve {
        /// Override the bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Segment and format a single string
    Segment {
        /// Run-on text, e.g. "minhacasatemsp"
        text: String,

        /// Language code (pt, en)
        #[arg(short, long, default_value = "pt")]
        language: String,
    },

    /// Manage segmentation models
    Model {
        #[command(subcommand)]
        command: ModelCommands,
    },

    /// Show configuration and model status
    Status,

    /// Diagnose setup problems
    Doctor,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Build a tokenizer.json from a `word [count]` list
    Build {
        /// Language the model is for (pt, en)
        #[arg(short, long)]
        language: String,

        /// Word-frequency list, one `word [count]` per line
        #[arg(short, long)]
        words: std::path::PathBuf,

        /// Output path (defaults to where the server looks for the model)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Check the configuration for errors
    Validate,
    /// Print the effective configuration (secrets redacted)
    Show,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing. A broken config is reported by the command itself.
    let debug = cli.verbose || AppConfig::load().map(|c| c.debug).unwrap_or(false);
    let filter = if debug { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Serve { host, port } => commands::serve::run(host, port).await?,
        Commands::Segment { text, language } => commands::segment::run(&text, &language).await?,
        Commands::Model { command } => match command {
            ModelCommands::Build {
                language,
                words,
                output,
            } => commands::model::build(&language, &words, output).await?,
        },
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Config { command } => match command {
            ConfigCommands::Validate => commands::config_cmd::validate().await?,
            ConfigCommands::Show => commands::config_cmd::show().await?,
            ConfigCommands::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
