mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "stylecast")]
#[command(about = "Virtual try-on jobs against the FASHN API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show configuration and settings status
    Status,

    /// Manage configuration and settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Manage stored reference (model) images
    Models {
        #[command(subcommand)]
        command: ModelsCommands,
    },

    /// Try a garment image on every stored model image
    TryOn {
        /// Garment image: a file path, an http(s) URL, or a data URL
        image: String,

        /// Save all result images to the downloads directory
        #[arg(long = "download-all")]
        download: bool,
    },

    /// Replace the model wearing the garment in an image
    Swap {
        /// Source image: a file path, an http(s) URL, or a data URL
        image: String,

        /// Save all result images to the downloads directory
        #[arg(long = "download-all")]
        download: bool,
    },

    /// Generate variations of the model in an image
    Variation {
        /// Source image: a file path, an http(s) URL, or a data URL
        image: String,

        /// Save all result images to the downloads directory
        #[arg(long = "download-all")]
        download: bool,
    },

    /// Scan an HTML document for likely product images
    Scan {
        /// Path to an HTML file
        file: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration and settings
    Show,
    /// Set the API key
    SetKey {
        /// FASHN API key
        key: String,
    },
    /// Override the API endpoint
    SetEndpoint {
        /// Base URL, e.g. https://api.fashn.ai/v1
        endpoint: String,
    },
    /// Set the prompt used for swap and variation jobs
    SetPrompt {
        /// Prompt text; omit to clear
        prompt: Option<String>,
    },
    /// Pin the generation seed for swap and variation jobs
    SetSeed {
        /// Seed value; omit to let the service randomize
        seed: Option<u64>,
    },
    /// Set the output format for swap and variation jobs
    SetFormat {
        /// png or jpeg
        format: String,
    },
}

#[derive(Subcommand)]
enum ModelsCommands {
    /// List stored model images
    List,
    /// Add a model image from a local file (transcoded before storing)
    Add {
        /// Path to an image file
        path: String,
    },
    /// Remove a model image by its 1-based position
    Remove {
        /// Position as shown by `models list`
        index: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Status => {
            commands::status::run().await?;
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                commands::config_cmd::show().await?;
            }
            ConfigCommands::SetKey { key } => {
                commands::config_cmd::set_key(&key).await?;
            }
            ConfigCommands::SetEndpoint { endpoint } => {
                commands::config_cmd::set_endpoint(&endpoint).await?;
            }
            ConfigCommands::SetPrompt { prompt } => {
                commands::config_cmd::set_prompt(prompt).await?;
            }
            ConfigCommands::SetSeed { seed } => {
                commands::config_cmd::set_seed(seed).await?;
            }
            ConfigCommands::SetFormat { format } => {
                commands::config_cmd::set_format(&format).await?;
            }
        },

        Commands::Models { command } => match command {
            ModelsCommands::List => {
                commands::models::list().await?;
            }
            ModelsCommands::Add { path } => {
                commands::models::add(&path).await?;
            }
            ModelsCommands::Remove { index } => {
                commands::models::remove(index).await?;
            }
        },

        Commands::TryOn { image, download } => {
            commands::actions::run(stylecast_core::ActionKind::TryOn, &image, download).await?;
        }
        Commands::Swap { image, download } => {
            commands::actions::run(stylecast_core::ActionKind::ModelSwap, &image, download)
                .await?;
        }
        Commands::Variation { image, download } => {
            commands::actions::run(stylecast_core::ActionKind::ModelVariation, &image, download)
                .await?;
        }

        Commands::Scan { file } => {
            commands::scan_cmd::run(&file).await?;
        }
    }

    Ok(())
}
