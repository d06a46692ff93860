//! conftree CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use conftree::Format;
use commands::SourceArgs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "conftree")]
#[command(version)]
#[command(about = "Read and edit configuration trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value at a path
    Get {
        #[command(flatten)]
        source: SourceArgs,

        /// Dotted path, e.g. `server.hosts.0` (the whole document if omitted)
        #[arg(default_value = "")]
        path: String,

        /// Output format for mappings and lists
        #[arg(long, short = 'f')]
        format: Option<Format>,
    },

    /// Print the whole resolved document
    Render {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format (defaults to the input file's format)
        #[arg(long, short = 'f')]
        format: Option<Format>,
    },

    /// List every leaf path
    Keys {
        /// YAML or JSON file
        file: PathBuf,

        /// Also show the environment variable for each key
        #[arg(long, value_name = "PREFIX")]
        env_prefix: Option<String>,
    },

    /// Assign a value and print the modified document
    Set {
        /// YAML or JSON file
        file: PathBuf,

        /// Dotted path, e.g. `server.hosts.0`
        path: String,

        /// Value, read as YAML (`8080` is a number, `'8080'` a string)
        value: String,

        /// Output format (defaults to the input file's format)
        #[arg(long, short = 'f')]
        format: Option<Format>,

        /// Write the result back to FILE instead of printing it
        #[arg(long, short = 'i')]
        in_place: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conftree=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Get {
            source,
            path,
            format,
        } => commands::get::execute(&source, &path, format),
        Commands::Render { source, format } => commands::render::execute(&source, format),
        Commands::Keys { file, env_prefix } => {
            commands::keys::execute(&file, env_prefix.as_deref())
        }
        Commands::Set {
            file,
            path,
            value,
            format,
            in_place,
        } => commands::set::execute(commands::set::SetArgs {
            file,
            path,
            value,
            format,
            in_place,
        }),
    }
}
