//! deep-mind - Shared brain management for multi-project matrices

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use deep_mind::commands;

#[derive(Parser)]
#[command(name = "deep-mind")]
#[command(version, about = "Shared brain management for multi-project matrices")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new matrix
    Init {
        /// Matrix name (becomes a directory under the store root)
        matrix: String,
    },

    /// Register a project under a matrix
    Register {
        matrix: String,

        /// Project name
        project: String,

        /// Project path (defaults to the current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Remove a project from a matrix
    Unregister {
        matrix: String,
        project: String,
    },

    /// Show matrix status (detected from the current directory when omitted)
    Status {
        matrix: Option<String>,
    },

    /// List all matrices
    List,

    /// List projects registered under a matrix
    Projects {
        matrix: String,
    },

    /// Add a vertical to a matrix
    AddVertical {
        matrix: String,
        vertical: String,
    },

    /// Remove a vertical from a matrix
    RemoveVertical {
        matrix: String,
        vertical: String,
    },

    /// List verticals with a content size indicator
    ListVerticals {
        matrix: String,
    },

    /// Read brain content (one vertical, or all of them)
    Read {
        matrix: String,
        vertical: Option<String>,
    },

    /// Add a changelog entry
    Log {
        matrix: String,

        /// Entry text; words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Detect the project registered in the current directory
    Detect,

    /// Print the brain directory path for a matrix
    Path {
        matrix: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { matrix } => commands::init(&matrix)?,
        Commands::Register {
            matrix,
            project,
            path,
        } => commands::register(&matrix, &project, path)?,
        Commands::Unregister { matrix, project } => commands::unregister(&matrix, &project)?,
        Commands::Status { matrix } => commands::status(matrix.as_deref())?,
        Commands::List => commands::list()?,
        Commands::Projects { matrix } => commands::projects(&matrix)?,
        Commands::AddVertical { matrix, vertical } => commands::add_vertical(&matrix, &vertical)?,
        Commands::RemoveVertical { matrix, vertical } => {
            commands::remove_vertical(&matrix, &vertical)?
        }
        Commands::ListVerticals { matrix } => commands::list_verticals(&matrix)?,
        Commands::Read { matrix, vertical } => commands::read(&matrix, vertical.as_deref())?,
        Commands::Log { matrix, message } => commands::log(&matrix, &message.join(" "))?,
        Commands::Detect => commands::detect()?,
        Commands::Path { matrix } => commands::path(&matrix)?,
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(verbose >= 2))
        .init();
}
