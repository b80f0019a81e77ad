use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rpg-xref")]
#[command(version, about = "List every use of every database entity in an RPG Maker MV project")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Project directory (the one containing `data/`)
    #[arg(short, long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Log level for diagnostics on stderr (RUST_LOG overrides)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

impl GlobalArgs {
    pub fn data_dir(&self) -> PathBuf {
        self.project.join("data")
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List referenced entity types with reference counts
    Types,

    /// List referenced ids of one entity type
    Ids {
        /// Entity type (switch, variable, actor, class, skill, item, weapon,
        /// armor, enemy, troop, state, animation, commonEvent, map)
        entity_type: String,
    },

    /// List every reference to one entity
    Refs {
        /// Entity type
        entity_type: String,

        /// Entity id
        id: u32,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse references interactively
    Browse,

    /// Write all references to a SQLite database
    Export {
        /// Output SQLite database path
        output_db: PathBuf,

        /// Only include these entity types (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Exclude these entity types (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,
    },
}

/// Log level for tracing output
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
