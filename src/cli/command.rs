use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

use crate::notation::Notation;

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}\ngit:     {}\nlibrary: keyfinder {}\nbuilt:   {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown"),
        env!("KEYFINDER_VERSION"),
        env!("BUILD_TIMESTAMP"),
    )
});

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION.as_str(),
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Estimate the musical key of audio files",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress spinners during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Estimate the key of an audio file.
    Key(KeyArgs),

    /// Print the streams of an audio file
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Input audio file (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// How the key is printed.
    #[arg(short, long, value_enum, default_value_t = Notation::Standard)]
    pub notation: Notation,

    /// Major tone profile: 12 comma separated weights, tonic first.
    #[arg(long, value_name = "PROFILE", allow_hyphen_values = true)]
    pub major: Option<String>,

    /// Minor tone profile: 12 comma separated weights, tonic first.
    #[arg(long, value_name = "PROFILE", allow_hyphen_values = true)]
    pub minor: Option<String>,

    /// YAML file with `major`, `minor` and `octave_weights` lists.
    #[arg(long, value_name = "FILE")]
    pub profiles: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input audio file (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Print the report as YAML.
    #[arg(long)]
    pub yaml: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Level applied to the decoder library's own log targets.
    pub fn library_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug | LogLevel::Trace => self.to_level_filter(),
            _ => self.to_level_filter().min(log::LevelFilter::Error),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}
