use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediatidy")]
#[command(
    author,
    version,
    about = "Audit audio codecs and sort downloads into a media library"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert the audio of a file or folder to the target codec
    Transcode {
        /// File or folder to check (prompted for when omitted)
        path: Option<PathBuf>,

        /// Show what would be converted without running ffmpeg
        #[arg(long)]
        dry_run: bool,
    },

    /// Probe a media file and show its audio codecs
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify downloads and move them into the library
    Sort {
        /// Download folder to sort (prompted for when omitted)
        source: Option<PathBuf>,

        /// Show what would be moved or deleted without touching anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the metadata guess and routing decision for a path
    Guess {
        /// File name or path to classify
        #[arg(required = true)]
        path: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
