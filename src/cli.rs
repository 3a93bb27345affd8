use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputMode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe an audio/video file and write subtitles or a transcript
    Generate {
        /// Input audio or video file
        #[arg(short, long)]
        input: PathBuf,

        /// Target language code ("original" keeps the spoken language)
        #[arg(short, long)]
        lang: Option<String>,

        /// Output mode: subtitles (.srt) or text (.txt)
        #[arg(short, long)]
        mode: Option<OutputMode>,

        /// Output directory (defaults to the input file's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Override the media type detected from the file extension
        #[arg(long)]
        mime_type: Option<String>,

        /// Print the generated WebVTT preview track
        #[arg(long)]
        preview: bool,
    },

    /// List target languages
    Languages,

    /// Manage the saved API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum KeyAction {
    /// Save an API key, replacing any previous one
    Set {
        /// The API key
        key: String,
    },

    /// Show whether an API key is available and where it comes from
    Status,

    /// Remove the saved API key
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration
    Init {
        /// Destination file
        #[arg(short, long, default_value = "config.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
