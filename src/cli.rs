use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_SERVER;
use crate::models::MediaFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Check the URL and exit
    Validate,
    /// List the resolutions the server offers
    Formats,
    /// Request the file and save it
    Download,
    /// Read URLs and commands from stdin
    Interactive,
}

#[derive(Parser, Debug)]
#[command(name = "mediavault")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Video URL (required except in interactive mode)
    pub url: Option<String>,

    /// Run mode
    #[arg(short, long, value_enum, default_value = "download")]
    pub mode: RunMode,

    /// Output container
    #[arg(short, long, value_enum, default_value = "mp3")]
    pub format: MediaFormat,

    /// Vertical resolution for mp4 (e.g. 720); first offered one if omitted
    #[arg(short, long)]
    pub quality: Option<String>,

    /// Download service root
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Output directory
    #[arg(short, long, default_value = "./downloads")]
    pub output: String,

    /// Seconds before a backend call is abandoned
    #[arg(short, long, default_value = "300")]
    pub timeout: u64,

    /// Debounce interval for interactive input, in milliseconds
    #[arg(long, default_value = "500")]
    pub debounce_ms: u64,

    /// HTTP proxy (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    pub proxy: Option<String>,
}
