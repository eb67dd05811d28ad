//! Client configuration

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::cli::Args;

pub const DEFAULT_SERVER: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the download service
    pub server: Url,

    /// Where saved files land
    pub output_dir: PathBuf,

    /// Optional HTTP proxy
    pub proxy: Option<String>,

    /// Deadline applied to every backend call
    pub request_timeout: Duration,

    /// Quiet period before live input is validated
    pub debounce: Duration,

    /// Quality sent when no resolution was selected
    pub default_quality: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: Url::parse(DEFAULT_SERVER).expect("default server URL is valid"),
            output_dir: PathBuf::from("./downloads"),
            proxy: None,
            request_timeout: Duration::from_secs(300),
            debounce: Duration::from_millis(500),
            default_quality: "1080".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let server = Url::parse(&args.server)
            .with_context(|| format!("Invalid server URL: {}", args.server))?;
        if !matches!(server.scheme(), "http" | "https") {
            return Err(anyhow!("Server URL must use http or https: {}", args.server));
        }
        if args.timeout == 0 {
            return Err(anyhow!("--timeout must be at least 1 second"));
        }

        Ok(Self {
            server,
            output_dir: PathBuf::from(&args.output),
            proxy: args.proxy.clone(),
            request_timeout: Duration::from_secs(args.timeout),
            debounce: Duration::from_millis(args.debounce_ms),
            ..Self::default()
        })
    }
}
