use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::models::{DownloadReply, DownloadRequest, FormatsReply, Reply, SaveLink};

/// The HTTP service that resolves formats and produces files.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get_formats(&self, url: &str) -> Result<Reply<FormatsReply>, ClientError>;

    async fn download(&self, request: &DownloadRequest) -> Result<Reply<DownloadReply>, ClientError>;

    /// HEAD request against the video URL itself; returns the status code.
    async fn probe(&self, url: &str) -> Result<u16, ClientError>;
}

/// Follows a save link and stores the file locally.
#[async_trait]
pub trait FileSaver: Send + Sync {
    async fn save(&self, link: &SaveLink) -> Result<PathBuf>;
}

pub struct HttpBackend {
    client: Client,
    server: Url,
    output_dir: PathBuf,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut client_builder = Client::builder().connect_timeout(Duration::from_secs(30));

        if let Some(proxy_url) = config.proxy.as_deref() {
            client_builder = client_builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let client = client_builder
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            server: config.server.clone(),
            output_dir: config.output_dir.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.server
            .join(path)
            .map_err(|e| ClientError::Transport(format!("bad endpoint {}: {}", path, e)))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<Reply<T>, ClientError>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self.endpoint(path)?;
        debug!(%endpoint, "POST");

        let response = self.client.post(endpoint).json(body).send().await?;
        let status = response.status().as_u16();
        let body = response.json::<T>().await?;

        Ok(Reply { status, body })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_formats(&self, url: &str) -> Result<Reply<FormatsReply>, ClientError> {
        self.post_json("/get-formats", &serde_json::json!({ "url": url }))
            .await
    }

    async fn download(&self, request: &DownloadRequest) -> Result<Reply<DownloadReply>, ClientError> {
        self.post_json("/download", request).await
    }

    async fn probe(&self, url: &str) -> Result<u16, ClientError> {
        let response = self.client.head(url).send().await?;
        Ok(response.status().as_u16())
    }
}

#[async_trait]
impl FileSaver for HttpBackend {
    async fn save(&self, link: &SaveLink) -> Result<PathBuf> {
        let source = self
            .server
            .join(&link.href)
            .with_context(|| format!("Invalid file link: {}", link.href))?;
        let output_path = prepare_output_path(&self.output_dir, &link.filename)?;
        let partial_path = format!("{}.part", output_path.display());

        let response = self
            .client
            .get(source)
            .send()
            .await
            .context("GET request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP request failed: {}", response.status()));
        }

        let total_bytes = response.content_length();
        let pb = ProgressBar::new(total_bytes.unwrap_or(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:30} {bar:40} {bytes}/{total_bytes} ({bytes_per_sec})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(link.filename.clone());

        let written = write_partial(
            Path::new(&partial_path),
            response.bytes_stream(),
            total_bytes,
            &pb,
        )
        .await;
        let downloaded = match written {
            Ok(downloaded) => downloaded,
            Err(e) => {
                pb.abandon_with_message("Failed");
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&partial_path, &output_path) {
            let _ = fs::remove_file(&partial_path);
            return Err(e).context("Failed to rename completed file");
        }
        pb.finish_with_message("Done");
        info!(path = %output_path.display(), bytes = downloaded, "file saved");

        Ok(output_path)
    }
}

/// Streams `chunks` into `partial_path`. The partial file never outlives a failure.
async fn write_partial<S, B, E>(
    partial_path: &Path,
    chunks: S,
    expected: Option<u64>,
    pb: &ProgressBar,
) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let result = stream_to_file(partial_path, chunks, expected, pb).await;
    if result.is_err() {
        let _ = fs::remove_file(partial_path);
    }
    result
}

async fn stream_to_file<S, B, E>(
    partial_path: &Path,
    chunks: S,
    expected: Option<u64>,
    pb: &ProgressBar,
) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    futures::pin_mut!(chunks);
    let mut file = fs::File::create(partial_path).context("Failed to open output file")?;
    let mut downloaded = 0u64;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.context("Connection dropped while saving file")?;
        let bytes = chunk.as_ref();
        file.write_all(bytes).context("Failed to write output file")?;
        downloaded += bytes.len() as u64;
        pb.set_position(downloaded);
    }

    if let Some(expected) = expected {
        if downloaded != expected {
            return Err(anyhow!(
                "File truncated: expected {} bytes, got {} bytes",
                expected,
                downloaded
            ));
        }
    }

    Ok(downloaded)
}

/// Creates the output directory and returns a path for `filename` inside it.
///
/// Path separators and other characters that are unsafe in file names are
/// replaced, so a backend-supplied name cannot escape the directory.
pub fn prepare_output_path(output_dir: &Path, filename: &str) -> Result<PathBuf> {
    if !output_dir.exists() {
        fs::create_dir_all(output_dir).context("Failed to create output directory")?;
    }

    let mut safe: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    safe = safe.trim_matches(|c: char| c == '.' || c.is_whitespace()).to_string();
    if safe.is_empty() {
        safe = "download".to_string();
    }

    Ok(output_dir.join(safe))
}
