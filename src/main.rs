use anyhow::{anyhow, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mediavault::cli::{Args, RunMode};
use mediavault::{
    translate, ClientConfig, DownloadOutcome, FormController, FormatsLoad, HttpBackend,
    MediaFormat, TerminalView, ValidationResult,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mediavault=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_args(&args)?;
    let backend = Arc::new(HttpBackend::new(&config)?);
    let controller = FormController::new(
        backend.clone(),
        backend,
        Arc::new(TerminalView::new()),
        config,
    );
    controller.initialize();

    if args.mode == RunMode::Interactive {
        return run_interactive(&controller).await;
    }

    let url = args
        .url
        .clone()
        .ok_or_else(|| anyhow!("URL argument required for {:?} mode", args.mode))?;

    match args.mode {
        RunMode::Validate => {
            controller.set_url(&url);
            if let ValidationResult::Valid {
                platform, video_id, ..
            } = validate(&controller).await?
            {
                println!("platform: {}, video id: {}", platform, video_id);
            }
        }
        RunMode::Formats => {
            controller.set_url(&url);
            validate(&controller).await?;
            if let FormatsLoad::Failed(message) = controller.load_formats(url.trim()).await {
                return Err(anyhow!(message));
            }
        }
        RunMode::Download => {
            if args.format == MediaFormat::Mp4 {
                controller.change_format(MediaFormat::Mp4).await;
            }
            controller.set_url(&url);
            validate(&controller).await?;

            if let Some(quality) = args.quality.as_deref() {
                if args.format == MediaFormat::Mp3 {
                    warn!(quality, "--quality only applies to mp4; ignoring");
                } else if !controller.select_quality(quality) {
                    return Err(anyhow!("Quality {}p is not offered for this video", quality));
                }
            }

            match controller.submit().await? {
                DownloadOutcome::Success { filename, .. } => {
                    println!("Saved {}", filename);
                }
                DownloadOutcome::Failure { raw_error_message } => {
                    return Err(anyhow!("Download failed: {}", translate(&raw_error_message)));
                }
            }
        }
        RunMode::Interactive => {}
    }

    Ok(())
}

async fn validate(controller: &FormController) -> Result<ValidationResult> {
    match controller.validate_input().await {
        Some(result @ ValidationResult::Valid { .. }) => Ok(result),
        Some(ValidationResult::Invalid { reason }) => Err(anyhow!(reason)),
        None => Err(anyhow!("Form is busy")),
    }
}

async fn run_interactive(controller: &FormController) -> Result<()> {
    println!("Paste a video URL. Commands: :mp3  :mp4  :q <height>  :go  :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            (":quit" | ":exit", _) => break,
            (":mp3", _) => {
                controller.change_format(MediaFormat::Mp3).await;
            }
            (":mp4", _) => {
                controller.change_format(MediaFormat::Mp4).await;
            }
            (":q", quality) => {
                if !controller.select_quality(quality) {
                    println!("Quality {} is not offered", quality);
                }
            }
            (":go", _) => {
                // Busy and invalid submits have already been reported on the status line.
                let _ = controller.submit().await;
            }
            (cmd, _) if cmd.starts_with(':') => println!("Unknown command {}", cmd),
            _ => {
                if let Some(ValidationResult::Valid { .. }) = controller.input_changed(line).await {
                    controller.field_blurred().await;
                }
            }
        }
    }

    Ok(())
}
