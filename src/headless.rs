//! One-shot `--url` run: resolve the link, print every tier, optionally save one.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, info};
use reqwest::Client;
use tokio::sync::mpsc::unbounded_channel;

use crate::{
    cli::Cli,
    config::AppConfig,
    downloader::download_thumbnail,
    error::{FetchError, Result},
    fetcher::ThumbnailFetcher,
    model::{QualityTier, RequestState, ThumbnailSet},
    progress::DownloadEvent,
};

/// Prints the thumbnail table for `url` and saves one tier when `--download`
/// is set. A rejected link comes back as `Error::Fetch`, whose display is the
/// user-facing reason.
pub async fn run(cli: &Cli, url: &str, config: &AppConfig) -> Result<()> {
    let set = resolve_link(url).await?;
    for line in tier_lines(&set) {
        println!("{line}");
    }

    if cli.download {
        let tier = cli.quality.unwrap_or(config.default_quality);
        let folder = cli.out.clone().unwrap_or_else(|| config.download_folder.clone());
        let path = save(&Client::new(), &set, tier, &folder).await?;
        println!("saved\t{}", path.display());
    }

    Ok(())
}

/// Runs one submission to completion without the cosmetic delay.
pub async fn resolve_link(url: &str) -> std::result::Result<ThumbnailSet, FetchError> {
    let fetcher = ThumbnailFetcher::new(Duration::ZERO);
    fetcher.submit(url).await;

    match fetcher.current() {
        RequestState::Succeeded(set) => Ok(set),
        RequestState::Failed(err) => Err(err),
        RequestState::Idle | RequestState::Pending => Err(FetchError::ExtractionInconsistency),
    }
}

/// `video\t<id>` followed by `<tier>\t<w>x<h>\t<url>` per tier, smallest first.
pub fn tier_lines(set: &ThumbnailSet) -> Vec<String> {
    std::iter::once(format!("video\t{}", set.video_id()))
        .chain(
            set.iter()
                .map(|(tier, thumb)| format!("{tier}\t{}x{}\t{}", thumb.width, thumb.height, thumb.url)),
        )
        .collect()
}

/// Downloads one tier while logging progress as it arrives.
pub async fn save(client: &Client, set: &ThumbnailSet, tier: QualityTier, folder: &Path) -> Result<PathBuf> {
    let (tx, mut rx) = unbounded_channel();
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let DownloadEvent::Progress(p) = event {
                debug!("{:.0}%", p * 100.0);
            }
        }
    });

    let result = download_thumbnail(client, set, tier, folder, &tx).await;
    drop(tx);
    let _ = progress.await;

    let path = result?;
    info!("downloaded {tier} thumbnail");
    Ok(path)
}
