use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use reqwest::{Client, Response};
use tokio::{fs, io::AsyncWriteExt, sync::mpsc::UnboundedSender};

use crate::{
    error::Result,
    model::{QualityTier, ThumbnailSet, VideoId},
    progress::{DownloadEvent, fraction},
};

/// Name the saved image gets: `youtube-thumbnail-<id>-<tier>.jpg`.
pub fn file_name(video_id: &VideoId, tier: QualityTier) -> String {
    format!("youtube-thumbnail-{video_id}-{tier}.jpg")
}

/// Saves the chosen tier of `set` into `folder`, creating it if needed.
///
/// Progress fractions go out on `events`; the caller reports the final
/// outcome. Returns the path written.
pub async fn download_thumbnail(
    client: &Client,
    set: &ThumbnailSet,
    tier: QualityTier,
    folder: &Path,
    events: &UnboundedSender<DownloadEvent>,
) -> Result<PathBuf> {
    let target = folder.join(file_name(set.video_id(), tier));
    fs::create_dir_all(folder).await?;
    download_to(client, &set.get(tier).url, &target, events).await?;
    info!("saved {} thumbnail to {}", tier, target.display());
    Ok(target)
}

/// Streams `url` into `<target>.part` and renames it to `target` once the
/// whole body is on disk. On any failure the partial file is removed and
/// `target` is left untouched.
async fn download_to(
    client: &Client,
    url: &str,
    target: &Path,
    events: &UnboundedSender<DownloadEvent>,
) -> Result<()> {
    debug!("GET {url}");
    let resp = client.get(url).send().await?.error_for_status()?;

    let partial = partial_path(target);
    if let Err(e) = write_body(resp, &partial, events).await {
        if let Err(rm) = fs::remove_file(&partial).await {
            warn!("could not remove {}: {rm}", partial.display());
        }
        return Err(e);
    }
    fs::rename(&partial, target).await?;
    Ok(())
}

async fn write_body(
    mut resp: Response,
    partial: &Path,
    events: &UnboundedSender<DownloadEvent>,
) -> Result<()> {
    let total = resp.content_length();
    let mut file = fs::File::create(partial).await?;
    let mut downloaded = 0u64;
    while let Some(chunk) = resp.chunk().await? {
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        if let Some(pct) = fraction(downloaded, total) {
            let _ = events.send(DownloadEvent::Progress(pct));
        }
    }
    file.flush().await?;
    Ok(())
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
