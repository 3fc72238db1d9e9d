use eframe::egui::ColorImage;

use crate::{
    error::Result,
    model::{QualityTier, Thumbnail, ThumbnailSet, VideoId},
};

const IMAGE_HOST: &str = "https://img.youtube.com/vi";

/// Builds the URL for every tier of a video. Pure; nothing checks that the URLs resolve.
pub fn build_thumbnail_set(video_id: &VideoId) -> ThumbnailSet {
    build_thumbnail_set_on(IMAGE_HOST, video_id)
}

/// Same as `build_thumbnail_set` with a different image host prefix.
pub(crate) fn build_thumbnail_set_on(host: &str, video_id: &VideoId) -> ThumbnailSet {
    let thumbnails = QualityTier::ALL.map(|tier| {
        let (width, height) = tier.dimensions();
        Thumbnail {
            url: format!("{host}/{video_id}/{}.jpg", tier.file_stem()),
            width,
            height,
        }
    });
    ThumbnailSet::new(video_id.clone(), thumbnails)
}

/// Downloads and decodes a thumbnail for on-screen preview.
///
/// Blocking; run it on the runtime's blocking pool.
pub fn fetch_preview(thumbnail: &Thumbnail) -> Result<ColorImage> {
    let resp = reqwest::blocking::get(&thumbnail.url)?
        .error_for_status()?
        .bytes()?;
    // Decode into RGBA8 for egui
    let img = image::load_from_memory(&resp)?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, &img))
}
