use std::{fmt, path::PathBuf};

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::FetchError;

/// The 11-character token YouTube addresses a video by.
///
/// Only the link recognizer creates these, so a `VideoId` always came out of
/// an accepted link shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub(crate) fn from_capture(capture: &str) -> Self {
        Self(capture.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed thumbnail resolutions, ordered smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Default,
    Medium,
    High,
    Maxres,
}

impl QualityTier {
    pub const ALL: [QualityTier; 4] = [
        QualityTier::Default,
        QualityTier::Medium,
        QualityTier::High,
        QualityTier::Maxres,
    ];

    /// (width, height) in pixels
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            QualityTier::Default => (120, 90),
            QualityTier::Medium => (320, 180),
            QualityTier::High => (480, 360),
            QualityTier::Maxres => (1280, 720),
        }
    }

    /// File stem YouTube serves this tier under.
    pub fn file_stem(self) -> &'static str {
        match self {
            QualityTier::Default => "default",
            QualityTier::Medium => "mqdefault",
            QualityTier::High => "hqdefault",
            QualityTier::Maxres => "maxresdefault",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            QualityTier::Default => "default",
            QualityTier::Medium => "medium",
            QualityTier::High => "high",
            QualityTier::Maxres => "maxres",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityTier::Default => "Default",
            QualityTier::Medium => "Medium",
            QualityTier::High => "High",
            QualityTier::Maxres => "Max Resolution",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One image URL together with the size YouTube declares for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Every tier's thumbnail for a single video. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailSet {
    video_id: VideoId,
    /// Indexed by `QualityTier as usize`
    thumbnails: [Thumbnail; 4],
}

impl ThumbnailSet {
    pub(crate) fn new(video_id: VideoId, thumbnails: [Thumbnail; 4]) -> Self {
        Self {
            video_id,
            thumbnails,
        }
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn get(&self, tier: QualityTier) -> &Thumbnail {
        &self.thumbnails[tier as usize]
    }

    /// Tiers in ascending order with their thumbnails.
    pub fn iter(&self) -> impl Iterator<Item = (QualityTier, &Thumbnail)> {
        QualityTier::ALL.into_iter().zip(self.thumbnails.iter())
    }
}

/// Lifecycle of the most recent submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded(ThumbnailSet),
    Failed(FetchError),
}

/// Represents the current state of a thumbnail download
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadStatus {
    /// Download is in progress
    Downloading,
    /// Saved to disk
    Done(PathBuf),
    /// Request or write failed; holds the message shown to the user
    Failed(String),
}

/// Data structure for tracking a thumbnail download in the UI
pub struct DownloadTask {
    /// File name the image is saved under
    pub file_name: String,
    /// Which video the image belongs to
    pub video_id: VideoId,
    /// Which resolution was requested
    pub tier: QualityTier,
    /// Current status of the download
    pub status: DownloadStatus,
    /// Progress fraction (0.0 to 1.0)
    pub progress: f32,
}
