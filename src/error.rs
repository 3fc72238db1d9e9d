use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a submitted link could not be turned into a thumbnail set.
///
/// The display strings are shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Please enter a URL")]
    EmptyInput,

    #[error("Invalid YouTube URL format. Please use a valid video link.")]
    MalformedYouTubeLink,

    #[error("Please enter a valid YouTube URL")]
    NotAYouTubeLink,

    #[error("Could not extract video ID from URL")]
    ExtractionInconsistency,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("GUI error: {0}")]
    Gui(#[from] eframe::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
