use std::path::PathBuf;

use clap::Parser;

use crate::model::QualityTier;

/// Preview and download YouTube video thumbnails.
///
/// Without `--url` the desktop window opens.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Config file (defaults to the per-user config.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Resolve this link without opening the window and print its thumbnails
    #[arg(long)]
    pub url: Option<String>,

    /// Also save one thumbnail (needs --url)
    #[arg(long, requires = "url")]
    pub download: bool,

    /// Tier to save with --download
    #[arg(long, value_enum, requires = "download")]
    pub quality: Option<QualityTier>,

    /// Folder to save into with --download
    #[arg(long, requires = "download")]
    pub out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn headless_download_args() {
        let cli = Cli::try_parse_from([
            "yt_thumbnail_grabber",
            "--url",
            "https://youtu.be/dQw4w9WgXcQ",
            "--download",
            "--quality",
            "medium",
            "--out",
            "/tmp/x",
        ])
        .unwrap();
        assert_eq!(cli.url.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
        assert!(cli.download);
        assert_eq!(cli.quality, Some(QualityTier::Medium));
        assert_eq!(cli.out, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn download_needs_url() {
        assert!(Cli::try_parse_from(["yt_thumbnail_grabber", "--download"]).is_err());
    }

    #[test]
    fn no_args_means_gui() {
        let cli = Cli::try_parse_from(["yt_thumbnail_grabber"]).unwrap();
        assert!(cli.url.is_none());
        assert!(!cli.download);
    }
}
