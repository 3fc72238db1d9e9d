use std::path::PathBuf;

/// Messages a running download sends back to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Progress(f32),
    Finished(PathBuf),
    Failed(String),
}

/// Share of the body received so far, or `None` when the server sent no length.
pub fn fraction(downloaded: u64, total: Option<u64>) -> Option<f32> {
    match total {
        Some(0) | None => None,
        Some(total) => Some((downloaded as f64 / total as f64).clamp(0.0, 1.0) as f32),
    }
}
