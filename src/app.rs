//! Desktop window: paste a link, preview the thumbnails, save one.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use eframe::{App, Frame, egui};
use egui::{Color32, ColorImage, TextureOptions};
use log::warn;
use reqwest::Client;
use rfd::FileDialog;
use tokio::{
    runtime::Handle,
    sync::mpsc::{UnboundedReceiver, unbounded_channel},
};

use crate::{
    config::AppConfig,
    downloader::{download_thumbnail, file_name},
    fetcher::ThumbnailFetcher,
    model::{DownloadStatus, DownloadTask, QualityTier, RequestState, ThumbnailSet, VideoId},
    progress::DownloadEvent,
    thumbnail::fetch_preview,
    url_utils::is_youtube_url,
};

type PreviewKey = (VideoId, QualityTier);

enum Preview {
    Loading,
    Ready(egui::TextureHandle),
    Unavailable,
}

/// Application state for the GUI
pub struct ThumbnailApp {
    runtime: Handle,
    client: Client,
    fetcher: ThumbnailFetcher,
    /// Input field for the YouTube link
    url_input: String,
    /// Whether the current input matches an accepted link shape
    url_recognized: bool,
    /// Destination folder for downloads
    download_folder: String,
    selected_quality: QualityTier,
    default_quality: QualityTier,
    /// Saved or in-flight thumbnail downloads
    downloads: Vec<DownloadTask>,
    previews: HashMap<PreviewKey, Preview>,
    /// Decoded previews handed over from the blocking pool
    preview_results: Arc<Mutex<Vec<(PreviewKey, Option<ColorImage>)>>>,
    /// Event channels keyed by file name
    download_rxs: HashMap<String, UnboundedReceiver<DownloadEvent>>,
}

impl ThumbnailApp {
    pub fn new(runtime: Handle, config: AppConfig) -> Self {
        Self {
            runtime,
            client: Client::new(),
            fetcher: ThumbnailFetcher::new(config.fetch_delay),
            url_input: String::new(),
            url_recognized: false,
            download_folder: config.download_folder.display().to_string(),
            selected_quality: config.default_quality,
            default_quality: config.default_quality,
            downloads: Vec::new(),
            previews: HashMap::new(),
            preview_results: Arc::new(Mutex::new(Vec::new())),
            download_rxs: HashMap::new(),
        }
    }

    fn submit(&mut self) {
        self.selected_quality = self.default_quality;
        self.runtime.spawn(self.fetcher.submit(&self.url_input));
    }

    fn poll_downloads(&mut self) {
        for (name, rx) in self.download_rxs.iter_mut() {
            while let Ok(event) = rx.try_recv() {
                let Some(task) = self.downloads.iter_mut().find(|t| &t.file_name == name) else {
                    continue;
                };
                match event {
                    DownloadEvent::Progress(p) if p > task.progress => task.progress = p,
                    DownloadEvent::Progress(_) => {}
                    DownloadEvent::Finished(path) => {
                        task.progress = 1.0;
                        task.status = DownloadStatus::Done(path);
                    }
                    DownloadEvent::Failed(msg) => task.status = DownloadStatus::Failed(msg),
                }
            }
        }
    }

    fn poll_previews(&mut self, ctx: &egui::Context) {
        let Ok(mut pending) = self.preview_results.lock() else {
            return;
        };
        for (key, img) in pending.drain(..) {
            let preview = match img {
                Some(img) => {
                    let name = format!("{}-{}", key.0, key.1);
                    Preview::Ready(ctx.load_texture(name, img, TextureOptions::default()))
                }
                None => Preview::Unavailable,
            };
            self.previews.insert(key, preview);
        }
    }

    /// Starts fetching the preview for `tier` unless it's cached or in flight.
    fn request_preview(&mut self, ctx: &egui::Context, set: &ThumbnailSet, tier: QualityTier) {
        let key = (set.video_id().clone(), tier);
        if self.previews.contains_key(&key) {
            return;
        }
        self.previews.insert(key.clone(), Preview::Loading);

        let thumb = set.get(tier).clone();
        let results = Arc::clone(&self.preview_results);
        let ctx = ctx.clone();
        self.runtime.spawn_blocking(move || {
            let img = match fetch_preview(&thumb) {
                Ok(img) => Some(img),
                Err(e) => {
                    warn!("preview of {} failed: {e}", thumb.url);
                    None
                }
            };
            if let Ok(mut results) = results.lock() {
                results.push((key, img));
            }
            ctx.request_repaint();
        });
    }

    fn start_download(&mut self, set: &ThumbnailSet, tier: QualityTier) {
        let name = file_name(set.video_id(), tier);
        if self
            .downloads
            .iter()
            .any(|t| t.file_name == name && t.status == DownloadStatus::Downloading)
        {
            return;
        }
        self.downloads.retain(|t| t.file_name != name);
        self.downloads.push(DownloadTask {
            file_name: name.clone(),
            video_id: set.video_id().clone(),
            tier,
            status: DownloadStatus::Downloading,
            progress: 0.0,
        });

        let (tx, rx) = unbounded_channel();
        self.download_rxs.insert(name, rx);

        let client = self.client.clone();
        let set = set.clone();
        let folder = PathBuf::from(&self.download_folder);
        self.runtime.spawn(async move {
            let event = match download_thumbnail(&client, &set, tier, &folder, &tx).await {
                Ok(path) => DownloadEvent::Finished(path),
                Err(e) => {
                    warn!("download of {tier} for {} failed: {e}", set.video_id());
                    DownloadEvent::Failed(e.to_string())
                }
            };
            let _ = tx.send(event);
        });
    }

    fn downloads_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("downloads_panel").show(ctx, |ui| {
            ui.heading("Downloads");
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    let mut to_remove = vec![];

                    for task in &self.downloads {
                        ui.group(|ui| {
                            ui.label(format!("{} ({})", task.video_id, task.tier.label()));
                            match &task.status {
                                DownloadStatus::Downloading => {
                                    ui.label("Downloading");
                                    ui.add(egui::ProgressBar::new(task.progress).show_percentage());
                                }
                                DownloadStatus::Done(path) => {
                                    ui.label(format!("Saved {}", task.file_name));
                                    ui.horizontal(|ui| {
                                        if ui.button("Open Folder").clicked() {
                                            if let Some(folder) = path.parent() {
                                                open_folder(folder);
                                            }
                                        }
                                        if ui.add(egui::Button::new("❌").fill(Color32::RED)).clicked() {
                                            to_remove.push(task.file_name.clone());
                                        }
                                    });
                                }
                                DownloadStatus::Failed(msg) => {
                                    ui.colored_label(Color32::RED, format!("Failed: {msg}"));
                                    if ui.button("Dismiss").clicked() {
                                        to_remove.push(task.file_name.clone());
                                    }
                                }
                            }
                        });
                    }

                    if !to_remove.is_empty() {
                        self.downloads.retain(|t| !to_remove.contains(&t.file_name));
                        for name in to_remove {
                            self.download_rxs.remove(&name);
                        }
                    }
                });
        });
    }

    /// Refreshes the recognized badge and drops a shown error once the user
    /// starts correcting the link.
    fn on_input_edited(&mut self) {
        self.url_recognized = is_youtube_url(&self.url_input);
        if matches!(self.fetcher.current(), RequestState::Failed(_)) {
            self.fetcher.reset();
        }
    }

    fn link_input(&mut self, ui: &mut egui::Ui, pending: bool) {
        ui.label("Paste YouTube video URL:");
        ui.horizontal(|ui| {
            let input = ui.add_enabled(
                !pending,
                egui::TextEdit::singleline(&mut self.url_input)
                    .hint_text("https://www.youtube.com/watch?v=...")
                    .desired_width(420.0),
            );
            if input.changed() {
                self.on_input_edited();
            }
            let enter = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if self.url_recognized {
                ui.colored_label(Color32::GREEN, "✔ YouTube link");
            }
            if ui.add_enabled(!pending, egui::Button::new("Get Thumbnail")).clicked() || (enter && !pending) {
                self.submit();
            }
            if !self.url_input.is_empty() && ui.add_enabled(!pending, egui::Button::new("Clear")).clicked() {
                self.url_input.clear();
                self.url_recognized = false;
            }
        });
    }

    fn request_tier_previews(&mut self, ctx: &egui::Context, set: &ThumbnailSet) {
        for tier in QualityTier::ALL {
            self.request_preview(ctx, set, tier);
        }
    }

    /// One small preview per tier; clicking the image or its caption selects it.
    fn tier_picker(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, set: &ThumbnailSet) {
        self.request_tier_previews(ctx, set);

        ui.horizontal(|ui| {
            for (tier, thumb) in set.iter() {
                ui.vertical(|ui| {
                    let picked = match self.previews.get(&(set.video_id().clone(), tier)) {
                        Some(Preview::Ready(tex)) => ui
                            .add(egui::Image::new(tex).max_width(140.0).sense(egui::Sense::click()))
                            .clicked(),
                        Some(Preview::Unavailable) => {
                            ui.label("n/a");
                            false
                        }
                        _ => {
                            ui.spinner();
                            false
                        }
                    };
                    if picked {
                        self.selected_quality = tier;
                    }
                    let caption = format!("{} {}×{}", tier.label(), thumb.width, thumb.height);
                    ui.selectable_value(&mut self.selected_quality, tier, caption);
                });
            }
        });
    }

    fn result_view(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, set: &ThumbnailSet) {
        let tier = self.selected_quality;
        self.request_preview(ctx, set, tier);

        match self.previews.get(&(set.video_id().clone(), tier)) {
            Some(Preview::Ready(tex)) => {
                ui.add(egui::Image::new(tex).max_width(640.0));
            }
            Some(Preview::Unavailable) => {
                ui.label("Preview unavailable for this resolution.");
            }
            _ => {
                ui.spinner();
            }
        }

        ui.label("Select quality:");
        self.tier_picker(ui, ctx, set);

        ui.horizontal(|ui| {
            ui.label("Download folder:");
            ui.text_edit_singleline(&mut self.download_folder);
            if ui.button("Browse…").clicked() {
                if let Some(folder) = FileDialog::new().set_directory(&self.download_folder).pick_folder() {
                    self.download_folder = folder.display().to_string();
                }
            }
        });

        ui.horizontal(|ui| {
            if ui.button("Download").clicked() {
                self.start_download(set, self.selected_quality);
            }
            if ui.button("New link").clicked() {
                self.fetcher.reset();
            }
        });
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for ThumbnailApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_downloads();
        self.poll_previews(ctx);
        self.downloads_panel(ctx);

        let state = self.fetcher.current();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("YouTube Thumbnail Grabber");
            self.link_input(ui, state == RequestState::Pending);
            ui.separator();

            match &state {
                RequestState::Idle => {}
                RequestState::Pending => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Fetching thumbnails…");
                    });
                }
                RequestState::Failed(err) => {
                    ui.colored_label(Color32::RED, err.to_string());
                    if ui.button("Try again").clicked() {
                        self.fetcher.reset();
                    }
                }
                RequestState::Succeeded(set) => self.result_view(ui, ctx, set),
            }
        });

        // Pending state and download progress change without user input
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

fn open_folder(folder: &Path) {
    let folder = folder.to_path_buf();
    std::thread::spawn(move || {
        #[cfg(target_os = "windows")]
        let opener = "explorer";
        #[cfg(target_os = "macos")]
        let opener = "open";
        #[cfg(all(unix, not(target_os = "macos")))]
        let opener = "xdg-open";

        if let Err(e) = std::process::Command::new(opener).arg(&folder).spawn() {
            warn!("could not open {}: {e}", folder.display());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app() -> ThumbnailApp {
        let config = AppConfig {
            fetch_delay: Duration::ZERO,
            ..AppConfig::default()
        };
        ThumbnailApp::new(Handle::current(), config)
    }

    #[tokio::test]
    async fn editing_after_failure_clears_error() {
        let mut app = app();
        app.fetcher.submit("https://example.com/abc").await;
        assert!(matches!(app.fetcher.current(), RequestState::Failed(_)));

        app.url_input = "https://youtu.be/dQw4w9WgXcQ".to_owned();
        app.on_input_edited();

        assert_eq!(app.fetcher.current(), RequestState::Idle);
        assert!(app.url_recognized);
    }

    #[tokio::test]
    async fn picker_requests_every_tier_once() {
        let mut app = app();
        let id = crate::url_utils::extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
        // Nothing listens on the discard port, so the fetches fail fast
        let set = crate::thumbnail::build_thumbnail_set_on("http://127.0.0.1:9/vi", &id);
        let ctx = egui::Context::default();

        app.request_tier_previews(&ctx, &set);
        app.request_tier_previews(&ctx, &set);

        assert_eq!(app.previews.len(), 4);
        for tier in QualityTier::ALL {
            assert!(app.previews.contains_key(&(id.clone(), tier)), "{tier}");
        }
    }

    #[tokio::test]
    async fn editing_keeps_successful_result() {
        let mut app = app();
        app.fetcher.submit("https://youtu.be/dQw4w9WgXcQ").await;

        app.url_input = "not a link".to_owned();
        app.on_input_edited();

        assert!(matches!(app.fetcher.current(), RequestState::Succeeded(_)));
        assert!(!app.url_recognized);
    }
}
