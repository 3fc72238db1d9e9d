//! Drives a submitted link through Idle → Pending → Succeeded | Failed.

use std::{future::Future, sync::Arc, time::Duration};

use log::debug;
use tokio::sync::watch;

use crate::{
    error::FetchError,
    model::{RequestState, ThumbnailSet},
    thumbnail::build_thumbnail_set,
    url_utils::{extract_video_id, validate_url},
};

/// The published state plus the generation of the call that produced it.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub generation: u64,
    pub state: RequestState,
}

/// Cloneable handle around the single request state.
///
/// Every `submit` and `reset` bumps the generation. A submission only writes
/// its result back if the generation is still the one it started with, so a
/// late result from a superseded submission is dropped.
#[derive(Clone)]
pub struct ThumbnailFetcher {
    state: Arc<watch::Sender<Snapshot>>,
    delay: Duration,
}

impl ThumbnailFetcher {
    /// `delay` is a cosmetic pause before a valid link resolves; zero skips it.
    pub fn new(delay: Duration) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            state: Arc::new(state),
            delay,
        }
    }

    pub fn current(&self) -> RequestState {
        self.state.borrow().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    /// Moves to Pending right away and returns the work that settles this
    /// submission. The future must be driven (awaited or spawned) for the
    /// state to leave Pending.
    pub fn submit(&self, raw_url: &str) -> impl Future<Output = ()> + Send + use<> {
        let generation = self.advance(RequestState::Pending);
        debug!("submission #{generation} pending for {raw_url:?}");

        let this = self.clone();
        let raw_url = raw_url.to_owned();
        async move {
            let next = match this.resolve(&raw_url).await {
                Ok(set) => RequestState::Succeeded(set),
                Err(e) => RequestState::Failed(e),
            };
            this.settle(generation, next);
        }
    }

    /// Back to Idle, dropping any result or error and orphaning whatever is
    /// still in flight.
    pub fn reset(&self) {
        let generation = self.advance(RequestState::Idle);
        debug!("reset to idle (generation #{generation})");
    }

    async fn resolve(&self, raw_url: &str) -> Result<ThumbnailSet, FetchError> {
        validate_url(raw_url)?;
        let video_id = extract_video_id(raw_url).ok_or(FetchError::ExtractionInconsistency)?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(build_thumbnail_set(&video_id))
    }

    fn advance(&self, state: RequestState) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.state = state;
            generation = snapshot.generation;
        });
        generation
    }

    fn settle(&self, generation: u64, next: RequestState) {
        let applied = self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.state = next;
            true
        });
        if applied {
            debug!("submission #{generation} settled");
        } else {
            debug!("submission #{generation} superseded, result dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QualityTier;

    const DELAY: Duration = Duration::from_millis(500);

    fn succeeded_id(state: &RequestState) -> Option<String> {
        match state {
            RequestState::Succeeded(set) => Some(set.video_id().to_string()),
            _ => None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn starts_idle() {
        let fetcher = ThumbnailFetcher::new(DELAY);
        assert_eq!(fetcher.current(), RequestState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn valid_link_passes_through_pending_to_success() {
        let fetcher = ThumbnailFetcher::new(DELAY);
        let work = fetcher.submit("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(fetcher.current(), RequestState::Pending);

        work.await;
        let state = fetcher.current();
        assert_eq!(succeeded_id(&state).as_deref(), Some("dQw4w9WgXcQ"));
        if let RequestState::Succeeded(set) = state {
            assert_eq!(
                set.get(QualityTier::Maxres).url,
                "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stays_pending_until_delay_elapses() {
        let fetcher = ThumbnailFetcher::new(DELAY);
        let handle = tokio::spawn(fetcher.submit("https://youtu.be/dQw4w9WgXcQ"));

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(fetcher.current(), RequestState::Pending);

        handle.await.unwrap();
        assert!(succeeded_id(&fetcher.current()).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_links_fail_with_reason() {
        let fetcher = ThumbnailFetcher::new(DELAY);
        let cases = [
            ("", FetchError::EmptyInput),
            ("https://example.com/youtube-video", FetchError::MalformedYouTubeLink),
            ("https://example.com/abc", FetchError::NotAYouTubeLink),
        ];
        for (input, expected) in cases {
            let work = fetcher.submit(input);
            assert_eq!(fetcher.current(), RequestState::Pending);
            work.await;
            assert_eq!(fetcher.current(), RequestState::Failed(expected));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn new_submission_clears_previous_payload() {
        let fetcher = ThumbnailFetcher::new(Duration::ZERO);
        fetcher.submit("https://youtu.be/dQw4w9WgXcQ").await;
        assert!(succeeded_id(&fetcher.current()).is_some());

        let work = fetcher.submit("nope");
        assert_eq!(fetcher.current(), RequestState::Pending);
        work.await;
        assert_eq!(
            fetcher.current(),
            RequestState::Failed(FetchError::NotAYouTubeLink)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn later_submission_wins_over_earlier_one() {
        let fetcher = ThumbnailFetcher::new(DELAY);
        let first = fetcher.submit("https://youtu.be/aaaaaaaaaaa");
        let second = fetcher.submit("https://youtu.be/bbbbbbbbbbb");

        tokio::join!(first, second);
        assert_eq!(
            succeeded_id(&fetcher.current()).as_deref(),
            Some("bbbbbbbbbbb")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_result_arriving_late_is_dropped() {
        let fetcher = ThumbnailFetcher::new(DELAY);
        let first = fetcher.submit("https://youtu.be/aaaaaaaaaaa");
        let second = fetcher.submit("https://www.youtube.com/embed/bbbbbbbbbbb");

        second.await;
        assert_eq!(
            succeeded_id(&fetcher.current()).as_deref(),
            Some("bbbbbbbbbbb")
        );

        first.await;
        assert_eq!(
            succeeded_id(&fetcher.current()).as_deref(),
            Some("bbbbbbbbbbb")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_failure_does_not_overwrite_newer_success() {
        let fetcher = ThumbnailFetcher::new(Duration::ZERO);
        let first = fetcher.submit("garbage");
        fetcher.submit("https://youtu.be/bbbbbbbbbbb").await;
        first.await;
        assert_eq!(
            succeeded_id(&fetcher.current()).as_deref(),
            Some("bbbbbbbbbbb")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_returns_to_idle_from_every_state() {
        let fetcher = ThumbnailFetcher::new(Duration::ZERO);

        fetcher.reset();
        assert_eq!(fetcher.current(), RequestState::Idle);

        fetcher.submit("https://youtu.be/dQw4w9WgXcQ").await;
        fetcher.reset();
        assert_eq!(fetcher.current(), RequestState::Idle);

        fetcher.submit("").await;
        fetcher.reset();
        assert_eq!(fetcher.current(), RequestState::Idle);

        let _pending = fetcher.submit("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(fetcher.current(), RequestState::Pending);
        fetcher.reset();
        assert_eq!(fetcher.current(), RequestState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_orphans_in_flight_submission() {
        let fetcher = ThumbnailFetcher::new(DELAY);
        let work = fetcher.submit("https://youtu.be/dQw4w9WgXcQ");
        fetcher.reset();
        work.await;
        assert_eq!(fetcher.current(), RequestState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn extraction_never_disagrees_with_validation() {
        let fetcher = ThumbnailFetcher::new(Duration::ZERO);
        let inputs = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10s",
            "  youtu.be/dQw4w9WgXcQ  ",
            "http://youtube.com/embed/dQw4w9WgXcQ",
            "www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://youtube.com/watch?list=x",
            "https://example.com",
            "",
        ];
        for input in inputs {
            fetcher.submit(input).await;
            assert_ne!(
                fetcher.current(),
                RequestState::Failed(FetchError::ExtractionInconsistency),
                "{input:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_each_generation() {
        let fetcher = ThumbnailFetcher::new(Duration::ZERO);
        let mut rx = fetcher.subscribe();

        let work = fetcher.submit("https://youtu.be/dQw4w9WgXcQ");
        assert!(rx.has_changed().unwrap());
        {
            let snap = rx.borrow_and_update();
            assert_eq!(snap.generation, 1);
            assert_eq!(snap.state, RequestState::Pending);
        }

        work.await;
        assert!(rx.has_changed().unwrap());
        let snap = rx.borrow_and_update();
        assert_eq!(snap.generation, 1);
        assert!(succeeded_id(&snap.state).is_some());
    }
}
