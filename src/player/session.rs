//! Player session: everything one embed page load owns
//!
//! The session ties stream resolution, server switching, subtitle selection
//! and the caption overlay together. It is generic over [`StreamSource`] so
//! the failover behavior can be driven without a scraping proxy.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::catalog::CatalogData;
use crate::content::{ContentRef, EmbedOptions};
use crate::error::ResolveError;
use crate::stream::{resolve_with_fallback, Server, StreamDescriptor, StreamSource};
use crate::subtitle::{build_cues, CueList, SubtitleTrack, TrackLoader};

use super::controls::PlayerControls;
use super::settings::SubtitleSettings;

/// How long a transient notice stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// A transient notice that expires on its own
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

/// Token for a server switch in flight
#[derive(Debug)]
pub struct PendingSwitch {
    target: Server,
    previous: Server,
}

impl PendingSwitch {
    pub fn target(&self) -> Server {
        self.target
    }
}

pub struct PlayerSession<S: StreamSource + ?Sized> {
    source: Arc<S>,
    loader: Arc<TrackLoader>,
    content: ContentRef,
    options: EmbedOptions,
    name: Option<String>,

    stream: Option<StreamDescriptor>,
    server: Server,
    loading: bool,
    switching: bool,
    error: Option<String>,
    toast: Option<Toast>,
    started: bool,

    subtitles: Vec<SubtitleTrack>,
    selected: Option<String>,
    overlay_visible: bool,
    track_text: Option<Arc<str>>,
    cues: CueList,
    active_lines: Option<Vec<String>>,

    pub controls: PlayerControls,
    pub subtitle_settings: SubtitleSettings,
}

impl<S: StreamSource + ?Sized> PlayerSession<S> {
    pub fn new(
        source: Arc<S>,
        loader: Arc<TrackLoader>,
        content: ContentRef,
        options: EmbedOptions,
    ) -> Self {
        let server = options.server;
        Self {
            source,
            loader,
            content,
            options,
            name: None,
            stream: None,
            server,
            loading: false,
            switching: false,
            error: None,
            toast: None,
            started: false,
            subtitles: Vec::new(),
            selected: None,
            overlay_visible: false,
            track_text: None,
            cues: CueList::default(),
            active_lines: None,
            controls: PlayerControls::new(),
            subtitle_settings: SubtitleSettings::default(),
        }
    }

    pub fn content(&self) -> &ContentRef {
        &self.content
    }

    pub fn options(&self) -> &EmbedOptions {
        &self.options
    }

    pub fn stream(&self) -> Option<&StreamDescriptor> {
        self.stream.as_ref()
    }

    pub fn active_server(&self) -> Server {
        self.server
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_switching(&self) -> bool {
        self.switching
    }

    /// Blocking error shown instead of the player
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    // Stream

    /// Resolve the stream on the configured server, falling back once.
    ///
    /// Before playback starts a failure is a blocking error with a retry;
    /// afterwards it is only a toast.
    pub async fn load_stream(&mut self, now: Instant) -> Result<(), ResolveError> {
        self.loading = true;
        let result = resolve_with_fallback(self.source.as_ref(), &self.content, self.server).await;
        self.loading = false;

        match result {
            Ok(descriptor) => {
                info!("Stream ready on {}", descriptor.server);
                self.server = descriptor.server;
                self.stream = Some(descriptor);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Stream load failed for {}: {}", self.content.target_path(), e);
                if self.started {
                    self.show_toast(e.to_string(), now);
                } else {
                    self.error = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Manual retry after a blocking error
    pub async fn retry(&mut self, now: Instant) -> Result<(), ResolveError> {
        self.error = None;
        self.load_stream(now).await
    }

    /// Start a switch. `None` when `server` is already active or another
    /// switch is in flight.
    pub fn begin_switch(&mut self, server: Server) -> Option<PendingSwitch> {
        if server == self.server || self.switching {
            return None;
        }
        self.switching = true;
        Some(PendingSwitch {
            target: server,
            previous: self.server,
        })
    }

    /// Apply the outcome of a switch. On failure the current stream and
    /// server are kept and a toast is shown.
    pub fn finish_switch(
        &mut self,
        pending: PendingSwitch,
        result: Result<StreamDescriptor, ResolveError>,
        now: Instant,
    ) {
        self.switching = false;
        match result {
            Ok(descriptor) => {
                info!("Switched to {}", pending.target);
                self.server = pending.target;
                self.stream = Some(StreamDescriptor {
                    url: descriptor.url,
                    server: pending.target,
                });
                self.error = None;
            }
            Err(e) => {
                warn!("Switch to {} failed: {}", pending.target, e);
                self.show_toast(
                    format!(
                        "{} server unavailable. Reverting to {}.",
                        pending.target, pending.previous
                    ),
                    now,
                );
            }
        }
    }

    /// Switch to `server` without falling back
    pub async fn switch_server(&mut self, server: Server, now: Instant) -> bool {
        let Some(pending) = self.begin_switch(server) else {
            return false;
        };
        let result = self.source.resolve_on(&self.content, pending.target).await;
        let switched = result.is_ok();
        self.finish_switch(pending, result, now);
        switched
    }

    fn show_toast(&mut self, message: String, now: Instant) {
        self.toast = Some(Toast {
            message,
            expires_at: now + TOAST_DURATION,
        });
    }

    /// Advance timers: toast expiry and control auto-hide
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.toast = None;
        }
        self.controls.tick(now);
    }

    // Titles

    pub fn set_catalog(&mut self, data: &CatalogData) {
        let name = data.display_name();
        self.name = (!name.is_empty()).then(|| name.to_string());
    }

    pub fn title(&self) -> String {
        self.content.title(self.name.as_deref())
    }

    pub fn play_label(&self) -> String {
        self.content.play_label(self.name.as_deref())
    }

    pub fn show_play_button(&self) -> bool {
        !self.started
    }

    /// Dismiss the play button and start playback
    pub fn start_playback(&mut self) {
        self.started = true;
        if !self.controls.playing {
            self.controls.toggle_play();
        }
    }

    // Subtitles

    pub fn subtitles(&self) -> &[SubtitleTrack] {
        &self.subtitles
    }

    pub fn set_subtitles(&mut self, tracks: Vec<SubtitleTrack>) {
        self.subtitles = tracks;
        let still_listed = self
            .selected
            .as_ref()
            .is_some_and(|id| self.subtitles.iter().any(|t| &t.id == id));
        if !still_listed {
            self.clear_selection();
        }
    }

    pub fn selected_subtitle(&self) -> Option<&SubtitleTrack> {
        let id = self.selected.as_ref()?;
        self.subtitles.iter().find(|t| &t.id == id)
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn cues(&self) -> &CueList {
        &self.cues
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.overlay_visible = false;
        self.track_text = None;
        self.cues = CueList::default();
        self.active_lines = None;
    }

    /// Select a track by id, or none. Selecting shows the overlay; none
    /// hides it. Unknown ids change nothing.
    pub async fn select_subtitle(&mut self, id: Option<&str>) -> bool {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            self.clear_selection();
            return true;
        };
        let Some(track) = self.subtitles.iter().find(|t| t.id == id).cloned() else {
            return false;
        };

        self.selected = Some(track.id.clone());
        self.overlay_visible = true;

        match self.loader.load_text(&track.url).await {
            Ok(text) => self.track_text = Some(text),
            Err(e) => {
                warn!("Failed to load subtitle {}: {}", track.id, e);
                self.track_text = None;
            }
        }
        self.rebuild_cues();
        true
    }

    pub fn toggle_overlay(&mut self) {
        self.overlay_visible = !self.overlay_visible;
    }

    /// Change the timing offset and rebuild every cue
    pub fn set_timing_offset(&mut self, seconds: f64) {
        self.subtitle_settings.set_timing(seconds);
        self.rebuild_cues();
    }

    pub fn adjust_timing(&mut self, delta: f64) {
        self.subtitle_settings.adjust_timing(delta);
        self.rebuild_cues();
    }

    fn rebuild_cues(&mut self) {
        self.cues = match &self.track_text {
            Some(text) => build_cues(text, self.subtitle_settings.timing_offset_seconds),
            None => CueList::default(),
        };
        self.refresh_active_cue();
    }

    fn refresh_active_cue(&mut self) {
        self.active_lines = self
            .cues
            .active_at(self.controls.current_time)
            .map(|cue| cue.lines.clone());
    }

    /// Host progress report
    pub fn update_time(&mut self, time: f64) {
        self.controls.on_time_update(time, None);
        self.refresh_active_cue();
    }

    /// Caption lines to draw right now
    pub fn visible_caption(&self) -> Option<&[String]> {
        if !self.overlay_visible {
            return None;
        }
        self.active_lines.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::fixtures::SAMPLE_SRT;
    use crate::stream::resolver::tests::FakeSource;
    use crate::subtitle::BlobProvider;

    fn session(source: FakeSource) -> PlayerSession<FakeSource> {
        PlayerSession::new(
            Arc::new(source),
            Arc::new(TrackLoader::new(
                reqwest::Client::new(),
                &crate::config::SubtitleConfig::default(),
            )),
            ContentRef::episode("1396", "1", "1"),
            EmbedOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_load_falls_back_and_reports_secondary() {
        let mut s = session(FakeSource::new(None, Some("https://b/master.m3u8")));
        s.load_stream(Instant::now()).await.unwrap();

        assert_eq!(s.active_server(), Server::Vienna);
        assert_eq!(s.stream().unwrap().url, "https://b/master.m3u8");
        assert!(s.error().is_none());
    }

    #[tokio::test]
    async fn test_load_failure_sets_banner_and_retry_clears_it() {
        let mut s = session(FakeSource::new(None, None));
        assert!(s.load_stream(Instant::now()).await.is_err());
        let banner = s.error().unwrap();
        assert!(banner.contains("veronica") && banner.contains("vienna"));

        assert!(s.retry(Instant::now()).await.is_err());
        assert!(s.error().is_some());
        assert!(!s.is_loading());
    }

    #[tokio::test]
    async fn test_switch_failure_keeps_stream_and_toasts() {
        let now = Instant::now();
        let mut s = session(FakeSource::new(Some("https://a/master.m3u8"), None));
        s.load_stream(now).await.unwrap();

        assert!(!s.switch_server(Server::Vienna, now).await);
        assert_eq!(s.active_server(), Server::Veronica);
        assert_eq!(s.stream().unwrap().url, "https://a/master.m3u8");
        assert_eq!(
            s.toast().unwrap().message,
            "vienna server unavailable. Reverting to veronica."
        );

        s.tick(now + Duration::from_millis(2999));
        assert!(s.toast().is_some());
        s.tick(now + TOAST_DURATION);
        assert!(s.toast().is_none());
    }

    #[tokio::test]
    async fn test_switch_success_and_noops() {
        let now = Instant::now();
        let mut s = session(FakeSource::new(
            Some("https://a/master.m3u8"),
            Some("https://b/master.m3u8"),
        ));
        s.load_stream(now).await.unwrap();

        assert!(!s.switch_server(Server::Veronica, now).await);

        let pending = s.begin_switch(Server::Vienna).unwrap();
        assert!(s.is_switching());
        assert!(s.begin_switch(Server::Vienna).is_none());

        let result = s.source.resolve_on(s.content(), pending.target()).await;
        s.finish_switch(pending, result, now);
        assert!(!s.is_switching());
        assert_eq!(s.active_server(), Server::Vienna);
        assert_eq!(s.stream().unwrap().url, "https://b/master.m3u8");
    }

    #[tokio::test]
    async fn test_failure_after_start_is_toast() {
        let mut s = session(FakeSource::new(None, None));
        s.start_playback();
        assert!(!s.show_play_button());
        assert!(s.controls.playing);

        assert!(s.load_stream(Instant::now()).await.is_err());
        assert!(s.error().is_none());
        assert!(s.toast().is_some());
    }

    #[tokio::test]
    async fn test_subtitle_selection_and_timing() {
        let mut s = session(FakeSource::new(None, None));
        s.set_subtitles(vec![BlobProvider::inline_track(SAMPLE_SRT)]);

        assert!(s.select_subtitle(Some("rainsubs")).await);
        assert!(s.overlay_visible());
        assert_eq!(s.cues().len(), 2);

        s.update_time(2.0);
        assert_eq!(s.visible_caption().unwrap(), ["Hello".to_string()]);

        s.set_timing_offset(2.0);
        assert_eq!(s.cues().as_slice()[0].start, 3.0);
        assert!(s.visible_caption().is_none());

        s.toggle_overlay();
        s.update_time(4.0);
        assert!(s.visible_caption().is_none());
        s.toggle_overlay();
        assert_eq!(s.visible_caption().unwrap(), ["Hello".to_string()]);

        assert!(s.select_subtitle(None).await);
        assert!(!s.overlay_visible());
        assert!(s.cues().is_empty());
        assert!(s.selected_subtitle().is_none());
    }

    #[tokio::test]
    async fn test_unknown_subtitle_id_is_ignored() {
        let mut s = session(FakeSource::new(None, None));
        s.set_subtitles(vec![BlobProvider::inline_track(SAMPLE_SRT)]);
        assert!(!s.select_subtitle(Some("nope")).await);
        assert!(s.selected_subtitle().is_none());
    }

    #[test]
    fn test_title_helpers() {
        let s = session(FakeSource::new(None, None));
        assert_eq!(s.title(), "TV Show - S1E1");
        assert_eq!(s.play_label(), "TV Show S1 E1");
        assert!(s.show_play_button());
    }
}
