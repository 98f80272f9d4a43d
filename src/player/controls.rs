//! Transport controls: play state, seeking, volume, fullscreen, menus,
//! keyboard shortcuts and control auto-hide.
//!
//! Time is injected as [`Instant`] values so auto-hide can be driven by a
//! tick loop or by tests without sleeping.

use serde::Serialize;
use std::time::{Duration, Instant};

use super::settings::{nearest_speed, DisplaySettings, SettingsTab};

/// Controls hide this long after the last pointer activity
pub const CONTROLS_HIDE_DELAY: Duration = Duration::from_secs(3);

/// Seek distance for the arrow keys, in seconds
pub const SEEK_STEP: f64 = 10.0;

/// Volume change for the arrow keys
pub const VOLUME_STEP: f64 = 0.1;

/// Pop-up menus; at most one is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Menu {
    Settings,
    Server,
    Subtitles,
}

/// Keys the player reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    K,
    Left,
    Right,
    Up,
    Down,
    F,
    M,
}

impl Key {
    /// Map a DOM-style key name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            " " | "space" | "spacebar" => Some(Key::Space),
            "k" => Some(Key::K),
            "arrowleft" => Some(Key::Left),
            "arrowright" => Some(Key::Right),
            "arrowup" => Some(Key::Up),
            "arrowdown" => Some(Key::Down),
            "f" => Some(Key::F),
            "m" => Some(Key::M),
            _ => None,
        }
    }
}

/// Effect the host media element should apply
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    Play,
    Pause,
    Seek(f64),
    SetVolume { volume: f64, muted: bool },
    SetMuted(bool),
    SetFullscreen(bool),
    SetPlaybackRate(f64),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerControls {
    pub playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub muted: bool,
    pub fullscreen: bool,
    pub active_menu: Option<Menu>,
    pub playback_rate: f64,
    /// Buffered end as a fraction of the duration
    pub buffered: f64,
    pub settings_tab: SettingsTab,
    pub controls_visible: bool,
    pub display: DisplaySettings,
    #[serde(skip)]
    last_activity: Option<Instant>,
}

impl Default for PlayerControls {
    fn default() -> Self {
        Self {
            playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            fullscreen: false,
            active_menu: None,
            playback_rate: 1.0,
            buffered: 0.0,
            settings_tab: SettingsTab::default(),
            controls_visible: false,
            display: DisplaySettings::default(),
            last_activity: None,
        }
    }
}

impl PlayerControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press. Keys typed into a text input are ignored.
    pub fn handle_key(&mut self, name: &str, in_text_input: bool) -> Option<PlayerCommand> {
        if in_text_input {
            return None;
        }
        let command = match Key::from_name(name)? {
            Key::Space | Key::K => self.toggle_play(),
            Key::Left => self.skip(-SEEK_STEP),
            Key::Right => self.skip(SEEK_STEP),
            Key::Up => self.adjust_volume(VOLUME_STEP),
            Key::Down => self.adjust_volume(-VOLUME_STEP),
            Key::F => self.toggle_fullscreen(),
            Key::M => self.toggle_mute(),
        };
        Some(command)
    }

    pub fn toggle_play(&mut self) -> PlayerCommand {
        self.playing = !self.playing;
        if self.playing {
            PlayerCommand::Play
        } else {
            PlayerCommand::Pause
        }
    }

    /// Seek to `time`, clamped to `[0, duration]`
    pub fn seek_to(&mut self, time: f64) -> PlayerCommand {
        let mut t = if time.is_finite() { time } else { 0.0 };
        if self.duration.is_finite() {
            t = t.min(self.duration);
        }
        self.current_time = t.max(0.0);
        PlayerCommand::Seek(self.current_time)
    }

    pub fn skip(&mut self, seconds: f64) -> PlayerCommand {
        self.seek_to(self.current_time + seconds)
    }

    /// Seek to a fraction of the progress bar
    pub fn seek_fraction(&mut self, fraction: f64) -> PlayerCommand {
        self.seek_to(fraction.clamp(0.0, 1.0) * self.duration)
    }

    /// Set the volume, clamped to `[0, 1]`. Zero mutes; any other level
    /// unmutes.
    pub fn set_volume(&mut self, volume: f64) -> PlayerCommand {
        let v = if volume.is_finite() { volume } else { 0.0 };
        self.volume = (v.clamp(0.0, 1.0) * 100.0).round() / 100.0;
        if self.volume == 0.0 {
            self.muted = true;
        } else if self.muted {
            self.muted = false;
        }
        PlayerCommand::SetVolume {
            volume: self.volume,
            muted: self.muted,
        }
    }

    pub fn adjust_volume(&mut self, delta: f64) -> PlayerCommand {
        self.set_volume(self.volume + delta)
    }

    pub fn toggle_mute(&mut self) -> PlayerCommand {
        self.muted = !self.muted;
        PlayerCommand::SetMuted(self.muted)
    }

    pub fn toggle_fullscreen(&mut self) -> PlayerCommand {
        PlayerCommand::SetFullscreen(!self.fullscreen)
    }

    /// Report a fullscreen change from the host; entering shows the controls
    pub fn on_fullscreen_change(&mut self, fullscreen: bool, now: Instant) {
        self.fullscreen = fullscreen;
        if fullscreen {
            self.show_controls(now);
        }
    }

    pub fn set_playback_rate(&mut self, rate: f64) -> PlayerCommand {
        self.playback_rate = nearest_speed(rate);
        PlayerCommand::SetPlaybackRate(self.playback_rate)
    }

    /// Host progress report
    pub fn on_time_update(&mut self, time: f64, buffered_end: Option<f64>) {
        self.current_time = time;
        if let Some(end) = buffered_end {
            self.buffered = if self.duration.is_finite() && self.duration > 0.0 {
                (end / self.duration).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
    }

    pub fn on_duration_change(&mut self, duration: f64) {
        self.duration = duration;
    }

    /// Fraction of the progress bar that is played
    pub fn progress(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Open `menu`, closing any other; toggling the open menu closes it
    pub fn toggle_menu(&mut self, menu: Menu) {
        self.active_menu = if self.active_menu == Some(menu) {
            None
        } else {
            Some(menu)
        };
    }

    /// A click landed outside every menu
    pub fn close_menus(&mut self) {
        self.active_menu = None;
    }

    pub fn set_settings_tab(&mut self, tab: SettingsTab) {
        self.settings_tab = tab;
    }

    /// Pointer activity over the player
    pub fn show_controls(&mut self, now: Instant) {
        self.controls_visible = true;
        self.last_activity = Some(now);
    }

    /// Advance the auto-hide timer
    pub fn tick(&mut self, now: Instant) {
        if !self.controls_visible || !self.display.auto_hide_controls {
            return;
        }
        if let Some(last) = self.last_activity {
            if now.saturating_duration_since(last) >= CONTROLS_HIDE_DELAY {
                self.controls_visible = false;
            }
        }
    }
}

/// Format seconds as `MM:SS`, or `H:MM:SS` from one hour up.
/// Non-finite input is `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "0:00".to_string();
    }
    let total = seconds.max(0.0).floor() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}
