//! Settings panel state: playback speed, display toggles and subtitle styling

use serde::{Deserialize, Serialize};

/// Playback speeds offered in the settings panel
pub const PLAYBACK_SPEEDS: [f64; 8] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

pub const FONT_FAMILIES: [&str; 6] = [
    "Inter",
    "Arial",
    "Helvetica",
    "Georgia",
    "Times New Roman",
    "Courier New",
];

pub const TEXT_COLOR_PRESETS: [&str; 6] = [
    "#ffffff", "#ffff00", "#00ff00", "#ff0000", "#0000ff", "#ff00ff",
];

pub const BACKGROUND_COLOR_PRESETS: [&str; 4] = ["#000000", "#333333", "#666666", "#ffffff"];

pub const MIN_FONT_SIZE: u32 = 16;
pub const MAX_FONT_SIZE: u32 = 48;

/// Step for the timing offset buttons, in seconds
pub const TIMING_STEP: f64 = 0.1;

/// Label for a playback speed: `Normal` for 1x, otherwise `{x}x`
pub fn speed_label(rate: f64) -> String {
    if rate == 1.0 {
        "Normal".to_string()
    } else {
        format!("{}x", rate)
    }
}

/// Snap to the nearest offered playback speed
pub fn nearest_speed(rate: f64) -> f64 {
    PLAYBACK_SPEEDS
        .iter()
        .copied()
        .min_by(|a, b| (a - rate).abs().total_cmp(&(b - rate).abs()))
        .unwrap_or(1.0)
}

fn round_tenths(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Settings tab currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsTab {
    #[default]
    Speed,
    Display,
    Subtitles,
}

/// Display toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub auto_hide_controls: bool,
    pub preview_thumbnails: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            auto_hide_controls: true,
            preview_thumbnails: true,
        }
    }
}

/// Caption styling and timing, kept in memory only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleSettings {
    pub font_size: u32,
    pub font_family: String,
    pub text_color: String,
    pub background_color: String,
    /// 0.0 to 1.0
    pub background_opacity: f64,
    /// Positive delays captions, negative shows them earlier
    pub timing_offset_seconds: f64,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            font_size: 24,
            font_family: "Inter".to_string(),
            text_color: "#ffffff".to_string(),
            background_color: "#000000".to_string(),
            background_opacity: 0.0,
            timing_offset_seconds: 0.0,
        }
    }
}

impl SubtitleSettings {
    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    }

    /// Unknown families are ignored
    pub fn set_font_family(&mut self, family: &str) -> bool {
        match FONT_FAMILIES.iter().find(|f| f.eq_ignore_ascii_case(family)) {
            Some(f) => {
                self.font_family = f.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_text_color(&mut self, color: &str) -> bool {
        set_preset(&mut self.text_color, &TEXT_COLOR_PRESETS, color)
    }

    pub fn set_background_color(&mut self, color: &str) -> bool {
        set_preset(&mut self.background_color, &BACKGROUND_COLOR_PRESETS, color)
    }

    /// Clamped to `[0, 1]` and snapped to tenths
    pub fn set_background_opacity(&mut self, opacity: f64) {
        let opacity = if opacity.is_finite() { opacity } else { 0.0 };
        self.background_opacity = round_tenths(opacity.clamp(0.0, 1.0));
    }

    /// Set the offset directly; non-numeric input counts as zero
    pub fn set_timing(&mut self, seconds: f64) {
        self.timing_offset_seconds = if seconds.is_finite() {
            round_tenths(seconds)
        } else {
            0.0
        };
    }

    /// Nudge the offset by `delta` seconds, rounding to tenths
    pub fn adjust_timing(&mut self, delta: f64) {
        self.set_timing(self.timing_offset_seconds + delta);
    }

    pub fn timing_label(&self) -> String {
        let t = self.timing_offset_seconds;
        if t > 0.0 {
            format!("{}s late", t)
        } else if t < 0.0 {
            format!("{}s early", t.abs())
        } else {
            "Perfect sync".to_string()
        }
    }

    /// Overlay background as `#rrggbb` plus a two-digit alpha byte
    pub fn overlay_background(&self) -> String {
        let alpha = (self.background_opacity * 255.0).round().clamp(0.0, 255.0) as u8;
        format!("{}{:02x}", self.background_color, alpha)
    }

    pub fn opacity_percent(&self) -> u32 {
        (self.background_opacity * 100.0).round() as u32
    }
}

fn set_preset(slot: &mut String, presets: &[&str], color: &str) -> bool {
    match presets.iter().find(|p| p.eq_ignore_ascii_case(color.trim())) {
        Some(p) => {
            *slot = p.to_string();
            true
        }
        None => false,
    }
}
