//! Player shell state
//!
//! Transient UI state for one embed page: transport controls and keyboard
//! shortcuts, the settings panel, and the session that owns the stream and
//! the caption overlay.

pub mod controls;
pub mod session;
pub mod settings;

pub use controls::{format_time, Key, Menu, PlayerCommand, PlayerControls};
pub use session::{PendingSwitch, PlayerSession, Toast};
pub use settings::{speed_label, DisplaySettings, SettingsTab, SubtitleSettings, PLAYBACK_SPEEDS};
