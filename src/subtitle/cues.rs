//! Timed cues for live captioning

use serde::Serialize;

use super::timestamp::ms_to_secs;

/// A time-bounded block of subtitle text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cue {
    /// Start in seconds
    pub start: f64,
    /// End in seconds
    pub end: f64,
    pub lines: Vec<String>,
}

impl Cue {
    pub fn from_ms(start_ms: u64, end_ms: u64, lines: Vec<String>) -> Self {
        Self {
            start: ms_to_secs(start_ms),
            end: ms_to_secs(end_ms),
            lines,
        }
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Cues ordered by start time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CueList {
    cues: Vec<Cue>,
}

impl CueList {
    /// Build a list, sorting by start time (stable for equal starts)
    pub fn new(mut cues: Vec<Cue>) -> Self {
        cues.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { cues }
    }

    /// First cue whose `[start, end]` contains `time`.
    ///
    /// A linear scan; overlapping cues resolve to the earliest start.
    pub fn active_at(&self, time: f64) -> Option<&Cue> {
        self.cues.iter().find(|cue| cue.contains(time))
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cue> {
        self.cues.iter()
    }

    pub fn as_slice(&self) -> &[Cue] {
        &self.cues
    }
}
