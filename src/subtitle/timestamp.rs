//! Subtitle timestamp arithmetic
//!
//! Times are carried as integer milliseconds so conversions are exact at
//! millisecond precision.

use regex::Regex;
use std::sync::OnceLock;

fn full_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+):(\d+):(\d+)[,.](\d+)").expect("valid regex"))
}

fn short_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+):(\d+)[,.](\d+)").expect("valid regex"))
}

/// Fractional digits right-padded or truncated to exactly three
fn fraction_ms(digits: &str) -> u64 {
    let mut padded: String = digits.chars().take(3).collect();
    while padded.len() < 3 {
        padded.push('0');
    }
    padded.parse().unwrap_or(0)
}

fn num(s: &str) -> Option<u64> {
    s.parse().ok()
}

/// `h:m:s` plus milliseconds; `None` on overflow
fn total_ms(h: u64, m: u64, s: u64, ms: u64) -> Option<u64> {
    h.checked_mul(3_600_000)?
        .checked_add(m.checked_mul(60_000)?)?
        .checked_add(s.checked_mul(1000)?)?
        .checked_add(ms)
}

/// Parse `H:MM:SS,mmm` (or `.mmm`, or `MM:SS.mmm`) into milliseconds.
///
/// Anything unparseable, including values too large to represent, is 0.
pub fn parse_timestamp_ms(input: &str) -> u64 {
    try_parse_ms(input).unwrap_or(0)
}

fn try_parse_ms(input: &str) -> Option<u64> {
    if let Some(c) = full_pattern().captures(input) {
        return total_ms(num(&c[1])?, num(&c[2])?, num(&c[3])?, fraction_ms(&c[4]));
    }
    let c = short_pattern().captures(input)?;
    total_ms(0, num(&c[1])?, num(&c[2])?, fraction_ms(&c[3]))
}

/// Shift by a signed offset in seconds, clamping at zero
pub fn apply_offset_ms(ms: u64, offset_secs: f64) -> u64 {
    let offset = if offset_secs.is_finite() {
        (offset_secs * 1000.0).round() as i64
    } else {
        0
    };
    let shifted = i64::try_from(ms).unwrap_or(i64::MAX).saturating_add(offset);
    u64::try_from(shifted).unwrap_or(0)
}

/// Format as a zero-padded WebVTT timestamp `HH:MM:SS.mmm`
pub fn format_vtt_timestamp(ms: u64) -> String {
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1000;
    let milli = ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, milli)
}

pub fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}
