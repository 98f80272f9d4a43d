//! SRT to WebVTT conversion and WebVTT cue parsing
//!
//! Conversion is line oriented: an index line is discarded, a line with
//! `-->` is a time range, and the text runs until the next blank line.

use super::cues::{Cue, CueList};
use super::timestamp::{apply_offset_ms, format_vtt_timestamp, parse_timestamp_ms};

/// Separator between the start and end of a time range
const RANGE_SEPARATOR: &str = "-->";

/// Cue range used when the input has no timing information
const UNTIMED_RANGE: &str = "00:00:00.000 --> 00:10:00.000";

/// Input is treated as SRT-like when it contains a time range separator
pub fn is_srt_like(input: &str) -> bool {
    input.contains(RANGE_SEPARATOR)
}

fn split_range(line: &str) -> (u64, u64) {
    let mut parts = line.split(RANGE_SEPARATOR).map(str::trim);
    let start = parts.next().map(parse_timestamp_ms).unwrap_or(0);
    let end = parts.next().map(parse_timestamp_ms).unwrap_or(0);
    (start, end)
}

/// Convert subtitle text to WebVTT, shifting every timestamp by
/// `offset_secs` (clamped at zero).
///
/// Input without any time range becomes a single ten-minute cue.
pub fn convert_to_vtt(input: &str, offset_secs: f64) -> String {
    let text = input.replace('\r', "");

    if !is_srt_like(&text) {
        return format!("WEBVTT\n\n{}\n{}", UNTIMED_RANGE, text.replace('\n', " "));
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = vec!["WEBVTT".to_string(), String::new()];
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;

        // Index lines and stray text outside a block are skipped
        if !line.contains(RANGE_SEPARATOR) {
            continue;
        }

        let (start, end) = split_range(line);
        out.push(format!(
            "{} --> {}",
            format_vtt_timestamp(apply_offset_ms(start, offset_secs)),
            format_vtt_timestamp(apply_offset_ms(end, offset_secs))
        ));

        while i < lines.len() && !lines[i].trim().is_empty() {
            out.push(lines[i].to_string());
            i += 1;
        }
        out.push(String::new());
    }

    out.join("\n")
}

/// Parse WebVTT into a cue list ordered by start time
pub fn parse_vtt(vtt: &str) -> CueList {
    let text = vtt.replace('\r', "");
    let lines: Vec<&str> = text.split('\n').collect();
    let mut cues = Vec::new();
    let mut i = 0;

    if lines.first().is_some_and(|l| l.starts_with("WEBVTT")) {
        i = 1;
    }

    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;

        if line.is_empty() || !line.contains(RANGE_SEPARATOR) {
            continue;
        }

        let (start, end) = split_range(line);
        let mut text_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            text_lines.push(lines[i].to_string());
            i += 1;
        }
        cues.push(Cue::from_ms(start, end, text_lines));
    }

    CueList::new(cues)
}

/// Convert and re-parse in one step
pub fn build_cues(input: &str, offset_secs: f64) -> CueList {
    parse_vtt(&convert_to_vtt(input, offset_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::fixtures::SAMPLE_SRT;

    #[test]
    fn test_single_block_example() {
        let cues = build_cues("1\n00:00:01,000 --> 00:00:03,500\nHello\n\n", 0.0);
        assert_eq!(cues.len(), 1);
        assert_eq!(
            cues.as_slice()[0],
            Cue {
                start: 1.0,
                end: 3.5,
                lines: vec!["Hello".to_string()],
            }
        );
    }

    #[test]
    fn test_positive_offset() {
        let cues = build_cues("1\n00:00:01,000 --> 00:00:03,500\nHello\n\n", 2.0);
        let cue = &cues.as_slice()[0];
        assert_eq!(cue.start, 3.0);
        assert_eq!(cue.end, 5.5);
    }

    #[test]
    fn test_negative_offset_never_goes_below_zero() {
        let cues = build_cues(SAMPLE_SRT, -2.5);
        let first = &cues.as_slice()[0];
        assert_eq!(first.start, 0.0);
        assert_eq!(first.end, 1.0);
        assert!(cues.iter().all(|c| c.start >= 0.0 && c.end >= 0.0));
    }

    #[test]
    fn test_vtt_output_shape() {
        let vtt = convert_to_vtt(SAMPLE_SRT, 0.0);
        assert_eq!(
            vtt,
            "WEBVTT\n\n00:00:01.000 --> 00:00:03.500\nHello\n\n00:00:04.000 --> 00:00:06.000\nSecond line\nwraps here\n"
        );
    }

    #[test]
    fn test_crlf_and_multiline() {
        let input = "1\r\n00:00:01,000 --> 00:00:02,000\r\n<i>Hi</i>\r\nthere\r\n\r\n";
        let cues = build_cues(input, 0.0);
        assert_eq!(cues.as_slice()[0].lines, vec!["<i>Hi</i>", "there"]);
    }

    #[test]
    fn test_plain_text_becomes_ten_minute_cue() {
        let vtt = convert_to_vtt("just some\nwords", 5.0);
        assert_eq!(vtt, "WEBVTT\n\n00:00:00.000 --> 00:10:00.000\njust some words");

        let cues = parse_vtt(&vtt);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues.as_slice()[0].end, 600.0);
        assert_eq!(cues.as_slice()[0].lines, vec!["just some words"]);
    }

    #[test]
    fn test_webvtt_input_passes_through() {
        let input = "WEBVTT\n\n00:01.000 --> 00:02.500\nShort form\n";
        let cues = build_cues(input, 0.0);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues.as_slice()[0].start, 1.0);
        assert_eq!(cues.as_slice()[0].end, 2.5);
    }

    #[test]
    fn test_absurd_hours_do_not_panic() {
        let input = "1\n9999999999999999:00:00,000 --> 00:00:02,000\nHuge\n";
        let cues = build_cues(input, 1.0);
        assert_eq!(cues.as_slice()[0].start, 1.0);
        assert_eq!(cues.as_slice()[0].end, 3.0);
    }

    #[test]
    fn test_unsorted_input_is_ordered() {
        let input = "2\n00:00:05,000 --> 00:00:06,000\nB\n\n1\n00:00:01,000 --> 00:00:02,000\nA\n";
        let cues = build_cues(input, 0.0);
        assert_eq!(cues.as_slice()[0].lines, vec!["A"]);
        assert_eq!(cues.active_at(5.5).unwrap().lines, vec!["B"]);
    }
}
