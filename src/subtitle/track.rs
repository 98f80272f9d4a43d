//! Normalized subtitle track
//!
//! Both providers are merged into [`SubtitleTrack`]; what differs between
//! them lives on the [`TrackOrigin`] variant, tagged by `source` on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a track came from, with provider-specific fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum TrackOrigin {
    /// Direct search provider
    Wyzie {
        #[serde(rename = "flagUrl", default, skip_serializing_if = "Option::is_none")]
        flag_url: Option<String>,
        #[serde(rename = "isHearingImpaired", default)]
        is_hearing_impaired: bool,
    },
    /// Plain-blob provider; the payload is inlined as a `data:` URL
    Rainsubs,
}

/// One discovered subtitle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleTrack {
    pub id: String,
    /// Remote resource or inline `data:` URL
    pub url: String,
    pub language: String,
    /// Label shown in the subtitle menu
    pub display: String,
    pub format: String,
    #[serde(flatten)]
    pub origin: TrackOrigin,
}

impl SubtitleTrack {
    pub fn is_english(&self) -> bool {
        self.language.eq_ignore_ascii_case("en")
    }

    pub fn is_inline(&self) -> bool {
        self.url.starts_with("data:")
    }

    /// Normalize one loosely-typed search result.
    ///
    /// Entries without a URL are dropped.
    pub fn from_search_result(raw: &Value) -> Option<Self> {
        let url = field_string(raw, "url")?;
        let raw_language = field_string(raw, "language");
        let language = raw_language.clone().unwrap_or_else(|| "und".to_string());
        let id = field_string(raw, "id").unwrap_or_else(|| format!("{}-{}", language, url));
        let display = field_string(raw, "display")
            .or(raw_language)
            .unwrap_or_else(|| "Unknown".to_string());
        let format = field_string(raw, "format").unwrap_or_else(|| "srt".to_string());
        let is_hearing_impaired = raw
            .get("isHearingImpaired")
            .map(truthy)
            .unwrap_or(false);

        Some(Self {
            id,
            url,
            language,
            display,
            format,
            origin: TrackOrigin::Wyzie {
                flag_url: field_string(raw, "flagUrl"),
                is_hearing_impaired,
            },
        })
    }
}

/// Read a field as a non-empty string, stringifying numbers
fn field_string(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}
