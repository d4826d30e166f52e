//! Raw payloads from the analysis service and their classification

use anyhow::{Context, Result};
use serde_json::{Map, Value as JsonValue};

/// Field holding the free-text report in text-shaped payloads
pub const ANALYSIS_FIELD: &str = "analysis";
/// Field holding pre-segmented prose in structured payloads
pub const SECTIONS_FIELD: &str = "analysisSections";
/// Field holding checklist records in structured payloads
pub const CHECKLIST_FIELD: &str = "checklist";

/// The untyped response body of the analysis service.
///
/// Nothing about its shape is assumed until [`classify`] looks at it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReportPayload(JsonValue);

impl RawReportPayload {
    pub fn from_value(value: JsonValue) -> Self {
        Self(value)
    }

    /// Decode a JSON response body.
    ///
    /// Invalid JSON is an error for the caller to handle; the parsing engine
    /// never sees it.
    pub fn from_json_str(body: &str) -> Result<Self> {
        let value: JsonValue =
            serde_json::from_str(body).context("analysis response is not valid JSON")?;
        Ok(Self(value))
    }

    /// Wrap a bare report text as a text-shaped payload
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(ANALYSIS_FIELD.to_string(), JsonValue::String(text.into()));
        Self(JsonValue::Object(map))
    }

    /// Accept a request body that is either JSON or bare report text.
    ///
    /// A body that looks like JSON (starts with `{`, `[` or `"`) must decode;
    /// truncated JSON is an error, not report text.
    pub fn from_body(body: &str) -> Result<Self> {
        if looks_like_json(body) {
            Self::from_json_str(body)
        } else {
            Ok(Self::from_text(body))
        }
    }

    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_value(self) -> JsonValue {
        self.0
    }
}

fn looks_like_json(body: &str) -> bool {
    body.trim_start().starts_with(['{', '[', '"'])
}

impl From<JsonValue> for RawReportPayload {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}

/// Which extraction path a payload takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Structured,
    Text,
    Empty,
}

/// A payload resolved to exactly one known shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifiedPayload<'a> {
    /// Pre-segmented object with typed `checklist` / `analysisSections`
    Structured(&'a Map<String, JsonValue>),
    /// Markdown-like (or legacy plain) report text
    Text(&'a str),
    /// Nothing usable
    Empty,
}

impl ClassifiedPayload<'_> {
    pub fn kind(&self) -> PayloadKind {
        match self {
            ClassifiedPayload::Structured(_) => PayloadKind::Structured,
            ClassifiedPayload::Text(_) => PayloadKind::Text,
            ClassifiedPayload::Empty => PayloadKind::Empty,
        }
    }
}

/// Decide which shape a payload has.
///
/// Never fails: anything unrecognized is [`ClassifiedPayload::Empty`].
pub fn classify(payload: &RawReportPayload) -> ClassifiedPayload<'_> {
    match payload.as_value() {
        JsonValue::Object(map) => {
            let structured_checklist = map
                .get(CHECKLIST_FIELD)
                .is_some_and(|value| value.is_array());
            let structured_sections = map
                .get(SECTIONS_FIELD)
                .is_some_and(|value| value.is_object());

            if structured_checklist || structured_sections {
                return ClassifiedPayload::Structured(map);
            }

            match map.get(ANALYSIS_FIELD).and_then(|value| value.as_str()) {
                Some(text) if !text.trim().is_empty() => ClassifiedPayload::Text(text),
                _ => ClassifiedPayload::Empty,
            }
        }
        // Some older backends returned the report text as the whole body
        JsonValue::String(text) if !text.trim().is_empty() => ClassifiedPayload::Text(text),
        _ => ClassifiedPayload::Empty,
    }
}
