//! # auditlens-core
//!
//! Core library for turning website design audit reports into a canonical,
//! displayable result.
//!
//! The analysis service has answered in several shapes over time: a
//! structured object (`score`, `pageSpeed`, `analysisSections`, `checklist`),
//! a markdown-like `analysis` text, and a legacy "score line then a few
//! lines" text. This library:
//! - classifies the payload once into one of those shapes
//! - splits text reports on `## ` headings
//! - extracts the design score, page speed score, recommendations and the
//!   checklist table
//! - normalizes everything into a [`CanonicalReport`] that always holds,
//!   with absent scores and empty containers for anything not found
//!
//! ## Features
//!
//! - `default`: The parsing engine only (no I/O, WASM-compatible)
//! - `client`: HTTP client for the analysis service
//!
//! ## Example
//!
//! ```
//! use auditlens_core::{RawReportPayload, parse_report};
//!
//! let payload = RawReportPayload::from_text(
//!     "Design Score: 82\n## Recommendations\n- Improve contrast",
//! );
//! let report = parse_report(&payload);
//!
//! assert_eq!(report.score, Some(82));
//! assert_eq!(report.recommendations, vec!["Improve contrast"]);
//! ```

pub mod checklist;
pub mod extract;
pub mod normalize;
pub mod payload;
pub mod request;
pub mod sections;
pub mod types;
pub mod url_utils;

#[cfg(feature = "client")]
pub mod client;

// Re-export commonly used types
pub use types::{CanonicalReport, ChecklistItem, Sections};

pub use normalize::{normalize, parse_report, parse_report_text};
pub use payload::{ClassifiedPayload, PayloadKind, RawReportPayload, classify};
pub use request::{AnalyzeRequest, DEFAULT_ENDPOINT, PageType};
pub use url_utils::normalize_target_url;

#[cfg(feature = "client")]
pub use client::{AnalysisClient, ClientConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_report_from_json_body() {
        let payload = RawReportPayload::from_json_str(
            r#"{"analysis": "Design Score: 67\n## Layout\nBalanced"}"#,
        )
        .unwrap();
        let report = parse_report(&payload);

        assert_eq!(report.score, Some(67));
        assert_eq!(report.sections.get("Layout"), Some("Balanced"));
    }

    #[test]
    fn test_parse_report_unknown_shapes() {
        for value in [json!(null), json!([]), json!({"status": "queued"}), json!(3)] {
            let report = parse_report(&RawReportPayload::from_value(value));
            assert_eq!(report, CanonicalReport::default());
        }
    }

    #[test]
    fn test_report_json_for_presentation() {
        let report = parse_report_text(
            "Design Score: 40\n## Advanced UX Checklist\n| Category | Status |\n|---|---|\n| Forms | Fail |",
        );
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["score"], 40);
        assert!(value["pageSpeedScore"].is_null());
        assert_eq!(value["checklist"], json!([{"category": "Forms", "status": "Fail"}]));
        assert!(value["sections"]["Advanced UX Checklist"].is_string());
    }
}
