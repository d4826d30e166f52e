//! Assembly of the canonical report
//!
//! [`parse_report`] is the whole pipeline: classify once, run the extractors
//! for that shape, then [`normalize`] whatever came back.

use crate::checklist::extract_checklist;
use crate::extract::{
    Extraction, extract_legacy_recommendations, extract_page_speed, extract_recommendations,
    extract_score_from_segments, extract_structured,
};
use crate::payload::{ClassifiedPayload, RawReportPayload, classify};
use crate::sections::{Segment, split_sections};
use crate::types::{CanonicalReport, Sections};

/// Parse a raw payload into a canonical report.
///
/// Total over its input: unknown shapes, empty objects and unparseable text
/// all produce a report with absent scores and empty containers.
pub fn parse_report(payload: &RawReportPayload) -> CanonicalReport {
    let classified = classify(payload);
    tracing::debug!(kind = ?classified.kind(), "classified analysis payload");

    let extraction = match classified {
        ClassifiedPayload::Structured(map) => extract_structured(map),
        ClassifiedPayload::Text(text) => extract_text(text),
        ClassifiedPayload::Empty => Extraction::default(),
    };

    normalize(extraction)
}

/// Parse a bare report text
pub fn parse_report_text(text: &str) -> CanonicalReport {
    normalize(extract_text(text))
}

/// Run every text extractor over a markdown-like report
pub fn extract_text(text: &str) -> Extraction {
    let segments = split_sections(text);

    // A report without headings is the legacy score-then-lines format
    let recommendations = if segments.len() == 1 {
        Some(extract_legacy_recommendations(text))
    } else {
        extract_recommendations(&segments)
    };

    Extraction {
        score: extract_score_from_segments(&segments, text),
        page_speed_score: extract_page_speed(text),
        sections: Some(titled_sections(&segments)),
        recommendations,
        checklist: extract_checklist(&segments),
    }
}

/// Fill every missing field with its empty default
pub fn normalize(extraction: Extraction) -> CanonicalReport {
    let report = CanonicalReport {
        score: extraction.score,
        page_speed_score: extraction.page_speed_score,
        sections: extraction.sections.unwrap_or_default(),
        recommendations: extraction
            .recommendations
            .unwrap_or_default()
            .into_iter()
            .filter(|item| !item.trim().is_empty())
            .collect(),
        checklist: extraction
            .checklist
            .unwrap_or_default()
            .into_iter()
            .filter(|item| !item.category.trim().is_empty() && !item.status.trim().is_empty())
            .collect(),
    };

    tracing::debug!(
        score = ?report.score,
        page_speed = ?report.page_speed_score,
        sections = report.sections.len(),
        recommendations = report.recommendations.len(),
        checklist = report.checklist.len(),
        "normalized report"
    );

    report
}

/// Titled segments as prose; the untitled preamble only carries the headline
/// scores and is not a section of its own.
fn titled_sections(segments: &[Segment<'_>]) -> Sections {
    segments
        .iter()
        .filter_map(|segment| {
            let title = segment.title.as_deref()?;
            Some((title, segment.body.trim()))
        })
        .collect()
}
