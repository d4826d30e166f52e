//! Field extractors for scores, recommendations and structured fields

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use crate::payload::{CHECKLIST_FIELD, SECTIONS_FIELD};
use crate::sections::{Segment, find_segment, split_sections};
use crate::types::{ChecklistItem, Sections};

/// Keyword identifying the recommendations segment title
pub const RECOMMENDATIONS_KEYWORD: &str = "recommendation";

/// Upper bound on recommendations pulled from a legacy (heading-less) report
pub const LEGACY_RECOMMENDATION_LIMIT: usize = 5;

/// Highest valid score
const MAX_SCORE: u32 = 100;

/// Explicit design-score labels: "Design Score: 82", "**Overall score** 74/100",
/// "Design Score (out of 100): 82"
static RE_DESIGN_SCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:design|overall)[\s*_-]*score\b[\s*_]*(?:\([^)\n]*\))?[\s*_]*[:=\-]?[\s*_]*(\d+)",
    )
    .expect("invalid design score regex")
});

/// A bare "Score 70" label; only counts when no other word qualifies it
static RE_BARE_SCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bscore\b[\s*_]*(?:\([^)\n]*\))?[\s*_]*[:=\-]?[\s*_]*(\d+)")
        .expect("invalid score regex")
});

/// Words that may precede a bare "score" without making it some other score
const SCORE_DETERMINERS: [&str; 4] = ["your", "the", "final", "total"];

static RE_PAGE_SPEED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bpage[\s-]*speed(?:[\s-]*score)?\b[\s*_]*[:=\-]?[\s*_]*(\d+)")
        .expect("invalid page speed regex")
});

static RE_FIRST_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("invalid integer regex"));

/// Bullet, asterisk, plus, dot and numbered list prefixes
static RE_LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-*+•]|\d+[.)])(?:\s+|$)").expect("invalid list marker regex")
});

/// Fields pulled out of a payload before normalization. `None` means the
/// extractor had nothing to offer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub score: Option<u8>,
    pub page_speed_score: Option<u8>,
    pub sections: Option<Sections>,
    pub recommendations: Option<Vec<String>>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

/// Locate the design score in a report.
///
/// See [`extract_score_from_segments`]; this splits the text itself.
pub fn extract_score(text: &str) -> Option<u8> {
    extract_score_from_segments(&split_sections(text), text)
}

/// Locate the design score, searching the preamble before the whole text.
///
/// Within each scope an explicit design/overall label wins over a bare
/// "Score" label, and a bare label qualified by another word ("SEO score",
/// "Accessibility Score") never counts. Without any label, the first
/// integer on the first non-empty line is used. Numbers above 100 are never
/// accepted as a score.
pub fn extract_score_from_segments(segments: &[Segment<'_>], text: &str) -> Option<u8> {
    let preamble = segments
        .first()
        .filter(|segment| segment.is_preamble())
        .map(|segment| segment.body);

    preamble
        .into_iter()
        .chain(std::iter::once(text))
        .find_map(labelled_score)
        .or_else(|| leading_line_score(text))
}

/// Locate an explicit "Page Speed" labelled score
pub fn extract_page_speed(text: &str) -> Option<u8> {
    RE_PAGE_SPEED
        .captures_iter(text)
        .find_map(|caps| parse_score(caps.get(1)?.as_str()))
}

/// Recommendations from the first segment titled with the recommendations keyword
pub fn extract_recommendations(segments: &[Segment<'_>]) -> Option<Vec<String>> {
    let segment = find_segment(segments, RECOMMENDATIONS_KEYWORD)?;
    Some(segment.non_empty_lines().filter_map(strip_list_marker).collect())
}

/// Recommendations from a heading-less report: the non-empty lines after the
/// score line, capped at [`LEGACY_RECOMMENDATION_LIMIT`]. Without a score
/// line, the first line is only skipped when it supplied the fallback score.
pub fn extract_legacy_recommendations(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let skip = match lines.iter().position(|line| has_score_label(line)) {
        Some(index) => index + 1,
        None => usize::from(
            lines
                .first()
                .is_some_and(|line| leading_line_score(line).is_some()),
        ),
    };

    lines
        .into_iter()
        .skip(skip)
        .filter(|line| !RE_PAGE_SPEED.is_match(line))
        .filter_map(strip_list_marker)
        .take(LEGACY_RECOMMENDATION_LIMIT)
        .collect()
}

/// Read already-typed fields from a structured payload.
///
/// Nothing is parsed out of prose here; the producer already segmented it.
pub fn extract_structured(map: &Map<String, JsonValue>) -> Extraction {
    Extraction {
        score: map.get("score").and_then(json_score),
        page_speed_score: map.get("pageSpeed").and_then(json_score),
        sections: map
            .get(SECTIONS_FIELD)
            .and_then(|value| value.as_object())
            .map(structured_sections),
        recommendations: map
            .get("recommendations")
            .and_then(|value| value.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
        checklist: map
            .get(CHECKLIST_FIELD)
            .and_then(|value| value.as_array())
            .map(|items| items.iter().filter_map(structured_checklist_item).collect()),
    }
}

fn structured_sections(map: &Map<String, JsonValue>) -> Sections {
    let mut sections = Sections::new();
    for (name, value) in map {
        let content = match value {
            JsonValue::String(text) => text.clone(),
            JsonValue::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            _ => continue,
        };
        sections.insert(name.as_str(), content);
    }
    sections
}

fn structured_checklist_item(value: &JsonValue) -> Option<ChecklistItem> {
    let category = value.get("category")?.as_str()?.trim();
    let status = value.get("status")?.as_str()?.trim();
    if category.is_empty() || status.is_empty() {
        return None;
    }
    Some(ChecklistItem::new(category, status))
}

/// Integers, integral floats and numeric strings within `0..=100`
fn json_score(value: &JsonValue) -> Option<u8> {
    match value {
        JsonValue::Number(number) => {
            if let Some(int) = number.as_u64() {
                return u8::try_from(int).ok().filter(|score| u32::from(*score) <= MAX_SCORE);
            }
            let float = number.as_f64()?;
            if float.fract() != 0.0 || !(0.0..=f64::from(MAX_SCORE)).contains(&float) {
                return None;
            }
            Some(float as u8)
        }
        JsonValue::String(text) => parse_score(text.trim()),
        _ => None,
    }
}

fn parse_score(digits: &str) -> Option<u8> {
    let value: u32 = digits.parse().ok()?;
    if value > MAX_SCORE {
        return None;
    }
    u8::try_from(value).ok()
}

/// Digit runs after score labels in `scope`: explicit labels first, then
/// unqualified bare ones, each in text order
fn score_label_values<'a>(scope: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let explicit = RE_DESIGN_SCORE
        .captures_iter(scope)
        .filter_map(|caps| caps.get(1));
    let bare = RE_BARE_SCORE
        .captures_iter(scope)
        .filter(move |caps| {
            caps.get(0)
                .is_some_and(|label| is_unqualified(scope, label.start()))
        })
        .filter_map(|caps| caps.get(1));

    explicit.chain(bare).map(|digits| digits.as_str())
}

fn labelled_score(scope: &str) -> Option<u8> {
    score_label_values(scope).find_map(parse_score)
}

fn has_score_label(line: &str) -> bool {
    score_label_values(line).next().is_some()
}

/// Whether the word before a bare "score" leaves it meaning the design score
fn is_unqualified(scope: &str, label_start: usize) -> bool {
    let line_start = scope[..label_start].rfind('\n').map_or(0, |index| index + 1);
    let before = scope[line_start..label_start]
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_'));

    if !before.ends_with(char::is_alphanumeric) {
        return true;
    }
    let word = before
        .rsplit(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_lowercase();
    SCORE_DETERMINERS.contains(&word.as_str())
}

/// Legacy fallback: the first integer on the first non-empty line, skipping
/// denominators such as "/100" and "out of 100". A line labelled with some
/// other score (or page speed) has no fallback.
fn leading_line_score(text: &str) -> Option<u8> {
    let line = text.lines().map(str::trim).find(|line| !line.is_empty())?;
    if RE_BARE_SCORE.is_match(line) || RE_PAGE_SPEED.is_match(line) {
        return None;
    }
    let digits = RE_FIRST_INTEGER
        .find_iter(line)
        .find(|digits| !is_denominator(&line[..digits.start()]))?;
    parse_score(digits.as_str())
}

fn is_denominator(before: &str) -> bool {
    let before = before.trim_end().to_lowercase();
    before.ends_with('/') || before.ends_with("out of")
}

fn strip_list_marker(line: &str) -> Option<String> {
    let stripped = RE_LIST_MARKER.replace(line.trim(), "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_score_with_label_and_colon() {
        assert_eq!(extract_score("Design Score: 82\nsomething 12"), Some(82));
    }

    #[test]
    fn test_score_without_colon() {
        assert_eq!(extract_score("Score 70\nFix spacing"), Some(70));
    }

    #[test]
    fn test_score_bold_and_out_of_hundred() {
        assert_eq!(extract_score("**Design Score:** 91/100"), Some(91));
    }

    #[test]
    fn test_score_zero_is_real() {
        assert_eq!(extract_score("Design Score: 0"), Some(0));
    }

    #[test]
    fn test_score_ignores_page_speed_label() {
        let text = "Page Speed Score: 45\nDesign Score: 77";
        assert_eq!(extract_score(text), Some(77));
        assert_eq!(extract_page_speed(text), Some(45));
    }

    #[test]
    fn test_score_first_label_wins() {
        assert_eq!(extract_score("Overall score: 60\nDesign score: 90"), Some(60));
    }

    #[test]
    fn test_score_skips_out_of_range_label() {
        assert_eq!(extract_score("Score: 250\nDesign Score: 88"), Some(88));
    }

    #[test]
    fn test_score_falls_back_to_first_line_integer() {
        assert_eq!(extract_score("Rated 65 of 100\nmore text 12"), Some(65));
    }

    #[test]
    fn test_score_absent_without_digits() {
        assert_eq!(extract_score("Looks great\nNo numbers here"), None);
        assert_eq!(extract_score("Design Score: unknown"), None);
        assert_eq!(extract_score(""), None);
    }

    #[test]
    fn test_score_fallback_only_uses_first_line() {
        assert_eq!(extract_score("Summary\nUpdated 12 images"), None);
    }

    #[test]
    fn test_page_speed_absent_without_label() {
        assert_eq!(extract_page_speed("Design Score: 82"), None);
        assert_eq!(extract_page_speed("PageSpeed: 58"), Some(58));
        assert_eq!(extract_page_speed("Page-speed score - 33"), Some(33));
    }

    #[test]
    fn test_recommendations_from_segment() {
        let text = "Score: 80\n## Recommendations\n- Improve contrast\n\n* Add CTA\n1. Compress images\n2) Fix nav\n## Layout\nGood";
        let segments = split_sections(text);

        assert_eq!(
            extract_recommendations(&segments),
            Some(vec![
                "Improve contrast".to_string(),
                "Add CTA".to_string(),
                "Compress images".to_string(),
                "Fix nav".to_string(),
            ])
        );
    }

    #[test]
    fn test_recommendations_keep_duplicates_and_bare_lines() {
        let text = "## Key Recommendations\nAdd alt text\n- Add alt text\n-\n";
        let segments = split_sections(text);

        assert_eq!(
            extract_recommendations(&segments),
            Some(vec!["Add alt text".to_string(), "Add alt text".to_string()])
        );
    }

    #[test]
    fn test_recommendations_missing_segment() {
        let segments = split_sections("## Layout\nFine");
        assert_eq!(extract_recommendations(&segments), None);
    }

    #[test]
    fn test_legacy_recommendations_after_score_line() {
        let text = "Score 70\nFix spacing\nAdd alt text";
        assert_eq!(
            extract_legacy_recommendations(text),
            vec!["Fix spacing".to_string(), "Add alt text".to_string()]
        );
    }

    #[test]
    fn test_legacy_recommendations_bounded() {
        let text = "Score 70\na\nb\nc\nd\ne\nf\ng";
        let recs = extract_legacy_recommendations(text);
        assert_eq!(recs.len(), LEGACY_RECOMMENDATION_LIMIT);
        assert_eq!(recs.first().map(String::as_str), Some("a"));
        assert_eq!(recs.last().map(String::as_str), Some("e"));
    }

    #[test]
    fn test_legacy_recommendations_skip_page_speed_line() {
        let text = "Design Score: 70\nPage Speed: 40\n- Lazy load images";
        assert_eq!(
            extract_legacy_recommendations(text),
            vec!["Lazy load images".to_string()]
        );
    }

    #[test]
    fn test_structured_extraction() {
        let value = json!({
            "score": 74,
            "pageSpeed": "61",
            "analysisSections": {"Layout": "Looks clean", "Copy": ["Short", "Clear"], "Bad": 3},
            "checklist": [
                {"category": "Footer", "status": "Pass"},
                {"category": "", "status": "Pass"},
                {"category": "Header"},
                "not a record"
            ]
        });
        let extraction = extract_structured(value.as_object().unwrap());

        assert_eq!(extraction.score, Some(74));
        assert_eq!(extraction.page_speed_score, Some(61));
        let sections = extraction.sections.unwrap();
        assert_eq!(sections.get("Layout"), Some("Looks clean"));
        assert_eq!(sections.get("Copy"), Some("Short\nClear"));
        assert_eq!(sections.get("Bad"), None);
        assert_eq!(
            extraction.checklist,
            Some(vec![ChecklistItem::new("Footer", "Pass")])
        );
        assert_eq!(extraction.recommendations, None);
    }

    #[test]
    fn test_structured_scores_out_of_range_or_fractional() {
        let value = json!({"score": 140, "pageSpeed": 61.5});
        let extraction = extract_structured(value.as_object().unwrap());
        assert_eq!(extraction.score, None);
        assert_eq!(extraction.page_speed_score, None);

        let value = json!({"score": 0, "pageSpeed": 88.0});
        let extraction = extract_structured(value.as_object().unwrap());
        assert_eq!(extraction.score, Some(0));
        assert_eq!(extraction.page_speed_score, Some(88));

        let value = json!({"score": -5});
        assert_eq!(extract_structured(value.as_object().unwrap()).score, None);
    }

    #[test]
    fn test_score_design_label_beats_other_scores() {
        let text = "Accessibility Score: 55\nDesign Score: 82\n## Layout\nok";
        assert_eq!(extract_score(text), Some(82));
    }

    #[test]
    fn test_score_ignores_qualified_bare_labels() {
        for text in [
            "Overall the site looks good\n## Recommendations\n- Raise SEO score 40 points",
            "Performance score: 35",
            "**Accessibility** score - 61",
        ] {
            assert_eq!(extract_score(text), None, "{text:?}");
        }
    }

    #[test]
    fn test_score_bare_label_with_determiner() {
        assert_eq!(extract_score("Your score: 77\nNice work"), Some(77));
        assert_eq!(extract_score("Summary -- Score: 64"), Some(64));
    }

    #[test]
    fn test_score_preamble_searched_before_sections() {
        let text = "Score: 64\n## History\nDesign Score: 90 last year";
        assert_eq!(extract_score(text), Some(64));

        let text = "Summary\n## Details\nDesign Score: 58";
        assert_eq!(extract_score(text), Some(58));
    }

    #[test]
    fn test_score_label_with_parenthetical() {
        assert_eq!(extract_score("Design Score (out of 100): 82"), Some(82));
    }

    #[test]
    fn test_score_fallback_skips_denominators() {
        assert_eq!(extract_score("Rating (out of 100): 82"), Some(82));
        assert_eq!(extract_score("Rated 7/100 overall"), Some(7));
        assert_eq!(extract_score("Graded on a / 100 basis"), None);
    }

    #[test]
    fn test_legacy_recommendations_without_score_line() {
        let text = "Fix spacing\nAdd alt text";
        assert_eq!(extract_score(text), None);
        assert_eq!(
            extract_legacy_recommendations(text),
            vec!["Fix spacing".to_string(), "Add alt text".to_string()]
        );
    }

    #[test]
    fn test_legacy_recommendations_after_fallback_score_line() {
        let text = "Rated 65 of 100\nFix spacing";
        assert_eq!(extract_score(text), Some(65));
        assert_eq!(
            extract_legacy_recommendations(text),
            vec!["Fix spacing".to_string()]
        );
    }
}
