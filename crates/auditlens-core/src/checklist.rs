//! Pipe-delimited checklist table parsing
//!
//! Turns a markdown-ish table such as
//!
//! ```text
//! | Category   | Status |
//! |------------|--------|
//! | Navigation | Pass   |
//! ```
//!
//! into ordered [`ChecklistItem`] records. Malformed rows are skipped without
//! affecting the rows around them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::sections::{Segment, find_segment};
use crate::types::ChecklistItem;

/// Keyword identifying the checklist segment title
pub const CHECKLIST_KEYWORD: &str = "checklist";

const DELIMITER: char = '|';

/// Header/body divider rows: only delimiters, dashes, alignment colons and blanks
static RE_DIVIDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s|:\-]*-[\s|:\-]*$").expect("invalid divider regex"));

/// Checklist rows from the first segment titled with the checklist keyword
pub fn extract_checklist(segments: &[Segment<'_>]) -> Option<Vec<ChecklistItem>> {
    let segment = find_segment(segments, CHECKLIST_KEYWORD)?;
    Some(parse_checklist(segment.body))
}

/// Parse every two-cell table row in `body`, in order.
///
/// The row directly above a divider row is that table's header and is
/// dropped along with the divider. Duplicate categories are all kept.
pub fn parse_checklist(body: &str) -> Vec<ChecklistItem> {
    let mut items = Vec::new();
    // Whether the previous line was a row that made it into `items`
    let mut previous_accepted = false;

    for line in body.lines() {
        let line = line.trim();

        if !is_candidate_row(line) {
            previous_accepted = false;
            continue;
        }

        if RE_DIVIDER.is_match(line) {
            if previous_accepted {
                let header = items.pop();
                tracing::trace!(?header, "dropped table header row");
            }
            previous_accepted = false;
            continue;
        }

        match parse_row(line) {
            Some(item) => {
                items.push(item);
                previous_accepted = true;
            }
            None => {
                tracing::trace!(row = line, "dropped malformed checklist row");
                previous_accepted = false;
            }
        }
    }

    items
}

/// Starts with the delimiter and contains at least one more
fn is_candidate_row(line: &str) -> bool {
    line.strip_prefix(DELIMITER)
        .is_some_and(|rest| rest.contains(DELIMITER))
}

/// Split into cells, dropping the empty edge cells left by the outer
/// delimiters; keep the row only when exactly two non-empty cells remain.
fn parse_row(line: &str) -> Option<ChecklistItem> {
    let mut cells: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();

    if cells.first().is_some_and(|cell| cell.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }

    match cells.as_slice() {
        [category, status] if !category.is_empty() && !status.is_empty() => {
            Some(ChecklistItem::new(*category, *status))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::split_sections;

    fn pairs(items: &[ChecklistItem]) -> Vec<(&str, &str)> {
        items
            .iter()
            .map(|item| (item.category.as_str(), item.status.as_str()))
            .collect()
    }

    #[test]
    fn test_parse_table_with_header_and_divider() {
        let body = "| Category | Status |\n|---|---|\n| Navigation | Pass |\n| Mobile Responsiveness | Fail |";
        let items = parse_checklist(body);

        assert_eq!(
            pairs(&items),
            vec![("Navigation", "Pass"), ("Mobile Responsiveness", "Fail")]
        );
    }

    #[test]
    fn test_aligned_divider_is_dropped() {
        let body = "| Category | Status |\n| :--- | :---: |\n| Forms | Pass |";
        assert_eq!(pairs(&parse_checklist(body)), vec![("Forms", "Pass")]);
    }

    #[test]
    fn test_table_without_divider_keeps_all_rows() {
        let body = "| Navigation | Pass |\n| Footer | Fail |";
        assert_eq!(
            pairs(&parse_checklist(body)),
            vec![("Navigation", "Pass"), ("Footer", "Fail")]
        );
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let body = "\
| Category | Status |
|---|---|
| Navigation | Pass |
| Too | Many | Cells |
| Lonely |
|  |  |
| Search | |
| Footer | Fail |";
        assert_eq!(
            pairs(&parse_checklist(body)),
            vec![("Navigation", "Pass"), ("Footer", "Fail")]
        );
    }

    #[test]
    fn test_duplicate_categories_are_kept_in_order() {
        let body = "| Forms | Pass |\n| Forms | Fail |\n| Forms | Pass |";
        assert_eq!(
            pairs(&parse_checklist(body)),
            vec![("Forms", "Pass"), ("Forms", "Fail"), ("Forms", "Pass")]
        );
    }

    #[test]
    fn test_missing_trailing_delimiter() {
        assert_eq!(
            pairs(&parse_checklist("| Contrast | Needs work")),
            vec![("Contrast", "Needs work")]
        );
    }

    #[test]
    fn test_non_table_lines_are_ignored() {
        let body = "Intro text with a | pipe\n- bullet\n| Speed | Pass |\nClosing words";
        assert_eq!(pairs(&parse_checklist(body)), vec![("Speed", "Pass")]);
    }

    #[test]
    fn test_header_only_dropped_when_directly_above_divider() {
        let body = "| Navigation | Pass |\n\n|---|---|\n| Footer | Fail |";
        assert_eq!(
            pairs(&parse_checklist(body)),
            vec![("Navigation", "Pass"), ("Footer", "Fail")]
        );
    }

    #[test]
    fn test_extract_from_checklist_segment() {
        let text = "Design Score: 82\n| Outside | Table |\n## Advanced UX Checklist\n| Category | Status |\n|---|---|\n| Navigation | Pass |";
        let segments = split_sections(text);

        assert_eq!(
            extract_checklist(&segments).map(|items| pairs(&items).len()),
            Some(1)
        );
        assert!(extract_checklist(&split_sections("## Layout\n| A | B |")).is_none());
    }
}
