//! Heading-based splitting of text reports into segments

use once_cell::sync::Lazy;
use regex::Regex;

/// A `## ` marker at line start or after horizontal whitespace, and the rest of its line.
///
/// `###` and deeper never match: the two hashes must be followed by a blank
/// and preceded by line start or a blank.
static RE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^|[ \t])##[ \t]+([^\r\n]*)").expect("invalid heading regex")
});

/// One heading-delimited chunk of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Cleaned heading text; `None` for the untitled preamble
    pub title: Option<String>,
    /// Everything after the heading line up to the next heading
    pub body: &'a str,
}

impl Segment<'_> {
    pub fn is_preamble(&self) -> bool {
        self.title.is_none()
    }

    /// Case-insensitive keyword match against the title
    pub fn title_contains(&self, keyword: &str) -> bool {
        self.title
            .as_deref()
            .is_some_and(|title| title.to_lowercase().contains(&keyword.to_lowercase()))
    }

    pub fn non_empty_lines(&self) -> impl Iterator<Item = &str> {
        self.body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

/// Split a report on `## ` headings.
///
/// The first segment is always the untitled preamble (possibly empty), so a
/// report without headings yields exactly one segment holding all of it.
pub fn split_sections(text: &str) -> Vec<Segment<'_>> {
    let headings: Vec<(usize, String, usize)> = RE_HEADING
        .captures_iter(text)
        .filter_map(|caps| {
            let marker = caps.get(0)?;
            let rest = caps.get(1)?;
            let title = clean_title(rest.as_str());
            if title.is_empty() {
                return None;
            }
            // A leading blank belongs to the previous segment, not the marker
            let start = if text[marker.start()..].starts_with(['\t', ' ']) {
                marker.start() + 1
            } else {
                marker.start()
            };
            Some((start, title, rest.end()))
        })
        .collect();

    let mut segments = Vec::with_capacity(headings.len() + 1);
    let preamble_end = headings.first().map(|(start, _, _)| *start).unwrap_or(text.len());
    segments.push(Segment {
        title: None,
        body: &text[..preamble_end],
    });

    for (idx, (_, title, body_start)) in headings.iter().enumerate() {
        let body_end = headings
            .get(idx + 1)
            .map(|(next_start, _, _)| *next_start)
            .unwrap_or(text.len());
        segments.push(Segment {
            title: Some(title.clone()),
            body: &text[*body_start..body_end],
        });
    }

    tracing::debug!(segments = segments.len(), "split report into segments");
    segments
}

/// Find the first titled segment whose title contains `keyword`
pub fn find_segment<'s, 'a>(segments: &'s [Segment<'a>], keyword: &str) -> Option<&'s Segment<'a>> {
    segments
        .iter()
        .filter(|segment| !segment.is_preamble())
        .find(|segment| segment.title_contains(keyword))
}

/// Strip closing hashes, bold/italic markers and a trailing colon from a heading
fn clean_title(raw: &str) -> String {
    let title = raw.trim().trim_end_matches('#').trim();
    let title = title.trim_matches(|c| c == '*' || c == '_').trim();
    let title = title.trim_end_matches(':').trim();
    title.trim_matches(|c| c == '*' || c == '_').trim().to_string()
}
