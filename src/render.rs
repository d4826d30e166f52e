//! Terminal rendering of canonical reports

use std::fmt::Write as FmtWrite;

use auditlens_core::CanonicalReport;
use auditlens_core::checklist::CHECKLIST_KEYWORD;
use auditlens_core::extract::RECOMMENDATIONS_KEYWORD;

const DIVIDER: &str = "─────────────────────────────────────────────────────────────";
const LABEL_WIDTH: usize = 16;

/// Who and what the report is about, shown in the header
pub struct RenderContext<'a> {
    pub target: Option<&'a str>,
    pub page_type: Option<&'a str>,
}

pub fn push_section_header(buf: &mut String, icon: &str, title: &str) {
    let _ = writeln!(buf, "{DIVIDER}");
    let _ = writeln!(buf, "{icon} {title}");
    let _ = writeln!(buf, "{DIVIDER}");
}

pub fn push_key_value(buf: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let _ = writeln!(buf, "• {:<width$} : {}", label, value, width = LABEL_WIDTH);
}

fn score_text(score: Option<u8>) -> String {
    score
        .map(|value| format!("{value}/100"))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Render a report as terminal-friendly markdown
pub fn render_markdown(report: &CanonicalReport, context: &RenderContext<'_>) -> String {
    let mut output = String::new();

    push_section_header(&mut output, "🧭", "Audit Results");
    if let Some(target) = context.target {
        push_key_value(&mut output, "URL", target);
    }
    if let Some(page_type) = context.page_type {
        push_key_value(&mut output, "Page Type", page_type);
    }
    push_key_value(&mut output, "Design Score", &score_text(report.score));
    push_key_value(
        &mut output,
        "Page Speed Score",
        &score_text(report.page_speed_score),
    );
    output.push('\n');

    for (name, content) in report.sections.iter() {
        if is_listed_elsewhere(report, name) {
            continue;
        }
        push_section_header(&mut output, "📄", name);
        if content.is_empty() {
            output.push_str("_(empty)_\n");
        } else {
            output.push_str(content);
            output.push('\n');
        }
        output.push('\n');
    }

    if !report.recommendations.is_empty() {
        push_section_header(&mut output, "💡", "Recommendations");
        for recommendation in &report.recommendations {
            let _ = writeln!(output, "- {recommendation}");
        }
        output.push('\n');
    }

    if !report.checklist.is_empty() {
        push_section_header(&mut output, "✅", "Checklist");
        render_checklist_table(&mut output, report);
        output.push('\n');
    }

    if report.score.is_none() && report.sections.is_empty() && report.checklist.is_empty() {
        output.push_str("No usable audit content was found in the response.\n");
    }

    output
}

/// Sections already shown as the recommendation list or checklist table
fn is_listed_elsewhere(report: &CanonicalReport, name: &str) -> bool {
    let name = name.to_lowercase();
    (!report.recommendations.is_empty() && name.contains(RECOMMENDATIONS_KEYWORD))
        || (!report.checklist.is_empty() && name.contains(CHECKLIST_KEYWORD))
}

fn render_checklist_table(buf: &mut String, report: &CanonicalReport) {
    let category_width = report
        .checklist
        .iter()
        .map(|item| item.category.chars().count())
        .max()
        .unwrap_or(0)
        .max("Category".len());
    let status_width = report
        .checklist
        .iter()
        .map(|item| item.status.chars().count())
        .max()
        .unwrap_or(0)
        .max("Status".len());

    let _ = writeln!(
        buf,
        "| {:<category_width$} | {:<status_width$} |",
        "Category", "Status"
    );
    let _ = writeln!(
        buf,
        "| {} | {} |",
        "-".repeat(category_width),
        "-".repeat(status_width)
    );
    for item in &report.checklist {
        let _ = writeln!(
            buf,
            "| {:<category_width$} | {:<status_width$} |",
            item.category, item.status
        );
    }
}
