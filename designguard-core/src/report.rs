//! Report formatting utilities for DesignGuard outputs.

use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::domain::{Finding, FindingStatus, Report};

const STATUS_SECTIONS: [(FindingStatus, &str); 3] = [
    (FindingStatus::Error, "Errors"),
    (FindingStatus::Warning, "Warnings"),
    (FindingStatus::Correct, "Passed"),
];

/// Render a report as Markdown.
pub fn render_markdown(report: &Report) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# DesignGuard Report\n");
    let _ = writeln!(output, "- Target: `{}`", short_target(&report.url));
    let _ = writeln!(output, "- Generated: {}", report.timestamp);
    let _ = writeln!(output);

    let summary = &report.summary;
    let _ = writeln!(output, "## Summary\n");
    let _ = writeln!(output, "| Correct | Warnings | Errors | Total |");
    let _ = writeln!(output, "|---|---|---|---|");
    let _ = writeln!(
        output,
        "| {} | {} | {} | {} |\n",
        summary.correct, summary.warnings, summary.errors, summary.total
    );

    for (status, title) in STATUS_SECTIONS {
        append_findings(&mut output, title, &report.findings_with_status(status));
    }
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Static stand-in for a rendered screenshot, as an SVG data URL.
pub fn placeholder_screenshot(target: &str) -> String {
    let label = escape_xml(&short_target(target));
    let svg = format!(
        "<svg width=\"800\" height=\"600\" xmlns=\"http://www.w3.org/2000/svg\">\
<rect width=\"100%\" height=\"100%\" fill=\"#f0f0f0\"/>\
<text x=\"50%\" y=\"50%\" font-family=\"Arial\" font-size=\"18\" fill=\"#333\" text-anchor=\"middle\" dy=\".3em\">{label}</text>\
</svg>"
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

/// Shorten inline document targets for display.
pub fn short_target(target: &str) -> String {
    if target.starts_with("data:") {
        "inline HTML document".to_string()
    } else {
        target.to_string()
    }
}

fn append_findings(output: &mut String, title: &str, findings: &[&Finding]) {
    if findings.is_empty() {
        let _ = writeln!(output, "## {title}\nNone.\n");
        return;
    }
    let _ = writeln!(output, "## {title}");
    for finding in findings {
        let _ = writeln!(
            output,
            "- [{}] {} ({}): {} (actual `{}`, expected `{}`)",
            finding.rule_id,
            finding.element,
            finding.status,
            finding.message,
            finding.actual_value,
            finding.expected_value
        );
    }
    let _ = writeln!(output);
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
