//! Built-in accessibility checks.
//!
//! These run on every page regardless of the design system:
//! - every `<img>` needs a non-empty `alt` attribute (error otherwise)
//! - the presence of `h1`-`h6` heading structure is reported once

use scraper::{ElementRef, Html, Selector};

use crate::domain::{Finding, FindingStatus, FindingValue, Position};

/// Rule id of image alt-text findings.
pub const IMG_ALT_CHECK: &str = "img-alt-text";
/// Rule id of the heading-structure finding.
pub const HEADING_STRUCTURE_CHECK: &str = "heading-structure";

/// Run all accessibility checks against a parsed document.
pub fn check(document: &Html) -> Vec<Finding> {
    let mut findings = check_images(document);
    findings.extend(check_headings(document));
    findings
}

fn check_images(document: &Html) -> Vec<Finding> {
    let Ok(img_selector) = Selector::parse("img") else {
        return Vec::new();
    };

    document
        .select(&img_selector)
        .enumerate()
        .map(|(index, image)| {
            let number = index + 1;
            let element = describe_image(image, number);
            let has_alt = image.value().attr("alt").is_some_and(|alt| !alt.is_empty());
            let (status, actual, message) = if has_alt {
                (
                    FindingStatus::Correct,
                    "present",
                    format!("Image {number} has alternative text"),
                )
            } else {
                (
                    FindingStatus::Error,
                    "missing",
                    format!("Image {number} is missing alternative text (alt attribute)"),
                )
            };
            Finding {
                id: format!("a11y-img-{number}"),
                rule_id: IMG_ALT_CHECK.to_string(),
                element,
                status,
                message,
                actual_value: actual.into(),
                expected_value: "present".into(),
                position: Some(Position::default()),
            }
        })
        .collect()
}

fn check_headings(document: &Html) -> Option<Finding> {
    let heading_selector = Selector::parse("h1, h2, h3, h4, h5, h6").ok()?;
    let count = document.select(&heading_selector).count();
    if count == 0 {
        return None;
    }

    Some(Finding {
        id: "a11y-heading-structure".to_string(),
        rule_id: HEADING_STRUCTURE_CHECK.to_string(),
        element: "h1-h6".to_string(),
        status: FindingStatus::Correct,
        message: format!("Page has heading structure ({count} headings)"),
        actual_value: FindingValue::from(count),
        expected_value: "present".into(),
        position: Some(Position::default()),
    })
}

fn describe_image(image: ElementRef<'_>, number: usize) -> String {
    match image.value().attr("src").map(str::trim) {
        Some(src) if !src.is_empty() => format!("img[src=\"{src}\"]"),
        _ => format!("img #{number}"),
    }
}
