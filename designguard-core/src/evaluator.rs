//! Rule evaluation against a page's stylesheet.

use log::debug;

use crate::css::{find_declaration, leading_integer};
use crate::domain::{Finding, FindingStatus, FindingValue, Position, Rule, RuleKind};
use crate::source::PageSource;

/// How an observed value is compared with the expected one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Comparison {
    Exact,
    Numeric,
}

/// Evaluate one rule against a page.
///
/// Only color, typography and layout rules produce findings. A rule whose
/// property is not declared in the page's stylesheet is skipped. Mismatches
/// are reported as warnings, never errors.
pub fn evaluate(rule: &Rule, page: &PageSource) -> Option<Finding> {
    let (element, comparison) = match rule.kind {
        RuleKind::Color => ("CSS Rule", Comparison::Exact),
        RuleKind::Typography => ("CSS Typography", Comparison::Numeric),
        RuleKind::Layout => ("Layout CSS", Comparison::Exact),
        RuleKind::Spacing | RuleKind::Accessibility => return None,
    };

    let Some(declaration) = find_declaration(&page.css, &rule.property) else {
        debug!("rule {} skipped: {} not declared", rule.id, rule.property);
        return None;
    };
    let actual = declaration.value;
    let expected = rule.expected_value.to_display_string();

    let (status, message) = match comparison {
        Comparison::Exact => compare_exact(rule, &actual, &expected),
        Comparison::Numeric => compare_numeric(rule, &actual, &expected),
    };

    Some(Finding {
        id: format!("rule-{}", rule.id),
        rule_id: rule.id.clone(),
        element: element.to_string(),
        status,
        message,
        actual_value: FindingValue::Text(actual),
        expected_value: FindingValue::from(&rule.expected_value),
        position: Some(Position::default()),
    })
}

fn compare_exact(rule: &Rule, actual: &str, expected: &str) -> (FindingStatus, String) {
    if actual == expected {
        (
            FindingStatus::Correct,
            format!("{} matches the design system: {actual}", rule.property),
        )
    } else {
        (
            FindingStatus::Warning,
            format!(
                "{} is {actual} but the design system expects {expected}",
                rule.property
            ),
        )
    }
}

fn compare_numeric(rule: &Rule, actual: &str, expected: &str) -> (FindingStatus, String) {
    let tolerance = rule.tolerance.unwrap_or(0.0);
    let actual_number = leading_integer(actual);
    let expected_number = leading_integer(expected);
    let deviation = actual_number.abs_diff(expected_number) as f64;

    if deviation <= tolerance {
        (
            FindingStatus::Correct,
            format!(
                "{} {actual_number} is within {tolerance} of {expected_number}",
                rule.property
            ),
        )
    } else {
        (
            FindingStatus::Warning,
            format!(
                "{} {actual_number} deviates from {expected_number} by {deviation} (tolerance {tolerance})",
                rule.property
            ),
        )
    }
}
