//! Domain entities for DesignGuard.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Category of a design-system rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Color values compared by exact string equality.
    Color,
    /// Numeric typography values compared within a tolerance.
    Typography,
    /// Spacing scale; accepted but not evaluated yet.
    Spacing,
    /// Accessibility expectations, covered by the built-in checks.
    Accessibility,
    /// Layout values compared by exact string equality.
    Layout,
}

impl RuleKind {
    /// Lowercase name as it appears in design-system JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Typography => "typography",
            Self::Spacing => "spacing",
            Self::Accessibility => "accessibility",
            Self::Layout => "layout",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value a rule expects to find.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedValue {
    /// A JSON number, kept as written.
    Number(serde_json::Number),
    /// A plain string such as `#0066FF` or `8px`.
    Text(String),
    /// An ordered list of acceptable strings.
    List(Vec<String>),
}

impl ExpectedValue {
    /// Text form used when comparing against stylesheet values.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(", "),
        }
    }
}

impl From<&str> for ExpectedValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for ExpectedValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// One checkable expectation about a style property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Identifier, unique within a design system.
    pub id: String,
    /// Rule category. Serialized as `type`.
    #[serde(rename = "type", alias = "kind")]
    pub kind: RuleKind,
    /// Style property to inspect, e.g. `background-color`.
    pub property: String,
    /// Expected value; its meaning depends on `kind`.
    #[schema(value_type = Object)]
    pub expected_value: ExpectedValue,
    /// Permitted absolute numeric deviation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    /// Human-readable explanation.
    #[serde(default)]
    pub description: String,
}

/// Free-form annotation attached to a design system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DesignSystemMetadata {
    /// Author of the design system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time as written by the author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// A named, versioned collection of rules ("Design System DNA").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DesignSystem {
    /// Design system name.
    pub name: String,
    /// Design system version.
    pub version: String,
    /// Rules in report order.
    pub rules: Vec<Rule>,
    /// Optional annotation, never consulted during evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DesignSystemMetadata>,
}

/// Verdict of a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    /// The page matches the expectation.
    Correct,
    /// The value is present but differs from the expectation.
    Warning,
    /// A hard failure, such as an image without alt text.
    Error,
}

impl FindingStatus {
    /// Lowercase name as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed or declared value, normalized for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FindingValue {
    /// Numeric value.
    Number(serde_json::Number),
    /// Text value.
    Text(String),
}

impl From<&ExpectedValue> for FindingValue {
    fn from(value: &ExpectedValue) -> Self {
        match value {
            ExpectedValue::Number(number) => Self::Number(number.clone()),
            other => Self::Text(other.to_display_string()),
        }
    }
}

impl From<&str> for FindingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<usize> for FindingValue {
    fn from(value: usize) -> Self {
        Self::Number(value.into())
    }
}

impl fmt::Display for FindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Bounding box of an inspected element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    /// Left offset.
    pub x: f64,
    /// Top offset.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Verdict for one rule or one accessibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Identifier, unique within a report.
    pub id: String,
    /// Originating rule id or accessibility check id.
    pub rule_id: String,
    /// Human-readable locator of what was inspected.
    pub element: String,
    /// Verdict.
    pub status: FindingStatus,
    /// Explanation of the verdict.
    pub message: String,
    /// Value observed on the page.
    #[schema(value_type = Object)]
    pub actual_value: FindingValue,
    /// Value declared by the rule or check.
    #[schema(value_type = Object)]
    pub expected_value: FindingValue,
    /// Bounding box; zeros when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Finding counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Summary {
    /// Findings with status `correct`.
    pub correct: usize,
    /// Findings with status `warning`.
    pub warnings: usize,
    /// Findings with status `error`.
    pub errors: usize,
    /// All findings.
    pub total: usize,
}

impl Summary {
    /// Count findings per status.
    pub fn tally(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            match finding.status {
                FindingStatus::Correct => summary.correct += 1,
                FindingStatus::Warning => summary.warnings += 1,
                FindingStatus::Error => summary.errors += 1,
            }
        }
        summary.total = findings.len();
        summary
    }
}

/// Aggregated outcome of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Report {
    /// Analyzed target.
    pub url: String,
    /// RFC 3339 creation time (UTC).
    pub timestamp: String,
    /// Counts by status.
    pub summary: Summary,
    /// Rule findings in design-system order, then accessibility findings.
    pub results: Vec<Finding>,
    /// Rendered preview reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl Report {
    /// Build a report stamped with the current time.
    pub fn new(url: impl Into<String>, results: Vec<Finding>) -> Self {
        Self {
            url: url.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            summary: Summary::tally(&results),
            results,
            screenshot: None,
        }
    }

    /// Attach a screenshot reference.
    pub fn with_screenshot(mut self, screenshot: impl Into<String>) -> Self {
        self.screenshot = Some(screenshot.into());
        self
    }

    /// Findings carrying the given status, in report order.
    pub fn findings_with_status(&self, status: FindingStatus) -> Vec<&Finding> {
        self.results
            .iter()
            .filter(|finding| finding.status == status)
            .collect()
    }

    /// Whether any finding has status `error`.
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }
}
