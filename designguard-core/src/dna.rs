//! Loading and validation of user-authored design systems.
//!
//! Design systems arrive as JSON written by hand, so every shape problem is
//! collected and reported together instead of failing on the first one.

use std::collections::HashSet;

use serde_json::Value;

use crate::domain::{DesignSystem, DesignSystemMetadata, Rule, RuleKind};
use crate::error::{DesignGuardError, Result};

const RULE_KINDS: &[&str] = &["color", "typography", "spacing", "accessibility", "layout"];

impl DesignSystem {
    /// Parse and validate a design system from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Validate an already parsed JSON value as a design system.
    pub fn from_value(value: Value) -> Result<Self> {
        let problems = shape_problems(&value);
        if !problems.is_empty() {
            return Err(DesignGuardError::InvalidDesignSystem(problems));
        }
        let design_system: DesignSystem = serde_json::from_value(value)
            .map_err(|err| DesignGuardError::InvalidDesignSystem(vec![err.to_string()]))?;
        design_system.validate()?;
        Ok(design_system)
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("name must be a non-empty string".to_string());
        }
        if self.version.trim().is_empty() {
            problems.push("version must be a non-empty string".to_string());
        }

        let mut seen = HashSet::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.id.trim().is_empty() {
                problems.push(format!("rules[{index}]: id must be a non-empty string"));
            } else if !seen.insert(rule.id.as_str()) {
                problems.push(format!("rules[{index}]: duplicate rule id {:?}", rule.id));
            }
            if rule.property.trim().is_empty() {
                problems.push(format!(
                    "rules[{index}]: property must be a non-empty string"
                ));
            }
            if let Some(tolerance) = rule.tolerance {
                if !tolerance.is_finite() || tolerance < 0.0 {
                    problems.push(format!(
                        "rules[{index}]: tolerance must be a non-negative number"
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DesignGuardError::InvalidDesignSystem(problems))
        }
    }
}

fn shape_problems(value: &Value) -> Vec<String> {
    let mut problems = Vec::new();
    let Some(object) = value.as_object() else {
        return vec!["design system must be a JSON object".to_string()];
    };

    for field in ["name", "version"] {
        if !object.get(field).is_some_and(Value::is_string) {
            problems.push(format!("{field} must be a string"));
        }
    }

    let Some(rules) = object.get("rules").and_then(Value::as_array) else {
        problems.push("rules must be an array".to_string());
        return problems;
    };

    for (index, rule) in rules.iter().enumerate() {
        let Some(rule) = rule.as_object() else {
            problems.push(format!("rules[{index}]: rule must be an object"));
            continue;
        };
        for field in ["id", "property"] {
            if !rule.get(field).is_some_and(Value::is_string) {
                problems.push(format!("rules[{index}]: {field} must be a string"));
            }
        }
        match rule.get("type").or_else(|| rule.get("kind")) {
            Some(Value::String(kind)) if RULE_KINDS.contains(&kind.as_str()) => {}
            Some(Value::String(kind)) => problems.push(format!(
                "rules[{index}]: unknown rule type {kind:?} (expected one of {})",
                RULE_KINDS.join(", ")
            )),
            _ => problems.push(format!("rules[{index}]: type must be a string")),
        }
        match rule.get("expectedValue") {
            None | Some(Value::Null) => {
                problems.push(format!("rules[{index}]: expectedValue is required"))
            }
            Some(Value::String(_)) | Some(Value::Number(_)) => {}
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
            Some(_) => problems.push(format!(
                "rules[{index}]: expectedValue must be a string, a number or a list of strings"
            )),
        }
    }

    problems
}

/// The sample design system offered to new users.
pub fn sample_design_system() -> DesignSystem {
    DesignSystem {
        name: "Sample Design System".to_string(),
        version: "1.0.0".to_string(),
        rules: vec![
            Rule {
                id: "primary-color".to_string(),
                kind: RuleKind::Color,
                property: "background-color".to_string(),
                expected_value: "#0066FF".into(),
                tolerance: None,
                description: "Primary buttons should use brand blue".to_string(),
            },
            Rule {
                id: "heading-font-weight".to_string(),
                kind: RuleKind::Typography,
                property: "font-weight".to_string(),
                expected_value: 600.into(),
                tolerance: Some(50.0),
                description: "Headings should be semi-bold".to_string(),
            },
            Rule {
                id: "button-border-radius".to_string(),
                kind: RuleKind::Layout,
                property: "border-radius".to_string(),
                expected_value: "8px".into(),
                tolerance: None,
                description: "Buttons should have 8px border radius".to_string(),
            },
        ],
        metadata: Some(DesignSystemMetadata {
            author: Some("Design Team".to_string()),
            description: Some("Sample design system validation rules".to_string()),
            created: Some(chrono::Utc::now().to_rfc3339()),
        }),
    }
}
