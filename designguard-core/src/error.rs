//! Error types for DesignGuard core.

use std::{error::Error, fmt};

/// Error type for DesignGuard core operations.
#[derive(Debug)]
pub enum DesignGuardError {
    /// Input that is not valid JSON.
    Json(serde_json::Error),
    /// A design system that parsed but violates the schema.
    InvalidDesignSystem(Vec<String>),
    /// A target that is neither an HTTP(S) URL nor an inline HTML document.
    InvalidTarget(String),
    /// Retrieving a document failed.
    Fetch(String),
    /// The run was cancelled before it completed.
    Cancelled,
    /// An analysis run failed as a whole.
    Analysis {
        /// Target the run was analyzing.
        target: String,
        /// Underlying cause.
        cause: Box<DesignGuardError>,
    },
    /// A catch-all error with a message.
    Other(String),
}

impl DesignGuardError {
    /// Wrap an error as the run-level failure for `target`.
    pub fn analysis(target: impl Into<String>, cause: DesignGuardError) -> Self {
        Self::Analysis {
            target: target.into(),
            cause: Box::new(cause),
        }
    }
}

impl fmt::Display for DesignGuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
            Self::InvalidDesignSystem(problems) => {
                write!(f, "invalid design system format: {}", problems.join("; "))
            }
            Self::InvalidTarget(target) => write!(
                f,
                "invalid target {target:?}: expected an http:// or https:// URL or an inline HTML document"
            ),
            Self::Fetch(message) => write!(f, "fetch failed: {message}"),
            Self::Cancelled => write!(f, "analysis cancelled"),
            Self::Analysis { target, cause } => write!(f, "analysis of {target} failed: {cause}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for DesignGuardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Analysis { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DesignGuardError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Convenience result type for DesignGuard core.
pub type Result<T> = std::result::Result<T, DesignGuardError>;

#[cfg(test)]
mod tests {
    use super::DesignGuardError;
    use std::error::Error;

    #[test]
    fn cancelled_error_has_no_source() {
        let error = DesignGuardError::Cancelled;
        assert_eq!(format!("{error}"), "analysis cancelled");
        assert!(error.source().is_none());
    }

    #[test]
    fn other_error_formats_message() {
        let error = DesignGuardError::Other("designguard failed".to_string());
        assert_eq!(format!("{error}"), "designguard failed");
    }

    #[test]
    fn invalid_design_system_lists_problems() {
        let error = DesignGuardError::InvalidDesignSystem(vec![
            "name must be a non-empty string".to_string(),
            "rules[0]: property must be a non-empty string".to_string(),
        ]);
        let message = format!("{error}");
        assert!(message.starts_with("invalid design system format"));
        assert!(message.contains("rules[0]"));
    }

    #[test]
    fn analysis_error_names_target_and_cause() {
        let error = DesignGuardError::analysis(
            "https://example.com",
            DesignGuardError::Fetch("connection refused".to_string()),
        );
        assert_eq!(
            format!("{error}"),
            "analysis of https://example.com failed: fetch failed: connection refused"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn from_json_error_maps_variant() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{").expect_err("bad json");
        let error: DesignGuardError = parse_error.into();
        assert!(matches!(error, DesignGuardError::Json(_)));
        assert!(format!("{error}").starts_with("invalid JSON"));
    }
}
