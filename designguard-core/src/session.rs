//! Application state owned by a front end.
//!
//! The analysis functions are pure; whatever a UI needs to remember between
//! requests (inputs, progress, the last report) lives here instead.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{DesignSystem, Finding, Report};
use crate::error::{DesignGuardError, Result};

/// Inputs captured when a run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTicket {
    /// Identifier of the run.
    pub run_id: String,
    /// Target to analyze.
    pub website_url: String,
    /// Design system to validate against.
    pub design_system: DesignSystem,
}

/// State of one user's analysis workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSession {
    /// Target currently entered.
    pub website_url: String,
    /// Design system currently loaded.
    pub design_system: Option<DesignSystem>,
    /// Whether a run is in flight.
    pub is_analyzing: bool,
    /// Progress of the current run, 0-100.
    pub analysis_progress: u8,
    /// Most recent report.
    pub current_report: Option<Report>,
    /// Id of the finding selected for detail view.
    pub selected_result: Option<String>,
    /// Message of the last failed run.
    pub last_error: Option<String>,
    /// Run whose results are still wanted.
    pub active_run: Option<String>,
}

impl AnalysisSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the target to analyze.
    pub fn set_website_url(&mut self, url: impl Into<String>) {
        self.website_url = url.into();
    }

    /// Record the design system to validate against.
    pub fn set_design_system(&mut self, design_system: Option<DesignSystem>) {
        self.design_system = design_system;
    }

    /// Start a run, superseding any run still in flight.
    pub fn begin(&mut self) -> Result<RunTicket> {
        let website_url = self.website_url.trim().to_string();
        let design_system = match (&self.design_system, website_url.is_empty()) {
            (Some(design_system), false) => design_system.clone(),
            _ => {
                return Err(DesignGuardError::Other(
                    "URL and Design System DNA are required for analysis".to_string(),
                ));
            }
        };

        let run_id = Uuid::new_v4().to_string();
        self.is_analyzing = true;
        self.analysis_progress = 0;
        self.current_report = None;
        self.selected_result = None;
        self.last_error = None;
        self.active_run = Some(run_id.clone());

        Ok(RunTicket {
            run_id,
            website_url,
            design_system,
        })
    }

    /// Record progress for `run_id`; stale runs and regressions are ignored.
    pub fn record_progress(&mut self, run_id: &str, progress: u8) {
        if self.is_active(run_id) {
            self.analysis_progress = self.analysis_progress.max(progress.min(100));
        }
    }

    /// Store the report of `run_id`. Returns false when the run is stale.
    pub fn complete(&mut self, run_id: &str, report: Report) -> bool {
        if !self.is_active(run_id) {
            return false;
        }
        self.current_report = Some(report);
        self.is_analyzing = false;
        self.analysis_progress = 100;
        self.active_run = None;
        true
    }

    /// Record the failure of `run_id`. Returns false when the run is stale.
    pub fn fail(&mut self, run_id: &str, message: impl Into<String>) -> bool {
        if !self.is_active(run_id) {
            return false;
        }
        self.last_error = Some(message.into());
        self.is_analyzing = false;
        self.analysis_progress = 0;
        self.active_run = None;
        true
    }

    /// Select a finding of the current report by id.
    pub fn select_result(&mut self, finding_id: Option<&str>) -> Option<&Finding> {
        let Some(finding_id) = finding_id else {
            self.selected_result = None;
            return None;
        };
        let found = self
            .current_report
            .as_ref()
            .and_then(|report| report.results.iter().find(|f| f.id == finding_id));
        self.selected_result = found.map(|finding| finding.id.clone());
        found
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_active(&self, run_id: &str) -> bool {
        self.active_run.as_deref() == Some(run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna::sample_design_system;
    use crate::domain::{FindingStatus, Position};

    fn ready_session() -> AnalysisSession {
        let mut session = AnalysisSession::new();
        session.set_website_url("https://example.com");
        session.set_design_system(Some(sample_design_system()));
        session
    }

    fn report_with_finding() -> Report {
        Report::new(
            "https://example.com",
            vec![Finding {
                id: "rule-primary-color".to_string(),
                rule_id: "primary-color".to_string(),
                element: "CSS Rule".to_string(),
                status: FindingStatus::Correct,
                message: "ok".to_string(),
                actual_value: "#0066FF".into(),
                expected_value: "#0066FF".into(),
                position: Some(Position::default()),
            }],
        )
    }

    #[test]
    fn begin_requires_url_and_design_system() {
        let mut session = AnalysisSession::new();
        assert!(session.begin().is_err());

        session.set_website_url("https://example.com");
        assert!(session.begin().is_err());

        session.set_design_system(Some(sample_design_system()));
        let ticket = session.begin().expect("ticket");
        assert_eq!(ticket.website_url, "https://example.com");
        assert!(session.is_analyzing);
    }

    #[test]
    fn progress_is_monotonic_and_capped() {
        let mut session = ready_session();
        let ticket = session.begin().expect("ticket");

        session.record_progress(&ticket.run_id, 40);
        session.record_progress(&ticket.run_id, 30);
        assert_eq!(session.analysis_progress, 40);

        session.record_progress(&ticket.run_id, 250);
        assert_eq!(session.analysis_progress, 100);
    }

    #[test]
    fn stale_runs_are_discarded() {
        let mut session = ready_session();
        let first = session.begin().expect("first");
        let second = session.begin().expect("second");

        session.record_progress(&first.run_id, 80);
        assert_eq!(session.analysis_progress, 0);
        assert!(!session.complete(&first.run_id, report_with_finding()));
        assert!(session.current_report.is_none());

        assert!(session.complete(&second.run_id, report_with_finding()));
        assert!(!session.is_analyzing);
        assert_eq!(session.analysis_progress, 100);
    }

    #[test]
    fn failure_clears_progress() {
        let mut session = ready_session();
        let ticket = session.begin().expect("ticket");
        session.record_progress(&ticket.run_id, 60);

        assert!(session.fail(&ticket.run_id, "analysis of x failed"));
        assert_eq!(session.analysis_progress, 0);
        assert_eq!(session.last_error.as_deref(), Some("analysis of x failed"));
        assert!(!session.fail(&ticket.run_id, "again"));
    }

    #[test]
    fn select_result_tracks_known_findings() {
        let mut session = ready_session();
        let ticket = session.begin().expect("ticket");
        session.complete(&ticket.run_id, report_with_finding());

        assert!(session.select_result(Some("rule-primary-color")).is_some());
        assert_eq!(session.selected_result.as_deref(), Some("rule-primary-color"));

        assert!(session.select_result(Some("unknown")).is_none());
        assert!(session.selected_result.is_none());
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut session = ready_session();
        session.begin().expect("ticket");
        session.reset();
        assert_eq!(session, AnalysisSession::default());
    }
}
