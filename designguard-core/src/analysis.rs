//! Analysis runs: fetch a page, evaluate every rule, check accessibility and
//! assemble the report.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};
use scraper::Html;

use crate::accessibility;
use crate::domain::{DesignSystem, Report};
use crate::error::{DesignGuardError, Result};
use crate::evaluator::evaluate;
use crate::report::placeholder_screenshot;
use crate::source::{DocumentSource, PageSource, sample_page};

/// Progress reported while the target is being loaded.
pub const PROGRESS_LOADING: u8 = 10;
/// Progress once the document has been obtained.
pub const PROGRESS_FETCHED: u8 = 30;
/// Progress once the document has been parsed.
pub const PROGRESS_PARSED: u8 = 40;
/// Progress once every rule has been evaluated.
pub const PROGRESS_RULES: u8 = 60;
/// Progress once the accessibility checks have run.
pub const PROGRESS_ACCESSIBILITY: u8 = 80;
/// Progress once the summary has been computed.
pub const PROGRESS_SUMMARY: u8 = 95;
/// Progress when the report is ready.
pub const PROGRESS_DONE: u8 = 100;

/// Shared flag used to cancel a run from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs analyses with a document source and an optional fallback document.
pub struct Analyzer<S: DocumentSource> {
    source: S,
    fallback: Option<PageSource>,
    cancel: CancelFlag,
}

impl<S: DocumentSource> Analyzer<S> {
    /// Create an analyzer that falls back to the built-in sample page.
    pub fn new(source: S) -> Self {
        Self {
            source,
            fallback: Some(sample_page()),
            cancel: CancelFlag::new(),
        }
    }

    /// Replace the fallback document; `None` makes retrieval failures fatal.
    pub fn with_fallback(mut self, fallback: Option<PageSource>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Use `cancel` to abort runs.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that cancels runs of this analyzer.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Analyze `target` against `design_system`.
    ///
    /// `progress` receives strictly increasing checkpoints ending at 100.
    /// Either a complete report or a run-level error is returned.
    pub fn analyze(
        &self,
        target: &str,
        design_system: &DesignSystem,
        mut progress: impl FnMut(u8),
    ) -> Result<Report> {
        info!(
            "analyzing {} against {} {}",
            crate::report::short_target(target),
            design_system.name,
            design_system.version
        );
        progress(PROGRESS_LOADING);
        let page = self
            .load(target)
            .map_err(|err| DesignGuardError::analysis(target, err))?;
        progress(PROGRESS_FETCHED);

        let document = Html::parse_document(&page.html);
        progress(PROGRESS_PARSED);

        let mut results: Vec<_> = design_system
            .rules
            .iter()
            .filter_map(|rule| evaluate(rule, &page))
            .collect();
        progress(PROGRESS_RULES);

        results.extend(accessibility::check(&document));
        progress(PROGRESS_ACCESSIBILITY);

        let report = Report::new(target, results);
        progress(PROGRESS_SUMMARY);

        let report = report.with_screenshot(placeholder_screenshot(target));
        info!(
            "analysis finished: {} correct, {} warnings, {} errors",
            report.summary.correct, report.summary.warnings, report.summary.errors
        );
        progress(PROGRESS_DONE);
        Ok(report)
    }

    fn load(&self, target: &str) -> Result<PageSource> {
        self.ensure_active()?;
        let fetched = self.source.fetch(target);
        self.ensure_active()?;
        match fetched {
            Ok(page) => Ok(page),
            Err(err) => match &self.fallback {
                Some(fallback) => {
                    warn!("could not load target ({err}); using the built-in sample document");
                    Ok(fallback.clone())
                }
                None => Err(err),
            },
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(DesignGuardError::Cancelled)
        } else {
            Ok(())
        }
    }
}
