#![deny(missing_docs)]
//! DesignGuard core library.
//!
//! Validates a page's styles and markup against a design system ("Design
//! System DNA") and assembles the findings into a report. Front ends supply
//! a target and a validated design system; everything else happens here.

pub mod accessibility;
pub mod analysis;
pub mod css;
pub mod dna;
pub mod domain;
pub mod error;
pub mod evaluator;
pub mod report;
pub mod session;
pub mod source;

pub use analysis::{Analyzer, CancelFlag};
pub use dna::sample_design_system;
pub use domain::{
    DesignSystem, DesignSystemMetadata, ExpectedValue, Finding, FindingStatus, FindingValue,
    Position, Report, Rule, RuleKind, Summary,
};
pub use error::{DesignGuardError, Result};
pub use evaluator::evaluate;
pub use report::{placeholder_screenshot, render_json, render_markdown, short_target};
pub use session::{AnalysisSession, RunTicket};
pub use source::{
    DocumentSource, FetchOptions, HttpSource, InlineSource, PageSource, TargetKind, TargetSource,
    inline_document_url, sample_page, validate_target,
};
