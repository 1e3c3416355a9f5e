//! OpenAPI specification for DesignGuard server.

use utoipa::OpenApi;

use designguard_core::{
    AnalysisSession, DesignSystem, DesignSystemMetadata, Finding, FindingStatus, Position, Report,
    Rule, RuleKind, Summary,
};

use crate::routes::{
    AnalyzeRequest, ErrorResponse, SelectRequest, SelectResponse, SessionAnalyzeRequest,
    ValidationResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::analyze,
        crate::routes::design_system_validate,
        crate::routes::design_system_sample,
        crate::routes::session_state,
        crate::routes::session_analyze,
        crate::routes::session_select,
        crate::routes::session_reset,
        crate::routes::openapi_json
    ),
    components(
        schemas(
            AnalyzeRequest,
            ValidationResponse,
            SessionAnalyzeRequest,
            SelectRequest,
            SelectResponse,
            ErrorResponse,
            DesignSystem,
            DesignSystemMetadata,
            Rule,
            RuleKind,
            Report,
            Summary,
            Finding,
            FindingStatus,
            Position,
            AnalysisSession
        )
    ),
    tags(
        (name = "analysis", description = "Design-system analysis"),
        (name = "design-system", description = "Design System DNA files"),
        (name = "session", description = "Interactive analysis session"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the DesignGuard server.
pub struct ApiDoc;
