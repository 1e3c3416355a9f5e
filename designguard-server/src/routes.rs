//! HTTP handlers for DesignGuard server.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, get, post, web};
use designguard_core::{
    AnalysisSession, Analyzer, CancelFlag, DesignGuardError, DesignSystem, FetchOptions, Finding,
    Report, RuleKind, TargetSource, sample_design_system, validate_target,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use utoipa::{OpenApi, ToSchema};

use crate::openapi::ApiDoc;

#[derive(Clone)]
/// Shared application state for handlers.
pub struct AppState {
    /// How analyses fetch their targets.
    pub analysis: AnalysisConfig,
    /// The interactive analysis session.
    pub session: Arc<RwLock<AnalysisSession>>,
    /// Cancels the session run currently in flight.
    pub active_run: Arc<Mutex<Option<CancelFlag>>>,
}

impl AppState {
    /// Build state with an empty session.
    pub fn new(analysis: AnalysisConfig) -> Self {
        Self {
            analysis,
            session: Arc::new(RwLock::new(AnalysisSession::new())),
            active_run: Arc::new(Mutex::new(None)),
        }
    }
}

/// Analysis configuration loaded from the environment.
#[derive(Clone, Debug, Default)]
pub struct AnalysisConfig {
    /// Options for HTTP fetches.
    pub fetch: FetchOptions,
    /// Whether unreachable targets fall back to the built-in sample page.
    pub fallback: bool,
}

impl AnalysisConfig {
    /// Build analysis config from environment variables.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_env() -> Self {
        let mut fetch = FetchOptions::default();
        if let Some(seconds) = std::env::var("DESIGNGUARD_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|seconds| *seconds > 0)
        {
            fetch.timeout = Duration::from_secs(seconds);
        }
        fetch.proxy = std::env::var("DESIGNGUARD_PROXY")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let fallback = std::env::var("DESIGNGUARD_FALLBACK")
            .map(|value| !(value == "0" || value.eq_ignore_ascii_case("false")))
            .unwrap_or(true);
        Self { fetch, fallback }
    }

    fn analyzer(&self) -> Analyzer<TargetSource> {
        let analyzer = Analyzer::new(TargetSource::new(self.fetch.clone()));
        if self.fallback {
            analyzer
        } else {
            analyzer.with_fallback(None)
        }
    }
}

/// Request payload for a one-off analysis.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Website URL or `data:text/html` document to analyze.
    pub url: String,
    /// Design System DNA to validate against.
    #[schema(value_type = Object)]
    pub design_system: serde_json::Value,
}

/// Summary of a valid design system.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    /// Design system name.
    pub name: String,
    /// Design system version.
    pub version: String,
    /// Number of rules.
    pub rule_count: usize,
    /// Distinct rule kinds, in first-seen order.
    pub rule_kinds: Vec<RuleKind>,
}

/// Request payload for a session analysis.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalyzeRequest {
    /// Replaces the session URL when present.
    pub url: Option<String>,
    /// Replaces the session design system when present.
    #[schema(value_type = Option<Object>)]
    pub design_system: Option<serde_json::Value>,
}

/// Request payload for selecting a finding.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    /// Finding id to select; `null` clears the selection.
    pub result_id: Option<String>,
}

/// Response payload for a selection.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    /// The selected finding, if any.
    pub selected_result: Option<Finding>,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        message: message.into(),
    })
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, message)
}

fn session_unavailable() -> HttpResponse {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "session unavailable")
}

fn validation_summary(design_system: &DesignSystem) -> ValidationResponse {
    let mut rule_kinds = Vec::new();
    for rule in &design_system.rules {
        if !rule_kinds.contains(&rule.kind) {
            rule_kinds.push(rule.kind);
        }
    }
    ValidationResponse {
        name: design_system.name.clone(),
        version: design_system.version.clone(),
        rule_count: design_system.rules.len(),
        rule_kinds,
    }
}

/// Register every DesignGuard endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze)
        .service(design_system_validate)
        .service(design_system_sample)
        .service(session_state)
        .service(session_analyze)
        .service(session_select)
        .service(session_reset)
        .service(openapi_json);
}

#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis report", body = Report),
        (status = 400, description = "Invalid URL or design system", body = ErrorResponse),
        (status = 502, description = "Analysis failed", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/analyze")]
/// Analyze a page against a design system.
pub async fn analyze(
    state: web::Data<AppState>,
    payload: web::Json<AnalyzeRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let url = request.url.trim().to_string();
    if url.is_empty() {
        return bad_request("URL and Design System DNA are required for analysis");
    }
    if let Err(err) = validate_target(&url) {
        return bad_request(err.to_string());
    }
    let design_system = match DesignSystem::from_value(request.design_system) {
        Ok(design_system) => design_system,
        Err(err) => return bad_request(err.to_string()),
    };

    let analyzer = state.analysis.analyzer();
    let result = web::block(move || analyzer.analyze(&url, &design_system, |_| {})).await;

    match result {
        Ok(Ok(report)) => HttpResponse::Ok().json(report),
        Ok(Err(err)) => error_response(StatusCode::BAD_GATEWAY, err.to_string()),
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("analysis task failed: {err}"),
        ),
    }
}

#[utoipa::path(
    post,
    path = "/design-system/validate",
    request_body(content = String, description = "Design System DNA JSON", content_type = "application/json"),
    responses(
        (status = 200, description = "Design system is valid", body = ValidationResponse),
        (status = 400, description = "Invalid design system", body = ErrorResponse)
    ),
    tag = "design-system"
)]
#[post("/api/design-system/validate")]
/// Validate a Design System DNA document.
pub async fn design_system_validate(body: String) -> impl Responder {
    match DesignSystem::from_json(&body) {
        Ok(design_system) => HttpResponse::Ok().json(validation_summary(&design_system)),
        Err(err) => bad_request(err.to_string()),
    }
}

#[utoipa::path(
    get,
    path = "/design-system/sample",
    responses(
        (status = 200, description = "Sample design system", body = DesignSystem)
    ),
    tag = "design-system"
)]
#[get("/api/design-system/sample")]
/// Download the sample design system.
pub async fn design_system_sample() -> impl Responder {
    HttpResponse::Ok().json(sample_design_system())
}

#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session", body = AnalysisSession)
    ),
    tag = "session"
)]
#[get("/api/session")]
/// Fetch the current session state, including progress of a running analysis.
pub async fn session_state(state: web::Data<AppState>) -> impl Responder {
    match state.session.read() {
        Ok(session) => HttpResponse::Ok().json(&*session),
        Err(_) => session_unavailable(),
    }
}

#[utoipa::path(
    post,
    path = "/session/analyze",
    request_body = SessionAnalyzeRequest,
    responses(
        (status = 200, description = "Session after the run", body = AnalysisSession),
        (status = 400, description = "Missing or invalid inputs", body = ErrorResponse),
        (status = 409, description = "Run superseded", body = ErrorResponse),
        (status = 502, description = "Analysis failed", body = ErrorResponse)
    ),
    tag = "session"
)]
#[post("/api/session/analyze")]
/// Run an analysis with the session inputs, superseding any run in flight.
pub async fn session_analyze(
    state: web::Data<AppState>,
    payload: web::Json<SessionAnalyzeRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let design_system = match request.design_system.map(DesignSystem::from_value) {
        Some(Ok(design_system)) => Some(design_system),
        Some(Err(err)) => return bad_request(err.to_string()),
        None => None,
    };

    let (ticket, cancel) = {
        let Ok(mut session) = state.session.write() else {
            return session_unavailable();
        };
        if let Some(url) = request.url {
            session.set_website_url(url);
        }
        if design_system.is_some() {
            session.set_design_system(design_system);
        }
        let ticket = match session.begin() {
            Ok(ticket) => ticket,
            Err(err) => return bad_request(err.to_string()),
        };
        if let Err(err) = validate_target(&ticket.website_url) {
            session.fail(&ticket.run_id, err.to_string());
            return bad_request(err.to_string());
        }
        // Registered under the session lock so the flag always belongs to the newest run.
        let cancel = CancelFlag::new();
        let Ok(mut active) = state.active_run.lock() else {
            session.fail(&ticket.run_id, "session state unavailable");
            return session_unavailable();
        };
        if let Some(previous) = active.replace(cancel.clone()) {
            previous.cancel();
        }
        (ticket, cancel)
    };

    let run_id = ticket.run_id.clone();
    info!("session run {run_id} started");
    let analyzer = state.analysis.analyzer().with_cancel_flag(cancel);
    let progress_session = state.session.clone();
    let progress_run_id = run_id.clone();
    let result = web::block(move || {
        analyzer.analyze(&ticket.website_url, &ticket.design_system, |progress| {
            if let Ok(mut session) = progress_session.write() {
                session.record_progress(&progress_run_id, progress);
            }
        })
    })
    .await;
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => Err(DesignGuardError::Other(format!("analysis task failed: {err}"))),
    };

    let Ok(mut session) = state.session.write() else {
        return session_unavailable();
    };
    match outcome {
        Ok(report) => {
            if session.complete(&run_id, report) {
                HttpResponse::Ok().json(&*session)
            } else {
                superseded(&run_id)
            }
        }
        Err(err) => {
            let message = err.to_string();
            if session.fail(&run_id, message.clone()) {
                warn!("session run {run_id} failed: {message}");
                error_response(StatusCode::BAD_GATEWAY, message)
            } else {
                superseded(&run_id)
            }
        }
    }
}

fn superseded(run_id: &str) -> HttpResponse {
    info!("session run {run_id} superseded");
    error_response(StatusCode::CONFLICT, "analysis was superseded by a newer run")
}

#[utoipa::path(
    post,
    path = "/session/select",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Selected finding", body = SelectResponse)
    ),
    tag = "session"
)]
#[post("/api/session/select")]
/// Select a finding of the current report for the detail view.
pub async fn session_select(
    state: web::Data<AppState>,
    payload: web::Json<SelectRequest>,
) -> impl Responder {
    let Ok(mut session) = state.session.write() else {
        return session_unavailable();
    };
    let selected_result = session.select_result(payload.result_id.as_deref()).cloned();
    HttpResponse::Ok().json(SelectResponse { selected_result })
}

#[utoipa::path(
    post,
    path = "/session/reset",
    responses(
        (status = 200, description = "Session after reset", body = AnalysisSession)
    ),
    tag = "session"
)]
#[post("/api/session/reset")]
/// Reset the session, cancelling any run in flight.
pub async fn session_reset(state: web::Data<AppState>) -> impl Responder {
    let Ok(mut session) = state.session.write() else {
        return session_unavailable();
    };
    if let Ok(mut active) = state.active_run.lock() {
        if let Some(cancel) = active.take() {
            cancel.cancel();
        }
    }
    session.reset();
    HttpResponse::Ok().json(&*session)
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/api/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
