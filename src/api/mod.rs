use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    Advisor, Debt, DebtProjection, DebtStrategy, FinancialContext, ProjectionError,
    ProjectionOptions, RuleBasedAdvisor, StrategyComparison, active_debts, compare_strategies,
    payoff_date, project, projected_completion, validate_cap, validate_debts, validate_extra,
};

const DEFAULT_STRATEGY: DebtStrategy = DebtStrategy::Snowball;

#[derive(Clone)]
pub struct AppState {
    advisor: Arc<dyn Advisor>,
}

impl AppState {
    pub fn new(advisor: Arc<dyn Advisor>) -> Self {
        Self { advisor }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(RuleBasedAdvisor))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    debts: Vec<Debt>,
    strategy: Option<String>,
    #[serde(alias = "extra", alias = "extra_monthly_payment")]
    extra_monthly_payment: Option<f64>,
    #[serde(alias = "cap", alias = "monthly_cap_safety")]
    monthly_cap_safety: Option<u32>,
    #[serde(alias = "start_date")]
    start_date: Option<String>,
    #[serde(alias = "include_advice")]
    include_advice: Option<bool>,
    #[serde(alias = "financial_context")]
    financial_context: Option<FinancialContext>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    debts: Vec<Debt>,
    #[serde(alias = "extra", alias = "extra_monthly_payment")]
    extra_monthly_payment: Option<f64>,
    #[serde(alias = "cap", alias = "monthly_cap_safety")]
    monthly_cap_safety: Option<u32>,
}

#[derive(Debug)]
struct ProjectionRequest {
    debts: Vec<Debt>,
    excluded_debt_ids: Vec<String>,
    options: ProjectionOptions,
    start_date: Option<NaiveDate>,
    include_advice: bool,
    context: FinancialContext,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayoffDateEntry {
    debt_id: String,
    payoff_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    projection: DebtProjection,
    excluded_debt_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payoff_dates: Option<Vec<PayoffDateEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completion_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy_explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/projection", post(projection_post_handler))
        .route("/api/compare", post(compare_post_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState::default());

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "debt payoff API listening");
    info!("local access: http://127.0.0.1:{port}/health");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_post_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProjectionPayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let request = match projection_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };

    debug!(
        debts = request.debts.len(),
        excluded = request.excluded_debt_ids.len(),
        strategy = %request.options.strategy,
        "projecting debts"
    );
    let projection = project(&request.debts, &request.options);
    if !projection.converged {
        warn!(
            months = projection.months_to_payoff,
            strategy = %projection.strategy,
            "projection did not converge within the safety cap"
        );
    }

    let response = build_projection_response(&request, projection, state.advisor.as_ref());
    json_response(StatusCode::OK, response)
}

async fn compare_post_handler(
    payload: Result<Json<ComparePayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let (debts, extra, cap) = match compare_request_from_payload(payload) {
        Ok(parts) => parts,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };

    debug!(debts = debts.len(), extra, cap, "comparing strategies");
    let comparison: StrategyComparison = compare_strategies(&debts, extra, cap);
    json_response(StatusCode::OK, comparison)
}

fn build_projection_response(
    request: &ProjectionRequest,
    projection: DebtProjection,
    advisor: &dyn Advisor,
) -> ProjectionResponse {
    let payoff_dates = request.start_date.map(|start| {
        projection
            .payoff_details
            .iter()
            .map(|detail| PayoffDateEntry {
                debt_id: detail.debt_id.clone(),
                payoff_date: payoff_date(start, detail),
            })
            .collect()
    });
    let completion_date = request
        .start_date
        .and_then(|start| projected_completion(start, &projection));

    let (strategy_explanation, summary) = if request.include_advice {
        (
            advisor.explain_strategy(projection.strategy),
            advisor.summarize_projection(&projection, &request.debts, &request.context),
        )
    } else {
        (None, None)
    };

    ProjectionResponse {
        projection,
        excluded_debt_ids: request.excluded_debt_ids.clone(),
        payoff_dates,
        completion_date,
        strategy_explanation,
        summary,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn rejection_response(rejection: JsonRejection) -> Response {
    debug!(status = %rejection.status(), "rejected request body");
    error_response(
        rejection.status(),
        &format!("Invalid API JSON payload: {}", rejection.body_text()),
    )
}

#[cfg(test)]
fn projection_request_from_json(json: &str) -> Result<ProjectionRequest, String> {
    let payload = serde_json::from_str::<ProjectionPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    projection_request_from_payload(payload).map_err(|e| e.to_string())
}

fn projection_request_from_payload(
    payload: ProjectionPayload,
) -> Result<ProjectionRequest, ProjectionError> {
    let strategy = match payload.strategy.as_deref() {
        Some(raw) => raw.parse::<DebtStrategy>()?,
        None => DEFAULT_STRATEGY,
    };
    let extra = validate_extra(payload.extra_monthly_payment)?;
    let cap = validate_cap(payload.monthly_cap_safety)?;

    let start_date = match payload.start_date.as_deref() {
        Some(raw) => Some(NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
            ProjectionError::InvalidInput(format!("startDate must be YYYY-MM-DD, got {raw:?}"))
        })?),
        None => None,
    };

    validate_debts(&payload.debts)?;
    let debts = active_debts(&payload.debts);
    let excluded_debt_ids = payload
        .debts
        .iter()
        .filter(|debt| !debts.iter().any(|active| active.id == debt.id))
        .map(|debt| debt.id.clone())
        .collect();

    Ok(ProjectionRequest {
        debts,
        excluded_debt_ids,
        options: ProjectionOptions::new(strategy, extra).with_cap(cap),
        start_date,
        include_advice: payload.include_advice.unwrap_or(false),
        context: payload.financial_context.unwrap_or_default(),
    })
}

fn compare_request_from_payload(
    payload: ComparePayload,
) -> Result<(Vec<Debt>, f64, u32), ProjectionError> {
    let extra = validate_extra(payload.extra_monthly_payment)?;
    let cap = validate_cap(payload.monthly_cap_safety)?;
    validate_debts(&payload.debts)?;
    Ok((active_debts(&payload.debts), extra, cap))
}
