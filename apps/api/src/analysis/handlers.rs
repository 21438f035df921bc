//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use tracing::info;

use crate::analysis::pipeline::{
    self, AnalysisReport, AnalysisRequest, OptimizeRequest, PlanReport, PlanRequest,
};
use crate::errors::AppError;
use crate::models::plan::PlanSolution;
use crate::state::AppState;

/// POST /api/v1/analysis
///
/// Matches resume skills against the job requirements and returns the weighted
/// score, per-tier breakdown, verdicts and ranked gaps.
pub async fn handle_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    if request.requirements.is_empty() {
        return Err(AppError::Validation(
            "requirements cannot be empty".to_string(),
        ));
    }

    let config = state.analysis.clone();
    let oracle = state.oracle.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        pipeline::analyze(&request, &config, &oracle)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in analysis: {e}")))??;

    Ok(Json(analysis.into_report()))
}

/// POST /api/v1/plan
///
/// Full pipeline: match → score → optimize under the given budgets. Returns the
/// analysis, the selected learning plan and the score expected after completing it.
pub async fn handle_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanReport>, AppError> {
    if request.analysis.requirements.is_empty() {
        return Err(AppError::Validation(
            "requirements cannot be empty".to_string(),
        ));
    }

    let config = state.analysis.clone();
    let oracle = state.oracle.clone();
    let report = tokio::task::spawn_blocking(move || pipeline::plan(&request, &config, &oracle))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in plan: {e}")))??;

    info!(
        analysis_id = %report.analysis.analysis_id,
        selected = report.plan.selected.len(),
        method = ?report.plan.method,
        projected_score = report.projected_score,
        "learning plan generated"
    );

    Ok(Json(report))
}

/// POST /api/v1/optimize
///
/// Optimizes an explicit list of gaps. Useful when gaps were computed elsewhere
/// or edited by the user after analysis.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<PlanSolution>, AppError> {
    let config = state.analysis.clone();
    let plan = tokio::task::spawn_blocking(move || pipeline::optimize_gaps(&request, &config))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in optimize: {e}"))
        })??;

    Ok(Json(plan))
}
