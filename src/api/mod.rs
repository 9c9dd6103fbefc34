// HTTP API routes: the analyze-strategy orchestrator plus liveness and
// metrics endpoints.

use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::analysis;
use crate::error::ApiError;
use crate::metrics;
use crate::stats::{StatsClient, TeamEventStats};
use crate::strategy::StrategyGenerator;

// ── Request types ─────────────────────────────────────────────────────

/// Team identifiers arrive as strings or bare numbers; both are accepted
/// and normalized to strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TeamIdent {
    Number(i64),
    Text(String),
}

impl TeamIdent {
    fn into_string(self) -> String {
        match self {
            TeamIdent::Number(n) => n.to_string(),
            TeamIdent::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeStrategyRequest {
    pub teams: Option<Vec<TeamIdent>>,
    pub event: Option<String>,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub stats: StatsClient,
    pub generator: StrategyGenerator,
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/test", get(test_endpoint))
        .route("/api/analyze-strategy", post(analyze_strategy))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "frc-strategy-backend" }))
}

async fn test_endpoint() -> Json<Value> {
    Json(json!({ "message": "Backend server is running!" }))
}

async fn metrics_endpoint() -> String {
    metrics::gather_metrics()
}

/// The per-request pipeline: validate, fan out per-team fetches, drop
/// failures, aggregate the survivors, generate a strategy, respond.
async fn analyze_strategy(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeStrategyRequest>,
) -> Result<Json<Value>, ApiError> {
    let teams: Vec<String> = request
        .teams
        .filter(|teams| !teams.is_empty())
        .ok_or(ApiError::MissingParameters)?
        .into_iter()
        .map(TeamIdent::into_string)
        .collect();
    let event = request
        .event
        .filter(|event| !event.is_empty())
        .ok_or(ApiError::MissingParameters)?;

    tracing::info!(?teams, %event, "Received strategy analysis request");

    // One fetch per team, concurrently; a failed sibling cancels nothing.
    let fetches = teams.iter().map(|team| {
        let stats = &state.stats;
        let event = event.as_str();
        async move { (team.clone(), stats.team_event(team, event).await) }
    });
    let results = futures::future::join_all(fetches).await;

    let mut valid: Vec<(String, TeamEventStats)> = Vec::with_capacity(results.len());
    for (team, result) in results {
        match result {
            Ok(stats) => {
                metrics::TEAM_FETCHES_TOTAL.with_label_values(&["ok"]).inc();
                valid.push((team, stats));
            }
            Err(e) => {
                metrics::TEAM_FETCHES_TOTAL.with_label_values(&["error"]).inc();
                tracing::warn!("{e}");
            }
        }
    }

    if valid.is_empty() {
        return Err(ApiError::NoValidData);
    }

    let profile = analysis::aggregate(&valid);
    tracing::debug!(teams = valid.len(), "Aggregated team capabilities");

    let strategy = match state.generator.generate(&profile, &valid).await {
        Ok(recommendation) => {
            metrics::STRATEGIES_GENERATED_TOTAL
                .with_label_values(&[state.generator.variant()])
                .inc();
            json!(recommendation)
        }
        Err(e) => {
            // Degrade inside a 200 so the caller still gets the analysis.
            metrics::GENERATION_FAILURES_TOTAL.inc();
            tracing::warn!("Strategy generation failed: {e}");
            json!({ "error": "Failed to generate strategy using AI." })
        }
    };

    Ok(Json(json!({
        "analysis": profile,
        "strategy": strategy,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_ident_normalization() {
        let idents: Vec<TeamIdent> = serde_json::from_value(json!([254, "1323"])).unwrap();
        let teams: Vec<String> = idents.into_iter().map(TeamIdent::into_string).collect();
        assert_eq!(teams, vec!["254", "1323"]);
    }

    #[test]
    fn test_request_with_missing_fields_deserializes() {
        let request: AnalyzeStrategyRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.teams.is_none());
        assert!(request.event.is_none());
    }
}
