// Statbotics client: per-team-per-event EPA lookups.
//
// One GET per team against `{base}/team_event/{team}/{event}`. A failed
// fetch is reported as a FetchError tagged with the team number; the
// orchestrator decides what to do with it (exclusion, never propagation).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A single team's statistics document for one event.
///
/// Only the EPA breakdown is read structurally; everything else the
/// upstream returns is preserved in `extra` so the generative prompt can
/// embed the full record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEventStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epa: Option<Epa>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The EPA block of a team_event document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Epa {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<EpaBreakdown>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-category expected point contributions. Missing fields read as 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpaBreakdown {
    #[serde(default)]
    pub coral_l1: f64,
    #[serde(default)]
    pub coral_l2: f64,
    #[serde(default)]
    pub coral_l3: f64,
    #[serde(default)]
    pub coral_l4: f64,
    #[serde(default)]
    pub net_algae: f64,
    #[serde(default)]
    pub processor_algae: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single team's fetch failed. Recovered by exclusion, never surfaced
/// individually to the caller.
#[derive(Debug, Error)]
#[error("Error fetching stats for team {team}: {message}")]
pub struct FetchError {
    pub team: String,
    pub message: String,
}

/// Read-only client for the statistics service.
#[derive(Debug, Clone)]
pub struct StatsClient {
    http: reqwest::Client,
    base_url: String,
}

impl StatsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch one team's stats for one event.
    ///
    /// No retries, no timeout override beyond the transport default. Any
    /// transport error or non-2xx status becomes a FetchError.
    pub async fn team_event(&self, team: &str, event: &str) -> Result<TeamEventStats, FetchError> {
        let url = format!("{}/team_event/{}/{}", self.base_url, team, event);
        tracing::debug!("Fetching stats for team {team} in event {event}");

        let fetch_error = |message: String| FetchError {
            team: team.to_string(),
            message,
        };

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("upstream returned status {status}")));
        }

        response
            .json::<TeamEventStats>()
            .await
            .map_err(|e| fetch_error(format!("invalid stats document: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_breakdown_missing_fields_default_to_zero() {
        let stats: TeamEventStats = serde_json::from_value(json!({
            "team": 254,
            "epa": { "breakdown": { "coral_l4": 3.5 } }
        }))
        .unwrap();

        let breakdown = stats.epa.unwrap().breakdown.unwrap();
        assert_eq!(breakdown.coral_l4, 3.5);
        assert_eq!(breakdown.coral_l1, 0.0);
        assert_eq!(breakdown.net_algae, 0.0);
        assert_eq!(breakdown.processor_algae, 0.0);
    }

    #[test]
    fn test_missing_epa_block() {
        let stats: TeamEventStats =
            serde_json::from_value(json!({ "team": 1323, "event": "2025mike" })).unwrap();
        assert!(stats.epa.is_none());
        assert_eq!(stats.extra.get("event"), Some(&json!("2025mike")));
    }

    #[test]
    fn test_unknown_fields_preserved_for_prompt() {
        let doc = json!({
            "team": 254,
            "record": { "wins": 10, "losses": 2 },
            "epa": { "total_points": { "mean": 61.2 }, "breakdown": { "coral_l1": 1.0 } }
        });
        let stats: TeamEventStats = serde_json::from_value(doc).unwrap();

        // Round-trips through serde keep the fields the aggregator ignores
        let back = serde_json::to_value(&stats).unwrap();
        assert_eq!(back["record"]["wins"], json!(10));
        assert_eq!(back["epa"]["total_points"]["mean"], json!(61.2));
        assert_eq!(back["epa"]["breakdown"]["coral_l1"], json!(1.0));
    }
}
