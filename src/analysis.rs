// Capability aggregation: fold per-team EPA breakdowns into one alliance
// profile.

use serde::{Deserialize, Serialize};

use crate::stats::{EpaBreakdown, TeamEventStats};

/// Aggregated alliance capabilities, split by match phase.
///
/// Wire field names stay camelCase to match the existing frontend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityProfile {
    pub auto_capabilities: PhaseCapabilities,
    pub teleop_capabilities: PhaseCapabilities,
    pub endgame_capabilities: PhaseCapabilities,
}

/// One phase's summed scoring potential.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseCapabilities {
    pub coral: CoralLevels,
    pub algae: AlgaeRoutes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoralLevels {
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
    pub l4: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgaeRoutes {
    pub net: f64,
    pub processor: f64,
}

impl PhaseCapabilities {
    fn add(&mut self, breakdown: &EpaBreakdown) {
        self.coral.l1 += breakdown.coral_l1;
        self.coral.l2 += breakdown.coral_l2;
        self.coral.l3 += breakdown.coral_l3;
        self.coral.l4 += breakdown.coral_l4;
        self.algae.net += breakdown.net_algae;
        self.algae.processor += breakdown.processor_algae;
    }
}

/// Fold the surviving team records into one CapabilityProfile.
///
/// A record without an EPA breakdown contributes nothing and is skipped.
/// The upstream breakdown is not split by phase, so each team's values are
/// added to all three phase buckets identically. That mirrors the data
/// source; do not fabricate per-phase splits here.
///
/// The orchestrator must not call this with an empty set; a set where every
/// record is malformed yields the all-zero profile.
pub fn aggregate(team_stats: &[(String, TeamEventStats)]) -> CapabilityProfile {
    let mut profile = CapabilityProfile::default();

    for (team, stats) in team_stats {
        let Some(breakdown) = stats.epa.as_ref().and_then(|epa| epa.breakdown.as_ref()) else {
            tracing::warn!("Missing EPA data for team {team}");
            continue;
        };

        profile.auto_capabilities.add(breakdown);
        profile.teleop_capabilities.add(breakdown);
        profile.endgame_capabilities.add(breakdown);
    }

    profile
}
