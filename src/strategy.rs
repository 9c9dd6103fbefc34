// Strategy generation: heuristic fixed rules, or a chat-completion model
// with a best-effort JSON extraction of the reply.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::analysis::CapabilityProfile;
use crate::llm::LlmClient;
use crate::stats::TeamEventStats;

/// Phase-by-phase strategy advice for one alliance.
///
/// Every field defaults to empty so a model reply missing a section still
/// parses; the frontend renders absent sections as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRecommendation {
    #[serde(default)]
    pub auto_strategy: Vec<String>,
    #[serde(default)]
    pub teleop_strategy: Vec<String>,
    #[serde(default)]
    pub endgame_strategy: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("language model request failed: {0}")]
    Upstream(String),
    #[error("no JSON object found in the model reply")]
    Parse,
}

/// Fixed general-coordination advice appended by the heuristic generator.
const GENERAL_RECOMMENDATIONS: [&str; 4] = [
    "Coordinate robot positions to avoid interference",
    "Assign specific roles based on team strengths",
    "Maintain communication about game piece availability",
    "Plan for defensive strategies if needed",
];

/// Fixed REEFSCAPE scoring rules embedded in the generative prompt.
const GAME_RULES: &str = "\
Game rules (FRC REEFSCAPE):
- Coral scored on the reef: L1 3, L2 4, L3 6, L4 7 points in auto; L1 2, L2 3, L3 4, L4 5 points in teleop.
- Algae: 6 points per algae in the processor, 4 points per algae in the net.
- Coral ranking point: at least 5 coral scored on each reef level.
- Barge ranking point: at least 14 barge points in the endgame.";

/// Deterministic fixed-rule generator. Total: always returns a fully
/// populated recommendation, never fails.
pub fn heuristic_strategy(profile: &CapabilityProfile) -> StrategyRecommendation {
    let mut strategy = StrategyRecommendation::default();

    if profile.auto_capabilities.coral.l4 > 0.0 {
        strategy
            .auto_strategy
            .push("Focus on high-level coral placement in auto".to_string());
    }
    if profile.auto_capabilities.algae.net > 0.0 {
        strategy
            .auto_strategy
            .push("Prioritize net algae collection in auto".to_string());
    }

    let best_level = best_teleop_coral_level(profile);
    strategy
        .teleop_strategy
        .push(format!("Focus on level {best_level} coral placement in teleop"));

    if profile.teleop_capabilities.algae.net > profile.teleop_capabilities.algae.processor {
        strategy
            .teleop_strategy
            .push("Prioritize net algae collection over processing".to_string());
    } else {
        strategy
            .teleop_strategy
            .push("Focus on algae processing".to_string());
    }

    if profile.endgame_capabilities.coral.l4 > 0.0 {
        strategy
            .endgame_strategy
            .push("Attempt high-level coral placement in endgame".to_string());
    }
    if profile.endgame_capabilities.algae.net > 0.0 {
        strategy
            .endgame_strategy
            .push("Collect remaining net algae in endgame".to_string());
    }

    strategy.recommendations = GENERAL_RECOMMENDATIONS
        .iter()
        .map(|r| r.to_string())
        .collect();

    strategy
}

/// Teleop coral level with the highest aggregated score. Ties resolve to
/// the first level in l1..l4 order.
fn best_teleop_coral_level(profile: &CapabilityProfile) -> &'static str {
    let coral = &profile.teleop_capabilities.coral;
    let levels = [
        ("l1", coral.l1),
        ("l2", coral.l2),
        ("l3", coral.l3),
        ("l4", coral.l4),
    ];

    let mut best = levels[0];
    for candidate in &levels[1..] {
        if candidate.1 > best.1 {
            best = *candidate;
        }
    }
    best.0
}

/// Build the generative prompt: raw per-team records, the aggregated
/// profile, the fixed rules block, and the output-shape instruction.
pub fn build_prompt(
    profile: &CapabilityProfile,
    team_stats: &[(String, TeamEventStats)],
) -> String {
    let mut records = serde_json::Map::new();
    for (team, stats) in team_stats {
        records.insert(team.clone(), json!(stats));
    }
    let records = serde_json::Value::Object(records);
    let profile = json!(profile);

    format!(
        "You are a strategy analyst for an FRC alliance.\n\n\
         Per-team Statbotics EPA records:\n{records:#}\n\n\
         Aggregated alliance capability profile:\n{profile:#}\n\n\
         {GAME_RULES}\n\n\
         Suggest a match strategy for this alliance. Respond with ONLY a JSON \
         object with the keys \"autoStrategy\", \"teleopStrategy\", \
         \"endgameStrategy\" and \"recommendations\", each an array of short \
         action strings."
    )
}

/// Best-effort text-to-JSON adapter: take the substring from the first `{`
/// to the last `}` of a free-text reply.
///
/// Brittle by construction (a brace inside an earlier string literal breaks
/// it); swap for the model's structured-output mode once it is available.
fn extract_json_object(reply: &str) -> Result<&str, GenerationError> {
    let start = reply.find('{').ok_or(GenerationError::Parse)?;
    let end = reply.rfind('}').ok_or(GenerationError::Parse)?;
    if end <= start {
        return Err(GenerationError::Parse);
    }
    Ok(&reply[start..=end])
}

/// The two interchangeable strategy generators behind one interface.
#[derive(Debug, Clone)]
pub enum StrategyGenerator {
    Heuristic,
    Generative(LlmClient),
}

impl StrategyGenerator {
    /// Produce a recommendation from the aggregated profile and the raw
    /// per-team records.
    ///
    /// The heuristic variant cannot fail. The generative variant fails with
    /// Upstream on transport problems and Parse when no JSON object can be
    /// recovered from the reply; callers degrade rather than propagate.
    pub async fn generate(
        &self,
        profile: &CapabilityProfile,
        team_stats: &[(String, TeamEventStats)],
    ) -> Result<StrategyRecommendation, GenerationError> {
        match self {
            StrategyGenerator::Heuristic => Ok(heuristic_strategy(profile)),
            StrategyGenerator::Generative(llm) => {
                let prompt = build_prompt(profile, team_stats);
                let reply = llm
                    .chat(&prompt)
                    .await
                    .map_err(|e| GenerationError::Upstream(e.to_string()))?;
                let object = extract_json_object(&reply)?;
                serde_json::from_str(object).map_err(|_| GenerationError::Parse)
            }
        }
    }

    /// Label for logs and metrics.
    pub fn variant(&self) -> &'static str {
        match self {
            StrategyGenerator::Heuristic => "heuristic",
            StrategyGenerator::Generative(_) => "generative",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate;
    use serde_json::json;

    fn profile_from(breakdowns: &[serde_json::Value]) -> CapabilityProfile {
        let stats: Vec<(String, TeamEventStats)> = breakdowns
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let record = json!({ "epa": { "breakdown": b } });
                (format!("{}", 100 + i), serde_json::from_value(record).unwrap())
            })
            .collect();
        aggregate(&stats)
    }

    #[test]
    fn test_heuristic_is_total_on_zero_profile() {
        let strategy = heuristic_strategy(&CapabilityProfile::default());

        // No auto/endgame capability means no tips there, but teleop advice
        // and the general recommendations are always present.
        assert!(strategy.auto_strategy.is_empty());
        assert_eq!(strategy.teleop_strategy.len(), 2);
        assert!(strategy.endgame_strategy.is_empty());
        assert_eq!(strategy.recommendations.len(), 4);
    }

    #[test]
    fn test_heuristic_auto_rules() {
        let profile = profile_from(&[json!({ "coral_l4": 2.0, "net_algae": 1.0 })]);
        let strategy = heuristic_strategy(&profile);

        assert_eq!(
            strategy.auto_strategy,
            vec![
                "Focus on high-level coral placement in auto",
                "Prioritize net algae collection in auto",
            ]
        );
        assert_eq!(
            strategy.endgame_strategy,
            vec![
                "Attempt high-level coral placement in endgame",
                "Collect remaining net algae in endgame",
            ]
        );
    }

    #[test]
    fn test_heuristic_picks_best_teleop_level() {
        let profile = profile_from(&[json!({ "coral_l1": 1.0, "coral_l3": 5.0 })]);
        let strategy = heuristic_strategy(&profile);

        assert_eq!(
            strategy.teleop_strategy[0],
            "Focus on level l3 coral placement in teleop"
        );
    }

    #[test]
    fn test_teleop_level_tie_breaks_to_l1() {
        let profile = profile_from(&[json!({
            "coral_l1": 2.0, "coral_l2": 2.0, "coral_l3": 2.0, "coral_l4": 2.0
        })]);
        let strategy = heuristic_strategy(&profile);

        assert_eq!(
            strategy.teleop_strategy[0],
            "Focus on level l1 coral placement in teleop"
        );
    }

    #[test]
    fn test_algae_route_choice() {
        let net_heavy = profile_from(&[json!({ "net_algae": 3.0, "processor_algae": 1.0 })]);
        assert!(heuristic_strategy(&net_heavy)
            .teleop_strategy
            .contains(&"Prioritize net algae collection over processing".to_string()));

        // Equal routes fall through to processing
        let even = profile_from(&[json!({ "net_algae": 1.0, "processor_algae": 1.0 })]);
        assert!(heuristic_strategy(&even)
            .teleop_strategy
            .contains(&"Focus on algae processing".to_string()));
    }

    #[test]
    fn test_heuristic_is_deterministic() {
        let profile = profile_from(&[json!({ "coral_l2": 1.5, "net_algae": 0.5 })]);
        assert_eq!(heuristic_strategy(&profile), heuristic_strategy(&profile));
    }

    #[test]
    fn test_extract_json_object_with_prose() {
        let reply = "Sure! Here is the plan:\n{\"autoStrategy\": [\"a\"]}\nGood luck!";
        let extracted = extract_json_object(reply).unwrap();
        assert_eq!(extracted, "{\"autoStrategy\": [\"a\"]}");

        let parsed: StrategyRecommendation = serde_json::from_str(extracted).unwrap();
        assert_eq!(parsed.auto_strategy, vec!["a"]);
        assert!(parsed.recommendations.is_empty());
    }

    #[test]
    fn test_extract_json_object_no_braces() {
        assert!(matches!(
            extract_json_object("no structured data here"),
            Err(GenerationError::Parse)
        ));
        // Reversed braces are not an object either
        assert!(matches!(
            extract_json_object("} backwards {"),
            Err(GenerationError::Parse)
        ));
    }

    #[test]
    fn test_prompt_embeds_records_and_rules() {
        let stats: Vec<(String, TeamEventStats)> = vec![(
            "254".to_string(),
            serde_json::from_value(json!({ "epa": { "breakdown": { "coral_l4": 4.2 } } }))
                .unwrap(),
        )];
        let profile = aggregate(&stats);
        let prompt = build_prompt(&profile, &stats);

        assert!(prompt.contains("\"254\""));
        assert!(prompt.contains("autoCapabilities"));
        assert!(prompt.contains("REEFSCAPE"));
        assert!(prompt.contains("\"recommendations\""));
    }

    #[tokio::test]
    async fn test_heuristic_generator_never_fails() {
        let generator = StrategyGenerator::Heuristic;
        let result = generator.generate(&CapabilityProfile::default(), &[]).await;
        assert_eq!(result.unwrap().recommendations.len(), 4);
    }
}
