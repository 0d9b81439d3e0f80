//! Bot message texts.

use crate::catalog::{Tier, TopicCatalog};
use crate::gateway::Prediction;

use super::evidence::ResolvedEvidence;

pub const GREETING: &str = "Hello! I am your Geotextile Classifier Assistant. \
I'll ask a few questions about each material property and then classify your material.";
pub const CONSENT_PROMPT: &str = "Would you like to start?";
pub const CLOSING: &str = "Okay! Thank you for using the Geotextile Classifier.";
pub const FIRST_TOPIC_PROMPT: &str = "Great! Which parameter would you like to start with?";
pub const NEXT_TOPIC_PROMPT: &str =
    "No problem, we'll leave that one. Which parameter would you like to do next?";
pub const PROCEED_PROMPT: &str = "Do you want to classify this material?";
pub const EDIT_PROMPT: &str =
    "Which parameter would you like to change? Type its name or pick one from the list.";
pub const CONNECTION_ERROR: &str = "Error connecting to backend.";
pub const RESTART_PROMPT: &str = "Would you like to test another material?";
pub const YES_NO_HINT: &str = "Please answer yes or no.";

pub const YES: &str = "Yes";
pub const NO: &str = "No";
pub const EDIT: &str = "Edit a parameter";

pub fn invalid_value(reason: &str) -> String {
    format!("{reason} Please pick one of the options or type a non-negative number.")
}

pub fn unrecognized_parameter(input: &str) -> String {
    format!(
        "I couldn't find a parameter called \"{input}\". Try a name like \"Tensile\" or \"Permittivity\"."
    )
}

/// Echo of a tier the user's answer landed in.
pub fn tier_selected(tier: &Tier) -> String {
    let mut text = format!("You selected {}: {}", tier.tag, tier.name);
    if !tier.range.is_empty() {
        text.push_str(&format!(" ({})", tier.range));
    }
    text.push('.');
    if !tier.description.is_empty() {
        text.push(' ');
        text.push_str(&tier.description);
    }
    text
}

/// Topic label → resolved cluster, one line per topic.
pub fn summary(catalog: &TopicCatalog, resolved: &ResolvedEvidence) -> String {
    let mut lines = vec!["All parameters are done. Here is what you chose:".to_string()];
    for entry in resolved.iter() {
        let Some(index) = catalog.index_of(&entry.key) else {
            continue;
        };
        let topic = catalog.topic(index);
        match topic.tier(&entry.tag) {
            Some(tier) => lines.push(format!("- {}: {} {}", topic.label, tier.tag, tier.name)),
            None => lines.push(format!("- {}: {}", topic.label, entry.tag)),
        }
    }
    lines.join("\n")
}

pub fn prediction(prediction: &Prediction) -> String {
    format!(
        "Classification complete!\n\nPredicted Geotextile Type: {}\nConfidence: {}%\n\n{}",
        prediction.predicted_type, prediction.confidence, prediction.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::evidence::EvidenceMap;

    #[test]
    fn tier_selected_includes_range_and_use() {
        let catalog = TopicCatalog::geotextile();
        let tier = catalog.get("tensile_strength").unwrap().tier("C2").unwrap();
        assert_eq!(
            tier_selected(tier),
            "You selected C2: Medium Strength (31–60 kN/m). Subgrade separation in rural roads, light-duty roads."
        );
    }

    #[test]
    fn summary_lists_every_topic_with_tier_name() {
        let catalog = TopicCatalog::geotextile();
        let mut evidence = EvidenceMap::new();
        evidence.record("puncture_resistance", &["C5".to_string()]);
        let resolved = ResolvedEvidence::from_evidence(&catalog, &evidence);

        let text = summary(&catalog, &resolved);
        assert_eq!(text.lines().count(), 10);
        assert!(text.contains("- Tensile Strength (kN/m): C3 High Strength"));
        assert!(text.contains("- Puncture Resistance (N): C5 Ultra High Resistance"));
    }

    #[test]
    fn prediction_carries_all_three_fields() {
        let text = prediction(&Prediction {
            predicted_type: "PP Woven".to_string(),
            confidence: 88.0,
            description: "Good for separation.".to_string(),
        });
        assert!(text.contains("Predicted Geotextile Type: PP Woven"));
        assert!(text.contains("Confidence: 88%"));
        assert!(text.contains("Good for separation."));
    }
}
