//! Topic, step and option definitions.

use serde::{Deserialize, Serialize};

/// One performance bucket of a topic (`C1`..`C5` in the built-in catalog).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tier {
    /// Evidence tag this tier stands for, e.g. `"C2"`.
    pub tag: String,
    /// Descriptive name shown in the summary, e.g. "Medium Strength".
    pub name: String,
    #[serde(default)]
    pub range: String,
    /// Typical applications for material in this tier.
    #[serde(default)]
    pub description: String,
    /// Inclusive upper bound for measured values. `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

/// A selectable answer to a step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceOption {
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Defers the whole topic instead of answering.
    #[serde(default)]
    pub skip: bool,
}

impl ChoiceOption {
    pub fn tagged(text: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            text: text.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            skip: false,
        }
    }

    pub fn skip(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: Vec::new(),
            skip: true,
        }
    }
}

/// One question within a topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    pub prompt: String,
    pub options: Vec<ChoiceOption>,
}

impl Step {
    /// A single evidence-free option: the step only asks the user to continue.
    pub fn is_acknowledge(&self) -> bool {
        matches!(self.options.as_slice(), [only] if only.tags.is_empty() && !only.skip)
    }
}

/// One material property the user provides evidence for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub key: String,
    pub label: String,
    /// Field name the classifier backend expects for this topic.
    pub field_name: String,
    #[serde(default)]
    pub tiers: Vec<Tier>,
    pub steps: Vec<Step>,
}

impl Topic {
    pub fn tier(&self, tag: &str) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.tag == tag)
    }

    /// Whether a typed measurement can be bucketed into a tier.
    pub fn accepts_values(&self) -> bool {
        self.tiers.iter().any(|t| t.upper_bound.is_some())
    }

    /// Bucket a measured value: first tier whose bound is not exceeded.
    pub fn bucket(&self, value: f64) -> Option<&Tier> {
        self.tiers.iter().find(|t| match t.upper_bound {
            Some(bound) => value <= bound,
            None => true,
        })
    }

    /// Case-insensitive match of a free-text name against key and label.
    pub fn matches_name(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        self.label.to_lowercase().contains(&query)
            || self.key.to_lowercase().contains(&query.replace(' ', "_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strength() -> Topic {
        let bounds = [Some(30.0), Some(60.0), None];
        Topic {
            key: "tensile_strength".to_string(),
            label: "Tensile Strength (kN/m)".to_string(),
            field_name: "Tensile Cluster".to_string(),
            tiers: bounds
                .iter()
                .enumerate()
                .map(|(i, bound)| Tier {
                    tag: format!("C{}", i + 1),
                    name: format!("Tier {}", i + 1),
                    range: String::new(),
                    description: String::new(),
                    upper_bound: *bound,
                })
                .collect(),
            steps: vec![Step {
                prompt: "Pick one".to_string(),
                options: vec![ChoiceOption::tagged("Low", &["C1"])],
            }],
        }
    }

    #[test]
    fn bucket_uses_inclusive_bounds() {
        let topic = strength();
        assert_eq!(topic.bucket(0.0).unwrap().tag, "C1");
        assert_eq!(topic.bucket(30.0).unwrap().tag, "C1");
        assert_eq!(topic.bucket(30.5).unwrap().tag, "C2");
        assert_eq!(topic.bucket(60.0).unwrap().tag, "C2");
        assert_eq!(topic.bucket(10_000.0).unwrap().tag, "C3");
    }

    #[test]
    fn accepts_values_requires_a_bound() {
        let mut topic = strength();
        assert!(topic.accepts_values());
        for tier in &mut topic.tiers {
            tier.upper_bound = None;
        }
        assert!(!topic.accepts_values());
    }

    #[test]
    fn matches_name_on_label_or_key() {
        let topic = strength();
        assert!(topic.matches_name("tensile"));
        assert!(topic.matches_name("  STRENGTH "));
        assert!(topic.matches_name("tensile strength"));
        assert!(topic.matches_name("tensile_strength"));
        assert!(!topic.matches_name("puncture"));
        assert!(!topic.matches_name("   "));
    }

    #[test]
    fn acknowledge_step_detection() {
        let ack = Step {
            prompt: "Ready?".to_string(),
            options: vec![ChoiceOption::tagged("Got it", &[])],
        };
        assert!(ack.is_acknowledge());

        let skip_only = Step {
            prompt: "Skip?".to_string(),
            options: vec![ChoiceOption::skip("Skip")],
        };
        assert!(!skip_only.is_acknowledge());

        let tagged = Step {
            prompt: "Pick".to_string(),
            options: vec![ChoiceOption::tagged("Low", &["C1"])],
        };
        assert!(!tagged.is_acknowledge());
    }

    #[test]
    fn option_deserializes_with_defaults() {
        let opt: ChoiceOption = serde_json::from_str(r#"{"text": "Not sure"}"#).unwrap();
        assert!(opt.tags.is_empty());
        assert!(!opt.skip);
    }
}
