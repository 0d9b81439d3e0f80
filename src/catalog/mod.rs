//! Topic catalog — the static question tree the dialogue walks through.
//!
//! The catalog is validated once when it is built. After that every lookup
//! by key or index is expected to succeed; a miss is a configuration bug.

pub mod geotextile;
pub mod model;

pub use model::{ChoiceOption, Step, Tier, Topic};

use std::collections::HashSet;
use std::path::Path;

use crate::error::CatalogError;

/// Read-only, validated list of topics in presentation order.
#[derive(Debug, Clone)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    /// Build a catalog, rejecting anything the dialogue could trip over.
    pub fn new(topics: Vec<Topic>) -> Result<Self, CatalogError> {
        if topics.is_empty() {
            return Err(CatalogError::Integrity("catalog has no topics".into()));
        }

        let mut keys = HashSet::new();
        let mut field_names = HashSet::new();
        for topic in &topics {
            if !keys.insert(topic.key.as_str()) {
                return Err(CatalogError::Integrity(format!(
                    "duplicate topic key {}",
                    topic.key
                )));
            }
            // Field names key the classification request; two topics on one
            // field would overwrite each other.
            if !field_names.insert(topic.field_name.trim()) {
                return Err(CatalogError::Integrity(format!(
                    "duplicate field name {:?} on topic {}",
                    topic.field_name, topic.key
                )));
            }
            validate_topic(topic)?;
        }

        Ok(Self { topics })
    }

    /// The built-in nine-parameter geotextile catalog.
    pub fn geotextile() -> Self {
        Self {
            topics: geotextile::topics(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let topics: Vec<Topic> = serde_json::from_str(json)?;
        Self::new(topics)
    }

    /// Load a catalog from a JSON file holding an array of topics.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), topics = catalog.len(), "Loaded topic catalog");
        Ok(catalog)
    }

    pub fn list_all(&self) -> &[Topic] {
        &self.topics
    }

    pub fn get(&self, key: &str) -> Result<&Topic, CatalogError> {
        self.topics
            .iter()
            .find(|t| t.key == key)
            .ok_or_else(|| CatalogError::NotFound {
                key: key.to_string(),
            })
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.topics.iter().position(|t| t.key == key)
    }

    /// Topic by position. Indices come from the catalog itself, so a bad one
    /// is a programming error.
    pub fn topic(&self, index: usize) -> &Topic {
        &self.topics[index]
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

fn validate_topic(topic: &Topic) -> Result<(), CatalogError> {
    let fail = |msg: String| -> Result<(), CatalogError> {
        Err(CatalogError::Integrity(format!("topic {}: {msg}", topic.key)))
    };

    if topic.key.trim().is_empty() {
        return Err(CatalogError::Integrity("topic with empty key".into()));
    }
    if topic.field_name.trim().is_empty() {
        return fail("has no field name".into());
    }
    if topic.steps.is_empty() {
        return fail("has no steps".into());
    }

    let mut tier_tags = HashSet::new();
    for tier in &topic.tiers {
        if !tier_tags.insert(tier.tag.as_str()) {
            return fail(format!("duplicate tier {}", tier.tag));
        }
    }

    for (i, step) in topic.steps.iter().enumerate() {
        if step.options.is_empty() {
            return fail(format!("step {i} has no options"));
        }
        for option in &step.options {
            if option.skip && !option.tags.is_empty() {
                return fail(format!("skip option {:?} carries evidence", option.text));
            }
            if let Some(tag) = option
                .tags
                .iter()
                .find(|tag| !tier_tags.contains(tag.as_str()))
            {
                return fail(format!("option {:?} uses unknown tag {tag}", option.text));
            }
        }
    }

    Ok(())
}
