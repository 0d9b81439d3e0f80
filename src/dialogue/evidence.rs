//! Evidence aggregation: per-topic tag collection and majority resolution.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::TopicCatalog;

/// Tag assumed for a topic that never collected any evidence.
pub const DEFAULT_TAG: &str = "C3";

/// Reduce a topic's evidence to one representative tag.
///
/// Majority wins; a tie goes to the lexicographically greatest tag. No
/// evidence at all resolves to [`DEFAULT_TAG`].
pub fn resolve(evidence: &[String]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in evidence {
        *counts.entry(tag.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_tag, a_count), (b_tag, b_count)| {
            a_count.cmp(b_count).then_with(|| a_tag.cmp(b_tag))
        })
        .map(|(tag, _)| tag.to_string())
        .unwrap_or_else(|| DEFAULT_TAG.to_string())
}

/// Evidence tags collected per topic key, in the order they were given.
///
/// A key only appears once its topic has been started.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EvidenceMap {
    entries: HashMap<String, Vec<String>>,
}

impl EvidenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a topic as started.
    pub fn start(&mut self, key: &str) {
        self.entries.entry(key.to_string()).or_default();
    }

    pub fn record(&mut self, key: &str, tags: &[String]) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .extend(tags.iter().cloned());
    }

    /// Drop a topic's evidence so it can be answered again from scratch.
    pub fn clear(&mut self, key: &str) {
        if let Some(tags) = self.entries.get_mut(key) {
            tags.clear();
        }
    }

    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Final tag for one topic, with the backend field it maps to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedTopic {
    pub key: String,
    pub field_name: String,
    pub tag: String,
}

/// One resolved tag per catalog topic, in catalog order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedEvidence {
    topics: Vec<ResolvedTopic>,
}

impl ResolvedEvidence {
    /// Resolve every catalog topic against the collected evidence.
    pub fn from_evidence(catalog: &TopicCatalog, evidence: &EvidenceMap) -> Self {
        let topics = catalog
            .list_all()
            .iter()
            .map(|topic| ResolvedTopic {
                key: topic.key.clone(),
                field_name: topic.field_name.clone(),
                tag: resolve(evidence.get(&topic.key)),
            })
            .collect();
        Self { topics }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.topics
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.tag.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedTopic> {
        self.topics.iter()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
