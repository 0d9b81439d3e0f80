//! A dialogue session bound to a classifier.
//!
//! The controller is held behind an async mutex. The lock is released while
//! a classification request is in flight, so a restart can land in between;
//! the generation carried by the ticket decides whether the result still
//! applies.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::catalog::TopicCatalog;
use crate::config::AssistConfig;
use crate::dialogue::{
    ClassificationTicket, DialogueController, DialoguePhase, Effect, Input, Message,
};
use crate::error::{self, InputError};
use crate::gateway::{Classifier, HttpClassifier};

/// Serializable view of a session, as served over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct DialogueSnapshot {
    pub session_id: Uuid,
    pub generation: u64,
    pub phase: DialoguePhase,
    pub choices: Vec<String>,
    pub accepts_value: bool,
    pub messages: Vec<Message>,
}

pub struct DialogueSession {
    id: Uuid,
    controller: Mutex<DialogueController>,
    classifier: Arc<dyn Classifier>,
}

impl DialogueSession {
    pub fn new(catalog: Arc<TopicCatalog>, classifier: Arc<dyn Classifier>) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(session_id = %id, topics = catalog.len(), "Dialogue session created");
        Self {
            id,
            controller: Mutex::new(DialogueController::new(catalog)),
            classifier,
        }
    }

    /// Build a session from configuration: validated settings, the configured
    /// or built-in catalog, and an HTTP classifier.
    pub fn from_config(config: &AssistConfig) -> error::Result<Self> {
        config.validate()?;
        let catalog = match &config.catalog_path {
            Some(path) => TopicCatalog::load(path)?,
            None => TopicCatalog::geotextile(),
        };
        let classifier = HttpClassifier::new(&config.gateway)?;
        Ok(Self::new(Arc::new(catalog), Arc::new(classifier)))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Apply one user event, running the classification it triggers.
    pub async fn submit(&self, input: Input) -> Result<(), InputError> {
        if let Some(ticket) = self.begin(input).await? {
            self.classify(ticket).await;
        }
        Ok(())
    }

    /// Apply one user event without running the classification.
    pub async fn begin(&self, input: Input) -> Result<Option<ClassificationTicket>, InputError> {
        match self.controller.lock().await.handle(input)? {
            Effect::Classify(ticket) => Ok(Some(ticket)),
            Effect::None => Ok(None),
        }
    }

    /// Run a ticket against the classifier and feed the result back.
    pub async fn classify(&self, ticket: ClassificationTicket) {
        let result = self.classifier.classify(&ticket.request).await;
        let applied = self
            .controller
            .lock()
            .await
            .apply_classification(ticket.generation, result);
        if !applied {
            tracing::info!(session_id = %self.id, "Classification result arrived after restart");
        }
    }

    pub async fn restart(&self) {
        self.controller.lock().await.restart();
    }

    pub async fn snapshot(&self) -> DialogueSnapshot {
        let controller = self.controller.lock().await;
        DialogueSnapshot {
            session_id: self.id,
            generation: controller.generation(),
            phase: controller.phase(),
            choices: controller.choices(),
            accepts_value: controller.accepts_value(),
            messages: controller.timeline().messages().to_vec(),
        }
    }

    /// Direct access for presentation layers that reveal the timeline.
    pub async fn lock(&self) -> MutexGuard<'_, DialogueController> {
        self.controller.lock().await
    }
}
