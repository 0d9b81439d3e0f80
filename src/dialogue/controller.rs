//! DialogueController — drives one session through consent, topics, steps,
//! summary and classification.
//!
//! Every user event is processed to completion before the next one. The
//! only asynchronous part, the classification call, is handed back to the
//! caller as an [`Effect`]; its result comes back through
//! [`DialogueController::apply_classification`] tagged with the session
//! generation it was issued under.

use std::sync::Arc;

use crate::catalog::{ChoiceOption, Topic, TopicCatalog};
use crate::error::{GatewayError, InputError};
use crate::gateway::{ClassificationRequest, Prediction};

use super::evidence::{EvidenceMap, ResolvedEvidence};
use super::prompts;
use super::state::{ChoiceKind, DialoguePhase, DialogueState, TopicScope};
use super::timeline::{Author, MessageTimeline};

/// A user event.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Index into the currently offered choices.
    Choice(usize),
    /// Free text: yes/no, a parameter name, an option label or a measured value.
    Text(String),
}

/// A classification the caller must perform on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationTicket {
    pub generation: u64,
    pub request: ClassificationRequest,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Classify(ClassificationTicket),
}

enum FinalDecision {
    Proceed,
    Decline,
    Edit,
}

pub struct DialogueController {
    catalog: Arc<TopicCatalog>,
    state: DialogueState,
    evidence: EvidenceMap,
    resolved: Option<ResolvedEvidence>,
    timeline: MessageTimeline,
    /// Bumped on every restart; stale classification results are dropped.
    generation: u64,
}

impl DialogueController {
    /// Create a controller and run the boot transition (greeting + consent).
    pub fn new(catalog: Arc<TopicCatalog>) -> Self {
        let mut controller = Self {
            catalog,
            state: DialogueState::default(),
            evidence: EvidenceMap::new(),
            resolved: None,
            timeline: MessageTimeline::new(),
            generation: 0,
        };
        controller.boot();
        controller
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    pub fn phase(&self) -> DialoguePhase {
        self.state.phase
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn evidence(&self) -> &EvidenceMap {
        &self.evidence
    }

    pub fn resolved(&self) -> Option<&ResolvedEvidence> {
        self.resolved.as_ref()
    }

    pub fn timeline(&self) -> &MessageTimeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut MessageTimeline {
        &mut self.timeline
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Labels of the choices currently on offer, in index order.
    pub fn choices(&self) -> Vec<String> {
        match self.state.phase.pending_choice() {
            ChoiceKind::Nothing => Vec::new(),
            ChoiceKind::YesNo => vec![prompts::YES.to_string(), prompts::NO.to_string()],
            ChoiceKind::ProceedOrEdit => vec![
                prompts::YES.to_string(),
                prompts::NO.to_string(),
                prompts::EDIT.to_string(),
            ],
            ChoiceKind::TopicList => {
                let scope = match self.state.phase {
                    DialoguePhase::AwaitingTopicChoice { scope } => scope,
                    _ => TopicScope::Full,
                };
                self.topic_labels(&self.candidate_topics(scope))
            }
            ChoiceKind::ParameterName => {
                self.topic_labels(&self.candidate_topics(TopicScope::Full))
            }
            ChoiceKind::StepOptions => match self.state.phase {
                DialoguePhase::AwaitingStepAnswer { topic, step } => self.catalog.topic(topic).steps
                    [step]
                    .options
                    .iter()
                    .map(|o| o.text.clone())
                    .collect(),
                _ => Vec::new(),
            },
        }
    }

    /// Whether a typed measurement is accepted at the current step.
    pub fn accepts_value(&self) -> bool {
        match self.state.phase {
            DialoguePhase::AwaitingStepAnswer { topic, step } => {
                let topic = self.catalog.topic(topic);
                topic.accepts_values() && !topic.steps[step].is_acknowledge()
            }
            _ => false,
        }
    }

    /// Process one user event.
    pub fn handle(&mut self, input: Input) -> Result<Effect, InputError> {
        match self.state.phase {
            DialoguePhase::AwaitingConsent => self.on_consent(input),
            DialoguePhase::AwaitingTopicChoice { scope } => self.on_topic_choice(scope, input),
            DialoguePhase::AwaitingStepAnswer { topic, step } => {
                self.on_step_answer(topic, step, input)
            }
            DialoguePhase::AwaitingFinalConfirm => self.on_final_confirm(input),
            DialoguePhase::AwaitingEditTopic => self.on_edit_topic(input),
            DialoguePhase::AwaitingRestartConfirm => self.on_restart_confirm(input),
            phase @ (DialoguePhase::Booting
            | DialoguePhase::AwaitingClassification
            | DialoguePhase::Done) => Err(InputError::NotAcceptingInput {
                phase: phase.to_string(),
            }),
        }
    }

    /// Reset everything and replay the greeting.
    pub fn restart(&mut self) {
        self.generation += 1;
        self.state = DialogueState::default();
        self.evidence = EvidenceMap::new();
        self.resolved = None;
        self.timeline.clear();
        tracing::info!(generation = self.generation, "Dialogue restarted");
        self.boot();
    }

    /// Feed back the outcome of a classification ticket.
    ///
    /// Returns false when the result was discarded because the session was
    /// restarted (or otherwise moved on) after the ticket was issued.
    pub fn apply_classification(
        &mut self,
        generation: u64,
        result: Result<Prediction, GatewayError>,
    ) -> bool {
        if generation != self.generation
            || self.state.phase != DialoguePhase::AwaitingClassification
        {
            tracing::debug!(
                ticket_generation = generation,
                generation = self.generation,
                phase = %self.state.phase,
                "Discarding stale classification result"
            );
            return false;
        }

        match result {
            Ok(prediction) => {
                self.bot(prompts::prediction(&prediction));
                self.bot(prompts::RESTART_PROMPT);
                self.set_phase(DialoguePhase::AwaitingRestartConfirm);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Classification failed");
                self.bot(prompts::CONNECTION_ERROR);
                self.set_phase(DialoguePhase::AwaitingFinalConfirm);
            }
        }
        true
    }

    // ── Transitions ─────────────────────────────────────────────────────

    fn boot(&mut self) {
        self.bot(prompts::GREETING);
        self.bot(prompts::CONSENT_PROMPT);
        self.set_phase(DialoguePhase::AwaitingConsent);
    }

    fn on_consent(&mut self, input: Input) -> Result<Effect, InputError> {
        if self.yes_no(&input)? {
            self.user(prompts::YES);
            self.bot(prompts::FIRST_TOPIC_PROMPT);
            self.set_phase(DialoguePhase::AwaitingTopicChoice {
                scope: TopicScope::Full,
            });
        } else {
            self.user(prompts::NO);
            self.close();
        }
        Ok(Effect::None)
    }

    fn on_topic_choice(&mut self, scope: TopicScope, input: Input) -> Result<Effect, InputError> {
        let candidates = self.candidate_topics(scope);
        let index = self.pick_topic(&candidates, input)?;
        self.user(self.catalog.topic(index).label.clone());
        self.start_topic(index);
        Ok(Effect::None)
    }

    fn on_step_answer(
        &mut self,
        topic_index: usize,
        step_index: usize,
        input: Input,
    ) -> Result<Effect, InputError> {
        let catalog = Arc::clone(&self.catalog);
        let topic = catalog.topic(topic_index);
        let step = &topic.steps[step_index];

        match input {
            Input::Choice(index) => {
                let option = step.options.get(index).ok_or(InputError::InvalidChoice {
                    index,
                    available: step.options.len(),
                })?;
                self.answer_option(topic_index, step_index, topic, option);
                Ok(Effect::None)
            }
            Input::Text(text) => {
                let wanted = text.trim();
                if let Some(option) = step
                    .options
                    .iter()
                    .find(|o| o.text.eq_ignore_ascii_case(wanted))
                {
                    self.answer_option(topic_index, step_index, topic, option);
                    return Ok(Effect::None);
                }
                self.answer_value(topic_index, step_index, topic, wanted)?;
                Ok(Effect::None)
            }
        }
    }

    fn answer_option(
        &mut self,
        topic_index: usize,
        step_index: usize,
        topic: &Topic,
        option: &ChoiceOption,
    ) {
        self.user(option.text.clone());

        if option.skip {
            tracing::debug!(topic = %topic.key, step = step_index, "Topic skipped");
            self.finish_topic(topic_index, true);
            return;
        }

        self.evidence.record(&topic.key, &option.tags);
        if let [tag] = option.tags.as_slice() {
            if let Some(tier) = topic.tier(tag) {
                self.bot(prompts::tier_selected(tier));
            }
        }
        self.advance_step(topic_index, step_index, topic);
    }

    /// Free-text measurement, bucketed through the topic's tier bounds.
    fn answer_value(
        &mut self,
        topic_index: usize,
        step_index: usize,
        topic: &Topic,
        text: &str,
    ) -> Result<(), InputError> {
        if !topic.accepts_values() || topic.steps[step_index].is_acknowledge() {
            return Err(self.reject_value(text, "That isn't one of the options."));
        }
        let value = match text.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => return Err(self.reject_value(text, "That isn't a number.")),
        };
        if value < 0.0 {
            return Err(self.reject_value(text, "Values can't be negative."));
        }
        let Some(tier) = topic.bucket(value) else {
            return Err(self.reject_value(text, "No cluster covers that value."));
        };

        self.user(text);
        self.evidence.record(&topic.key, std::slice::from_ref(&tier.tag));
        self.bot(prompts::tier_selected(tier));
        self.advance_step(topic_index, step_index, topic);
        Ok(())
    }

    fn advance_step(&mut self, topic_index: usize, step_index: usize, topic: &Topic) {
        let next = step_index + 1;
        if let Some(step) = topic.steps.get(next) {
            self.set_phase(DialoguePhase::AwaitingStepAnswer {
                topic: topic_index,
                step: next,
            });
            self.bot(step.prompt.clone());
        } else {
            self.finish_topic(topic_index, false);
        }
    }

    fn finish_topic(&mut self, topic_index: usize, skipped: bool) {
        let key = self.catalog.topic(topic_index).key.clone();
        self.state.complete(&key);
        tracing::debug!(topic = %key, skipped, completed = self.state.completed_count(), "Topic completed");

        if self.state.editing {
            self.state.editing = false;
            self.enter_final_confirm();
            return;
        }

        let remaining = self.candidate_topics(TopicScope::Remaining);
        match remaining.first() {
            None => self.enter_final_confirm(),
            Some(&next) if !skipped => self.start_topic(next),
            Some(_) => {
                self.bot(prompts::NEXT_TOPIC_PROMPT);
                self.set_phase(DialoguePhase::AwaitingTopicChoice {
                    scope: TopicScope::Remaining,
                });
            }
        }
    }

    fn start_topic(&mut self, index: usize) {
        let catalog = Arc::clone(&self.catalog);
        let topic = catalog.topic(index);
        self.evidence.start(&topic.key);
        self.set_phase(DialoguePhase::AwaitingStepAnswer {
            topic: index,
            step: 0,
        });
        self.bot(topic.steps[0].prompt.clone());
    }

    fn enter_final_confirm(&mut self) {
        debug_assert_eq!(self.state.completed_count(), self.catalog.len());
        let resolved = ResolvedEvidence::from_evidence(&self.catalog, &self.evidence);
        self.bot(prompts::summary(&self.catalog, &resolved));
        self.bot(prompts::PROCEED_PROMPT);
        self.resolved = Some(resolved);
        self.set_phase(DialoguePhase::AwaitingFinalConfirm);
    }

    fn on_final_confirm(&mut self, input: Input) -> Result<Effect, InputError> {
        let decision = match &input {
            Input::Choice(0) => FinalDecision::Proceed,
            Input::Choice(1) => FinalDecision::Decline,
            Input::Choice(2) => FinalDecision::Edit,
            Input::Choice(index) => {
                return Err(InputError::InvalidChoice {
                    index: *index,
                    available: 3,
                });
            }
            Input::Text(text) if is_edit_request(text) => FinalDecision::Edit,
            Input::Text(_) => {
                if self.yes_no(&input)? {
                    FinalDecision::Proceed
                } else {
                    FinalDecision::Decline
                }
            }
        };

        match decision {
            FinalDecision::Proceed => {
                self.user(prompts::YES);
                let resolved = self.resolved.clone().unwrap_or_else(|| {
                    ResolvedEvidence::from_evidence(&self.catalog, &self.evidence)
                });
                self.set_phase(DialoguePhase::AwaitingClassification);
                Ok(Effect::Classify(ClassificationTicket {
                    generation: self.generation,
                    request: ClassificationRequest::from_resolved(&resolved),
                }))
            }
            FinalDecision::Decline => {
                self.user(prompts::NO);
                self.close();
                Ok(Effect::None)
            }
            FinalDecision::Edit => {
                self.user(prompts::EDIT);
                self.bot(prompts::EDIT_PROMPT);
                self.set_phase(DialoguePhase::AwaitingEditTopic);
                Ok(Effect::None)
            }
        }
    }

    fn on_edit_topic(&mut self, input: Input) -> Result<Effect, InputError> {
        let candidates = self.candidate_topics(TopicScope::Full);
        let index = self.pick_topic(&candidates, input)?;
        let key = self.catalog.topic(index).key.clone();

        self.user(self.catalog.topic(index).label.clone());
        self.evidence.clear(&key);
        self.resolved = None;
        self.state.editing = true;
        tracing::debug!(topic = %key, "Replaying topic for edit");
        self.start_topic(index);
        Ok(Effect::None)
    }

    fn on_restart_confirm(&mut self, input: Input) -> Result<Effect, InputError> {
        if self.yes_no(&input)? {
            self.user(prompts::YES);
            self.restart();
        } else {
            self.user(prompts::NO);
            self.close();
        }
        Ok(Effect::None)
    }

    fn close(&mut self) {
        self.bot(prompts::CLOSING);
        self.set_phase(DialoguePhase::Done);
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn candidate_topics(&self, scope: TopicScope) -> Vec<usize> {
        self.catalog
            .list_all()
            .iter()
            .enumerate()
            .filter(|(_, topic)| match scope {
                TopicScope::Full => true,
                TopicScope::Remaining => !self.state.is_completed(&topic.key),
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn topic_labels(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| self.catalog.topic(i).label.clone())
            .collect()
    }

    /// Resolve a topic pick, by index into `candidates` or by name.
    fn pick_topic(&mut self, candidates: &[usize], input: Input) -> Result<usize, InputError> {
        match input {
            Input::Choice(index) => {
                candidates
                    .get(index)
                    .copied()
                    .ok_or(InputError::InvalidChoice {
                        index,
                        available: candidates.len(),
                    })
            }
            Input::Text(text) => {
                let found = candidates
                    .iter()
                    .copied()
                    .find(|&i| self.catalog.topic(i).matches_name(&text));
                match found {
                    Some(index) => Ok(index),
                    None => {
                        let input = text.trim().to_string();
                        self.bot(prompts::unrecognized_parameter(&input));
                        Err(InputError::UnrecognizedParameterName { input })
                    }
                }
            }
        }
    }

    fn yes_no(&mut self, input: &Input) -> Result<bool, InputError> {
        match input {
            Input::Choice(0) => Ok(true),
            Input::Choice(1) => Ok(false),
            Input::Choice(index) => Err(InputError::InvalidChoice {
                index: *index,
                available: 2,
            }),
            Input::Text(text) => parse_yes_no(text).ok_or_else(|| {
                self.bot(prompts::YES_NO_HINT);
                InputError::InvalidValue {
                    input: text.clone(),
                    reason: "expected yes or no".to_string(),
                }
            }),
        }
    }

    fn reject_value(&mut self, text: &str, reason: &str) -> InputError {
        self.bot(prompts::invalid_value(reason));
        InputError::InvalidValue {
            input: text.to_string(),
            reason: reason.to_string(),
        }
    }

    fn set_phase(&mut self, phase: DialoguePhase) {
        tracing::debug!(from = %self.state.phase, to = %phase, "Dialogue transition");
        self.state.phase = phase;
    }

    fn bot(&mut self, text: impl Into<String>) {
        self.timeline.append(Author::Bot, text);
    }

    fn user(&mut self, text: impl Into<String>) {
        self.timeline.append(Author::User, text);
    }
}

fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "y" | "yes" | "yeah" | "yep" | "sure" | "ok" | "okay" => Some(true),
        "n" | "no" | "nope" => Some(false),
        _ => None,
    }
}

fn is_edit_request(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    text == "edit" || text.starts_with("edit ") || text == "change"
}
