//! Dialogue state machine — which phase the conversation is in.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which topics a topic-choice screen offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicScope {
    /// Every topic; only shown once, before anything is completed.
    Full,
    /// Only topics not yet completed.
    Remaining,
}

/// The phases of the dialogue.
///
/// Booting → AwaitingConsent → AwaitingTopicChoice → AwaitingStepAnswer … →
/// AwaitingFinalConfirm → AwaitingClassification → AwaitingRestartConfirm.
/// `Done` is terminal until the session is restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DialoguePhase {
    Booting,
    AwaitingConsent,
    AwaitingTopicChoice { scope: TopicScope },
    AwaitingStepAnswer { topic: usize, step: usize },
    AwaitingFinalConfirm,
    AwaitingEditTopic,
    /// Classification request outstanding; user input is refused.
    AwaitingClassification,
    AwaitingRestartConfirm,
    Done,
}

impl DialoguePhase {
    /// Whether user choices are accepted in this phase.
    pub fn accepts_input(&self) -> bool {
        !matches!(
            self,
            Self::Booting | Self::AwaitingClassification | Self::Done
        )
    }

    /// What kind of answer the user is being asked for.
    pub fn pending_choice(&self) -> ChoiceKind {
        match self {
            Self::Booting | Self::AwaitingClassification | Self::Done => ChoiceKind::Nothing,
            Self::AwaitingConsent | Self::AwaitingRestartConfirm => ChoiceKind::YesNo,
            Self::AwaitingTopicChoice { .. } => ChoiceKind::TopicList,
            Self::AwaitingStepAnswer { .. } => ChoiceKind::StepOptions,
            Self::AwaitingFinalConfirm => ChoiceKind::ProceedOrEdit,
            Self::AwaitingEditTopic => ChoiceKind::ParameterName,
        }
    }
}

impl std::fmt::Display for DialoguePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Booting => write!(f, "booting"),
            Self::AwaitingConsent => write!(f, "awaiting_consent"),
            Self::AwaitingTopicChoice { scope: TopicScope::Full } => {
                write!(f, "awaiting_topic_choice(full)")
            }
            Self::AwaitingTopicChoice { scope: TopicScope::Remaining } => {
                write!(f, "awaiting_topic_choice(remaining)")
            }
            Self::AwaitingStepAnswer { topic, step } => {
                write!(f, "awaiting_step_answer({topic}, {step})")
            }
            Self::AwaitingFinalConfirm => write!(f, "awaiting_final_confirm"),
            Self::AwaitingEditTopic => write!(f, "awaiting_edit_topic"),
            Self::AwaitingClassification => write!(f, "awaiting_classification"),
            Self::AwaitingRestartConfirm => write!(f, "awaiting_restart_confirm"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// The kind of choice currently on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    Nothing,
    YesNo,
    TopicList,
    StepOptions,
    ProceedOrEdit,
    ParameterName,
}

/// Mutable per-session dialogue state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueState {
    pub phase: DialoguePhase,
    /// Keys of completed (answered or skipped) topics. Only grows.
    completed: BTreeSet<String>,
    /// Set while a completed topic is being replayed via edit.
    pub editing: bool,
}

impl Default for DialogueState {
    fn default() -> Self {
        Self {
            phase: DialoguePhase::Booting,
            completed: BTreeSet::new(),
            editing: false,
        }
    }
}

impl DialogueState {
    pub fn active_topic(&self) -> Option<usize> {
        match self.phase {
            DialoguePhase::AwaitingStepAnswer { topic, .. } => Some(topic),
            _ => None,
        }
    }

    pub fn active_step(&self) -> Option<usize> {
        match self.phase {
            DialoguePhase::AwaitingStepAnswer { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Mark a topic completed. Returns false if it already was.
    pub fn complete(&mut self, key: &str) -> bool {
        self.completed.insert(key.to_string())
    }

    pub fn is_completed(&self, key: &str) -> bool {
        self.completed.contains(key)
    }

    pub fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_booting() {
        let state = DialogueState::default();
        assert_eq!(state.phase, DialoguePhase::Booting);
        assert_eq!(state.completed_count(), 0);
        assert!(!state.editing);
        assert_eq!(state.active_topic(), None);
    }

    #[test]
    fn active_topic_and_step() {
        let state = DialogueState {
            phase: DialoguePhase::AwaitingStepAnswer { topic: 2, step: 1 },
            ..Default::default()
        };
        assert_eq!(state.active_topic(), Some(2));
        assert_eq!(state.active_step(), Some(1));
    }

    #[test]
    fn complete_is_idempotent() {
        let mut state = DialogueState::default();
        assert!(state.complete("permittivity"));
        assert!(!state.complete("permittivity"));
        assert!(state.is_completed("permittivity"));
        assert_eq!(state.completed_count(), 1);
    }

    #[test]
    fn input_gating() {
        assert!(!DialoguePhase::Booting.accepts_input());
        assert!(!DialoguePhase::AwaitingClassification.accepts_input());
        assert!(!DialoguePhase::Done.accepts_input());
        assert!(DialoguePhase::AwaitingConsent.accepts_input());
        assert!(DialoguePhase::AwaitingFinalConfirm.accepts_input());
    }

    #[test]
    fn every_phase_maps_to_one_choice_kind() {
        use DialoguePhase::*;
        let cases = [
            (Booting, ChoiceKind::Nothing),
            (AwaitingConsent, ChoiceKind::YesNo),
            (AwaitingTopicChoice { scope: TopicScope::Full }, ChoiceKind::TopicList),
            (AwaitingTopicChoice { scope: TopicScope::Remaining }, ChoiceKind::TopicList),
            (AwaitingStepAnswer { topic: 0, step: 0 }, ChoiceKind::StepOptions),
            (AwaitingFinalConfirm, ChoiceKind::ProceedOrEdit),
            (AwaitingEditTopic, ChoiceKind::ParameterName),
            (AwaitingClassification, ChoiceKind::Nothing),
            (AwaitingRestartConfirm, ChoiceKind::YesNo),
            (Done, ChoiceKind::Nothing),
        ];
        for (phase, kind) in cases {
            assert_eq!(phase.pending_choice(), kind, "{phase}");
        }
    }

    #[test]
    fn phase_serializes_as_tagged_object() {
        let json = serde_json::to_value(DialoguePhase::AwaitingStepAnswer { topic: 3, step: 0 })
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"phase": "awaiting_step_answer", "topic": 3, "step": 0})
        );

        let json = serde_json::to_value(DialoguePhase::Done).unwrap();
        assert_eq!(json, serde_json::json!({"phase": "done"}));
    }
}
