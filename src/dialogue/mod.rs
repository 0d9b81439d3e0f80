//! Dialogue engine — state machine, evidence, and the message timeline.

pub mod controller;
pub mod evidence;
pub mod prompts;
pub mod state;
pub mod timeline;

pub use controller::{ClassificationTicket, DialogueController, Effect, Input};
pub use evidence::{EvidenceMap, ResolvedEvidence, ResolvedTopic};
pub use state::{ChoiceKind, DialoguePhase, DialogueState, TopicScope};
pub use timeline::{Author, Message, MessageTimeline, RevealPacer};
