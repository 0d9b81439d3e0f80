//! Geotextile Assist — guided classification dialogue.

pub mod catalog;
pub mod channels;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod gateway;
pub mod session;
