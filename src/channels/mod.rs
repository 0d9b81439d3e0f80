//! Presentation channels over a dialogue session.

pub mod cli;
pub mod http;

pub use cli::CliChannel;
pub use http::dialogue_routes;
