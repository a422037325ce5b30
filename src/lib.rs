//! Impact Quiz · Trivia Game Backend
//!
//! Library crate so integration tests can drive the router directly.
//! See `main.rs` for the binary entry point and the env variables it reads.

pub mod telemetry;
pub mod util;
pub mod domain;
pub mod config;
pub mod error;
pub mod prompt;
pub mod parser;
pub mod gemini;
pub mod cache;
pub mod scoreboard;
pub mod state;
pub mod protocol;
pub mod routes;
