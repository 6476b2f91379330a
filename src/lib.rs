//! Memoflow: voice-note conversations to refined note documents.
//!
//! An agent workflow that reads a conversation transcript and the current note
//! collection, plans which notes to create, modify, or delete, and produces each
//! document through a bounded generate/evaluate/revise loop against LLM providers.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod provider;
pub mod workflow;
