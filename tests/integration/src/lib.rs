//! Integration test utilities for the chat gateway
//!
//! This crate provides helpers for running end-to-end tests against the real
//! router and WebSocket endpoint, backed by in-memory collaborators.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
