//! services/api/src/lib.rs
//!
//! The web shell around `quiz_core`: configuration, the concrete adapters for the
//! core's ports, and the REST and WebSocket surface.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
