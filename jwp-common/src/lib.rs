//! jwp-common - shared library for the Journal Workflow Portal
//!
//! Holds what every JWP service needs: the workflow status state machine,
//! the shared error type, configuration resolution, the SQLite schema and
//! models, and the workflow event bus.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod status;

pub use error::{Error, Result};
