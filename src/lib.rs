//! Shiftswap - Shift scheduling and substitution workflow for store operations
//!
//! This library provides the core functionality for the shiftswap service, including:
//! - Time and calendar math (overnight durations, shift status, week ranges)
//! - A transactional record store persisted as a JSON snapshot
//! - The schedule store for shift records
//! - The substitution state machine and its request engine
//! - The workflow coordinator that atomically finalizes a handoff
//! - An axum HTTP API and a clap CLI

pub mod api;
pub mod app;
pub mod auth;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod directory;
pub mod domain;
pub mod errors;
pub mod fs;
pub mod schedule;
pub mod schemas;
pub mod store;
pub mod substitution;
pub mod workflow;

// Re-export commonly used types
pub use errors::{Result, SchedulerError};
pub use schemas::{Config, Role, Shift, SubstitutionRequest, SubstitutionStatus, User};
