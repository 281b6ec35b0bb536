//! # Engine Module
//!
//! Coordination around a job package while it is being worked on.
//!
//! - **Error Handling** ([`error`]) - The crate-wide [`error::JobError`]
//! - **Progress Monitoring** ([`progress`]) - Events emitted while a package runs
//! - **Completion Tracking** ([`tracker`]) - Channel-based collection of worker
//!   results and completion flags

pub mod error;
pub mod progress;
pub mod tracker;
