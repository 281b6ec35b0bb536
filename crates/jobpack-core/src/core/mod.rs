//! # Core Module
//!
//! Stateless data models and their binary encoding.
//!
//! - [`models`] - Arguments, jobs, results, run profiles and job packages
//! - [`io`] - Primitive codec, the encode/decode traits and stream frames

pub mod io;
pub mod models;
