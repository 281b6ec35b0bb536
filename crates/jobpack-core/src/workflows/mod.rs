//! # Workflows Module
//!
//! High-level entry points that drive a package from start to finish.
//!
//! - **Population** ([`populate`]) - Fills a package from rows of values that
//!   share one type-code string.
//! - **Execution** ([`execute`]) - Runs every pending job of a package on the
//!   rayon pool and collects the results.

pub mod execute;
pub mod populate;
