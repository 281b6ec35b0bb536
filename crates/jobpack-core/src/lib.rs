//! # jobpack
//!
//! Typed job descriptions and their binary wire format, for handing batches of
//! work from a controller to remote worker processes.
//!
//! ## Layers
//!
//! - **[`core`]: Data and wire format.** Self-describing arguments
//!   ([`Argument`](core::models::argument::Argument)), jobs, results, run
//!   profiles and job packages, plus the little-endian codec and the frame
//!   layer that makes packages self-delimiting on a stream.
//!
//! - **[`engine`]: Coordination.** The error type, progress events and the
//!   completion tracker that collects worker results over a channel.
//!
//! - **[`workflows`]: Entry points.** Running a whole package through a local
//!   worker pool.
//!
//! ```
//! use jobpack::arguments;
//! use jobpack::core::io::traits::{WireDecode, WireEncode};
//! use jobpack::core::models::package::JobPackage;
//! use jobpack::core::models::profile::RunProfile;
//!
//! let mut package = JobPackage::new(RunProfile::default(), "ctffind", 2).unwrap();
//! package.add_job("tif", arguments!["image.mrc", 512i32, 1.2f32]).unwrap();
//!
//! let bytes = package.to_bytes().unwrap();
//! assert_eq!(bytes.len(), package.encoded_size());
//! assert_eq!(package.remaining_count(), 2);
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
