//! Job data models.
//!
//! A [`package::JobPackage`] owns a [`profile::RunProfile`] and a fixed number
//! of [`job::Job`] slots. Each job holds an ordered list of
//! [`argument::Argument`] values whose types are declared by a type-code string
//! (see [`format`]). Workers answer with a [`result::JobResult`].

pub mod argument;
pub mod format;
pub mod fundamental_type;
pub mod job;
pub mod package;
pub mod profile;
pub mod result;
