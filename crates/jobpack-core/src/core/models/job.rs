use super::argument::Argument;
use super::format::{self, ArgumentList};
use crate::core::io::codec::{self, LEN_PREFIX};
use crate::core::io::traits::{WireDecode, WireEncode};
use crate::engine::error::{JobError, Result};
use std::fmt;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, trace};

/// Where a job is in its lifecycle, as far as the job itself can tell.
///
/// Dispatch to a worker is tracked by the transport, so a dispatched job that
/// has not reported back is still `Populated` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    /// No argument has been set since the last reset.
    Created,
    /// Arguments are bound and the job is ready for dispatch.
    Populated,
    /// A worker has reported the job as done.
    Completed,
}

/// One unit of work: an identifier and an ordered, fixed-length list of typed
/// arguments.
///
/// The completion flag is atomic so that a worker callback or polling thread
/// can flip it through a shared reference while the coordinator counts
/// outstanding jobs. Once set it stays set until [`reset`](Job::reset).
#[derive(Debug, Default)]
pub struct Job {
    /// Identifier reported back with the job's result.
    pub job_number: i32,
    arguments: Vec<Argument>,
    completed: AtomicBool,
}

impl Job {
    /// Creates an empty job with no argument slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a job with `n` unset argument slots.
    pub fn with_capacity(n: usize) -> Self {
        let mut job = Self::new();
        job.reset(n);
        job
    }

    /// Discards all arguments and allocates exactly `n` unset slots.
    ///
    /// This is the only way back to [`JobState::Created`]; it also clears the
    /// completion flag.
    pub fn reset(&mut self, n: usize) {
        self.arguments.clear();
        self.arguments.resize_with(n, Argument::default);
        *self.completed.get_mut() = false;
    }

    /// Binds every argument slot from a type-code string and positional values.
    ///
    /// A job with no slots adopts the length of `type_codes`; otherwise the
    /// code count must equal the slot count fixed by the last
    /// [`reset`](Job::reset). On error the job is left untouched.
    ///
    /// # Errors
    ///
    /// - [`JobError::FormatArity`] if the code count disagrees with the slot
    ///   count or with the number of values.
    /// - [`JobError::TypeMismatch`] if a value does not match its code.
    /// - [`JobError::UnknownTypeCode`] for a character outside the code table.
    pub fn set_arguments(
        &mut self,
        type_codes: &str,
        values: impl Into<ArgumentList>,
    ) -> Result<()> {
        let code_count = type_codes.chars().count();
        if !self.arguments.is_empty() && code_count != self.arguments.len() {
            error!(
                "Job {} holds {} arguments but type codes '{}' describe {}",
                self.job_number,
                self.arguments.len(),
                type_codes,
                code_count
            );
            return Err(JobError::FormatArity {
                expected: self.arguments.len(),
                found: code_count,
            });
        }

        self.arguments = format::bind(type_codes, values.into())?;
        trace!("Job {} bound to signature '{}'", self.job_number, type_codes);
        Ok(())
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&Argument> {
        self.arguments.get(index)
    }

    pub fn argument_mut(&mut self, index: usize) -> Option<&mut Argument> {
        self.arguments.get_mut(index)
    }

    /// Returns the type-code string of the current arguments.
    pub fn signature(&self) -> String {
        format::signature_of(&self.arguments)
    }

    pub fn is_populated(&self) -> bool {
        !self.arguments.is_empty() && self.arguments.iter().all(Argument::is_set)
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Flips the completion flag from `false` to `true`.
    ///
    /// Returns `true` only for the caller that performed the flip, so a
    /// completion reported twice is counted once.
    pub fn mark_completed(&self) -> bool {
        !self.completed.swap(true, Ordering::AcqRel)
    }

    pub fn state(&self) -> JobState {
        if self.is_completed() {
            JobState::Completed
        } else if self.is_populated() {
            JobState::Populated
        } else {
            JobState::Created
        }
    }
}

impl Clone for Job {
    fn clone(&self) -> Self {
        Self {
            job_number: self.job_number,
            arguments: self.arguments.clone(),
            completed: AtomicBool::new(self.is_completed()),
        }
    }
}

impl WireEncode for Job {
    /// Identifier, argument count, then every argument.
    fn encoded_size(&self) -> usize {
        4 + LEN_PREFIX
            + self
                .arguments
                .iter()
                .map(WireEncode::encoded_size)
                .sum::<usize>()
    }

    fn write_body(&self, writer: &mut impl Write) -> Result<()> {
        codec::write_i32(writer, self.job_number)?;
        codec::write_len(writer, self.arguments.len())?;
        for argument in &self.arguments {
            argument.write_body(writer)?;
        }
        Ok(())
    }
}

impl WireDecode for Job {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        let job_number = codec::read_i32(reader)?;
        let count = codec::read_len(reader)?;
        let mut arguments = Vec::new();
        for _ in 0..count {
            arguments.push(Argument::decode(reader)?);
        }
        Ok(Self {
            job_number,
            arguments,
            completed: AtomicBool::new(false),
        })
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}] (", self.job_number, self.signature())?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", argument)?;
        }
        f.write_str(")")
    }
}
