use super::format::ArgumentList;
use super::job::Job;
use super::profile::RunProfile;
use crate::core::io::codec::MAX_FIELD_LEN;
use crate::core::io::traits::{WireDecode, WireEncode};
use crate::engine::error::{JobError, Result};
use std::io::{Read, Write};
use tracing::{debug, error};

/// A fixed-capacity batch of jobs bound to one run profile.
///
/// Slots are allocated up front and filled in order by [`add_job`]. The whole
/// capacity travels on the wire, filled or not, so a package is always sent
/// as a fixed-size batch.
///
/// [`add_job`]: JobPackage::add_job
#[derive(Debug, Clone, Default)]
pub struct JobPackage {
    profile: RunProfile,
    jobs: Vec<Job>,
    added: usize,
}

impl JobPackage {
    /// Creates a package with `capacity` empty job slots.
    ///
    /// `executable_name` replaces the profile's own executable name. Slot `i`
    /// gets job number `i`.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::AllocationFailure`] if `capacity` exceeds
    /// [`MAX_FIELD_LEN`], the largest slot count a frame header can carry.
    pub fn new(profile: RunProfile, executable_name: &str, capacity: usize) -> Result<Self> {
        let mut package = Self::default();
        package.reset(profile, executable_name, capacity)?;
        Ok(package)
    }

    /// Discards every job and re-creates the package in its initial state.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::AllocationFailure`] if `capacity` exceeds
    /// [`MAX_FIELD_LEN`]; the package is left untouched.
    pub fn reset(
        &mut self,
        mut profile: RunProfile,
        executable_name: &str,
        capacity: usize,
    ) -> Result<()> {
        if capacity > MAX_FIELD_LEN {
            error!(
                "Capacity {} for '{}' exceeds the limit of {} slots",
                capacity, executable_name, MAX_FIELD_LEN
            );
            return Err(JobError::AllocationFailure(format!(
                "capacity {} exceeds the {} slot limit",
                capacity, MAX_FIELD_LEN
            )));
        }
        profile.executable_name = executable_name.to_string();
        self.profile = profile;
        self.jobs = (0..capacity)
            .map(|i| {
                let mut job = Job::new();
                // Lossless: capacity is bounded by MAX_FIELD_LEN.
                job.job_number = i as i32;
                job
            })
            .collect();
        self.added = 0;
        debug!(
            "Job package for '{}' reset with capacity {}",
            executable_name, capacity
        );
        Ok(())
    }

    /// Fills the next unfilled slot and returns its index.
    ///
    /// # Errors
    ///
    /// - [`JobError::CapacityExceeded`] if every slot is already filled; no
    ///   slot is touched.
    /// - Any error of [`Job::set_arguments`]; the slot stays unfilled and
    ///   `added` is unchanged.
    pub fn add_job(&mut self, type_codes: &str, values: impl Into<ArgumentList>) -> Result<usize> {
        let index = self.added;
        let Some(job) = self.jobs.get_mut(index) else {
            error!(
                "Cannot add job to '{}': all {} slots are filled",
                self.profile.executable_name,
                self.jobs.len()
            );
            return Err(JobError::CapacityExceeded {
                capacity: self.jobs.len(),
            });
        };
        job.set_arguments(type_codes, values)?;
        self.added += 1;
        Ok(index)
    }

    pub fn capacity(&self) -> usize {
        self.jobs.len()
    }

    /// Number of slots filled through [`add_job`](JobPackage::add_job).
    pub fn added(&self) -> usize {
        self.added
    }

    pub fn is_full(&self) -> bool {
        self.added == self.jobs.len()
    }

    pub fn profile(&self) -> &RunProfile {
        &self.profile
    }

    pub fn executable_name(&self) -> &str {
        &self.profile.executable_name
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// The filled slots, in the order they were added.
    pub fn added_jobs(&self) -> &[Job] {
        &self.jobs[..self.added]
    }

    pub fn job(&self, index: usize) -> Option<&Job> {
        self.jobs.get(index)
    }

    pub fn job_by_number(&self, job_number: i32) -> Option<&Job> {
        self.jobs.iter().find(|j| j.job_number == job_number)
    }

    /// Counts jobs whose completion flag is still clear.
    ///
    /// Rescans every slot on each call rather than keeping a counter, so the
    /// count stays right when flags are flipped from several places through
    /// shared references.
    pub fn remaining_count(&self) -> usize {
        self.jobs.iter().filter(|j| !j.is_completed()).count()
    }

    /// Counts filled slots that have not completed yet.
    ///
    /// Unlike [`remaining_count`](JobPackage::remaining_count) this ignores
    /// unfilled slots, which no worker will ever report.
    pub fn pending_count(&self) -> usize {
        self.added_jobs()
            .iter()
            .filter(|j| !j.is_completed())
            .count()
    }

    /// Marks the job with `job_number` as completed.
    ///
    /// Returns `true` if this call performed the flip, `false` if the job was
    /// already completed.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::UnknownJob`] if no slot carries `job_number`.
    pub fn mark_completed(&self, job_number: i32) -> Result<bool> {
        self.job_by_number(job_number)
            .map(Job::mark_completed)
            .ok_or(JobError::UnknownJob(job_number))
    }

    /// Decodes a package body whose slot counts come from the enclosing frame.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::AllocationFailure`] if `added` exceeds `capacity`,
    /// plus any decoding error of the profile or a job.
    pub fn decode_with(reader: &mut impl Read, capacity: usize, added: usize) -> Result<Self> {
        if added > capacity {
            error!(
                "Package header claims {} added jobs for capacity {}",
                added, capacity
            );
            return Err(JobError::AllocationFailure(format!(
                "{} added jobs exceed capacity {}",
                added, capacity
            )));
        }
        let profile = RunProfile::decode(reader)?;
        let mut jobs = Vec::new();
        for _ in 0..capacity {
            jobs.push(Job::decode(reader)?);
        }
        debug!(
            "Decoded job package for '{}': {} of {} slots filled",
            profile.executable_name, added, capacity
        );
        Ok(Self {
            profile,
            jobs,
            added,
        })
    }
}

impl WireEncode for JobPackage {
    /// The profile plus every slot up to the declared capacity.
    fn encoded_size(&self) -> usize {
        self.profile.encoded_size()
            + self
                .jobs
                .iter()
                .map(WireEncode::encoded_size)
                .sum::<usize>()
    }

    fn write_body(&self, writer: &mut impl Write) -> Result<()> {
        self.profile.write_body(writer)?;
        for job in &self.jobs {
            job.write_body(writer)?;
        }
        Ok(())
    }
}
