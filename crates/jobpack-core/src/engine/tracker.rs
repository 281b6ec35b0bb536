use super::error::{JobError, Result};
use super::progress::{Progress, ProgressReporter};
use crate::core::models::package::JobPackage;
use crate::core::models::result::JobResult;
use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, RecvError, Sender, TryRecvError};
use tracing::{debug, error, trace, warn};

/// Handle workers use to report finished jobs back to a [`CompletionTracker`].
#[derive(Debug, Clone)]
pub struct CompletionSender {
    inner: Sender<JobResult>,
}

impl CompletionSender {
    /// # Errors
    ///
    /// Returns [`JobError::ChannelClosed`] if the tracker has been dropped.
    pub fn report(&self, result: JobResult) -> Result<()> {
        self.inner
            .send(result)
            .map_err(|_| JobError::ChannelClosed { pending: 0 })
    }
}

/// Collects results for a package and flips the completion flag of each
/// reported job.
///
/// The tracker borrows the package, so any number of workers can still read
/// job arguments while results flow in.
pub struct CompletionTracker<'p> {
    package: &'p JobPackage,
    receiver: Receiver<JobResult>,
    results: BTreeMap<i32, JobResult>,
}

impl<'p> CompletionTracker<'p> {
    pub fn new(package: &'p JobPackage) -> (Self, CompletionSender) {
        let (tx, rx) = mpsc::channel();
        let tracker = Self {
            package,
            receiver: rx,
            results: BTreeMap::new(),
        };
        (tracker, CompletionSender { inner: tx })
    }

    pub fn package(&self) -> &'p JobPackage {
        self.package
    }

    /// Records one result. Returns `true` if it completed its job.
    ///
    /// A second result for an already completed job is logged, reported as a
    /// [`Progress::Message`] and dropped; the first result stays.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::UnknownJob`] if the result names no filled slot.
    /// Unfilled slots were never dispatched, so a result for one is rejected
    /// and its flag stays clear.
    pub fn handle(&mut self, result: JobResult, reporter: &ProgressReporter) -> Result<bool> {
        let job_number = result.job_number;
        let Some(job) = self
            .package
            .added_jobs()
            .iter()
            .find(|job| job.job_number == job_number)
        else {
            error!(
                "Result for job {} matches no filled slot of '{}'",
                job_number,
                self.package.executable_name()
            );
            return Err(JobError::UnknownJob(job_number));
        };
        if !job.mark_completed() {
            warn!("Duplicate result for job {} ignored", job_number);
            reporter.report(Progress::Message(format!(
                "Ignored duplicate result for job {}",
                job_number
            )));
            return Ok(false);
        }
        trace!("Job {} completed with {} values", job_number, result.len());
        self.results.insert(job_number, result);
        reporter.report(Progress::JobCompleted { job_number });
        Ok(true)
    }

    /// Handles every result already queued without blocking.
    /// Returns how many jobs were newly completed.
    pub fn drain(&mut self, reporter: &ProgressReporter) -> Result<usize> {
        let mut completed = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(result) => {
                    if self.handle(result, reporter)? {
                        completed += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        Ok(completed)
    }

    /// Blocks until every filled slot has completed.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::ChannelClosed`] if every sender is dropped while
    /// jobs are still pending, and [`JobError::UnknownJob`] for a result that
    /// names no filled slot.
    pub fn wait_for_all(&mut self, reporter: &ProgressReporter) -> Result<()> {
        while !self.is_finished() {
            match self.receiver.recv() {
                Ok(result) => {
                    self.handle(result, reporter)?;
                }
                Err(RecvError) => {
                    let pending = self.package.pending_count();
                    warn!("All senders dropped with {} jobs pending", pending);
                    return Err(JobError::ChannelClosed { pending });
                }
            }
        }
        debug!("All {} jobs completed", self.package.added());
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.package.pending_count() == 0
    }

    pub fn results(&self) -> &BTreeMap<i32, JobResult> {
        &self.results
    }

    /// Consumes the tracker, returning results ordered by job number.
    pub fn into_results(self) -> Vec<JobResult> {
        self.results.into_values().collect()
    }
}
