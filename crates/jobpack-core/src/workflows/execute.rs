use crate::core::models::job::Job;
use crate::core::models::package::JobPackage;
use crate::core::models::result::JobResult;
use crate::engine::error::JobError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tracker::CompletionTracker;
use rayon::prelude::*;
use std::fmt::Display;
use std::thread;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Worker failed on job {job_number}: {message}")]
    Worker { job_number: i32, message: String },

    #[error(transparent)]
    Protocol(#[from] JobError),
}

/// Runs every populated, not yet completed job of `package` through `worker`
/// on the rayon pool and collects the results ordered by job number.
///
/// Workers only read their job; completion flags are flipped by a tracker on
/// the calling thread as results arrive. On a worker error the remaining jobs
/// are abandoned, and jobs that already reported keep their completion flag,
/// so calling `execute` again resumes with what is left.
///
/// # Errors
///
/// Returns [`WorkflowError::Worker`] for the first worker failure observed,
/// or [`WorkflowError::Protocol`] if result collection itself fails.
#[instrument(skip_all, name = "execute_workflow", fields(executable = %package.executable_name()))]
pub fn execute<F, E>(
    package: &JobPackage,
    worker: F,
    reporter: &ProgressReporter,
) -> Result<Vec<JobResult>, WorkflowError>
where
    F: Fn(&Job) -> Result<Vec<f32>, E> + Sync,
    E: Display,
{
    let pending: Vec<&Job> = package
        .added_jobs()
        .iter()
        .filter(|job| !job.is_completed())
        .collect();
    info!(
        "Executing {} of {} populated jobs",
        pending.len(),
        package.added()
    );
    reporter.report(Progress::PackageStart {
        total: pending.len() as u64,
    });

    let (mut tracker, sender) = CompletionTracker::new(package);
    let worker = &worker;

    let (produced, tracked) = thread::scope(|s| {
        let producer = s.spawn(move || {
            pending.par_iter().try_for_each_with(sender, |tx, &job| {
                let data = worker(job).map_err(|e| WorkflowError::Worker {
                    job_number: job.job_number,
                    message: e.to_string(),
                })?;
                tx.report(JobResult::from((job.job_number, data)))?;
                Ok::<(), WorkflowError>(())
            })
        });
        let tracked = tracker.wait_for_all(reporter);
        let produced = match producer.join() {
            Ok(outcome) => outcome,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        (produced, tracked)
    });

    // A worker failure closes the channel, so the tracker error it causes is
    // secondary.
    if let Err(e) = produced {
        warn!("Execution aborted: {}", e);
        return Err(e);
    }
    tracked?;

    reporter.report(Progress::PackageFinish);
    Ok(tracker.into_results())
}
