use crate::core::models::format::ArgumentList;
use crate::core::models::package::JobPackage;
use crate::engine::error::{JobError, Result};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{error, info, instrument};

/// Adds one job per row, every row described by the same `type_codes`.
///
/// Capacity is checked for the whole batch first, so a batch that cannot fit
/// adds nothing. A row that fails to bind stops the batch; rows before it stay
/// in the package.
///
/// Returns the number of jobs added.
///
/// # Errors
///
/// Returns [`JobError::CapacityExceeded`] if the rows do not fit in the
/// remaining slots, or the binding error of the first bad row.
#[instrument(skip_all, name = "populate_workflow", fields(type_codes = %type_codes))]
pub fn populate(
    package: &mut JobPackage,
    type_codes: &str,
    rows: Vec<ArgumentList>,
    reporter: &ProgressReporter,
) -> Result<usize> {
    let free = package.capacity() - package.added();
    if rows.len() > free {
        error!(
            "{} rows do not fit in the {} free slots of '{}'",
            rows.len(),
            free,
            package.executable_name()
        );
        return Err(JobError::CapacityExceeded {
            capacity: package.capacity(),
        });
    }

    reporter.report(Progress::PackageStart {
        total: rows.len() as u64,
    });
    let mut added = 0;
    for (row, values) in rows.into_iter().enumerate() {
        let index = package.add_job(type_codes, values).inspect_err(|e| {
            error!("Row {} rejected: {}", row, e);
        })?;
        let job_number = package.job(index).map_or(index as i32, |j| j.job_number);
        reporter.report(Progress::JobAdded { job_number });
        added += 1;
    }
    reporter.report(Progress::PackageFinish);
    info!("Added {} jobs to '{}'", added, package.executable_name());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments;
    use crate::core::models::profile::RunProfile;
    use std::sync::Mutex;

    fn rows(n: usize) -> Vec<ArgumentList> {
        (0..n)
            .map(|i| arguments![format!("movie_{i:04}.tif"), i as i32])
            .collect()
    }

    #[test]
    fn adds_every_row_and_reports_each() {
        let mut package = JobPackage::new(RunProfile::default(), "unblur", 5).unwrap();
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| {
            events.lock().unwrap().push(p);
        }));

        assert_eq!(populate(&mut package, "ti", rows(3), &reporter).unwrap(), 3);
        drop(reporter);

        assert_eq!(package.added(), 3);
        assert_eq!(package.job(2).unwrap().argument(1).unwrap().integer().unwrap(), 2);
        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::PackageStart { total: 3 },
                Progress::JobAdded { job_number: 0 },
                Progress::JobAdded { job_number: 1 },
                Progress::JobAdded { job_number: 2 },
                Progress::PackageFinish,
            ]
        );
    }

    #[test]
    fn batch_exceeding_free_slots_adds_nothing() {
        let mut package = JobPackage::new(RunProfile::default(), "unblur", 4).unwrap();
        populate(&mut package, "ti", rows(2), &ProgressReporter::new()).unwrap();

        let result = populate(&mut package, "ti", rows(3), &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(JobError::CapacityExceeded { capacity: 4 })
        ));
        assert_eq!(package.added(), 2);
    }

    #[test]
    fn bad_row_stops_the_batch() {
        let mut package = JobPackage::new(RunProfile::default(), "unblur", 4).unwrap();
        let mut batch = rows(1);
        batch.push(arguments!["movie_0001.tif", 1.0f32]);
        batch.extend(rows(1));

        let result = populate(&mut package, "ti", batch, &ProgressReporter::new());
        assert!(matches!(result, Err(JobError::TypeMismatch { .. })));
        assert_eq!(package.added(), 1);
        assert!(!package.job(1).unwrap().is_populated());
    }
}
