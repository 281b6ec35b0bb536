#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PackageStart { total: u64 },
    JobAdded { job_number: i32 },
    JobCompleted { job_number: i32 },
    PackageFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_is_silent() {
        ProgressReporter::new().report(Progress::PackageFinish);
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| {
            seen.lock().unwrap().push(p);
        }));
        reporter.report(Progress::PackageStart { total: 2 });
        reporter.report(Progress::JobCompleted { job_number: 1 });
        drop(reporter);

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![
                Progress::PackageStart { total: 2 },
                Progress::JobCompleted { job_number: 1 }
            ]
        );
    }
}
