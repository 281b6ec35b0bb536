use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use jobpack::core::io::frame;
use jobpack::core::io::traits::WireEncode;
use jobpack::core::models::job::JobState;
use jobpack::core::models::package::JobPackage;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Reading package from {:?}", &args.package);
    let package =
        frame::read_package_from_path(&args.package).map_err(|e| CliError::FileParsing {
            path: args.package.clone(),
            source: e.into(),
        })?;
    print!("{}", render(&package, args.jobs));
    Ok(())
}

fn state_label(state: JobState) -> &'static str {
    match state {
        JobState::Created => "empty",
        JobState::Populated => "pending",
        JobState::Completed => "done",
    }
}

/// Formats a package summary, optionally followed by one line per job slot.
pub fn render(package: &JobPackage, with_jobs: bool) -> String {
    let profile = package.profile();
    let mut lines = vec![
        format!("Profile:      {}", profile.name),
        format!("Executable:   {}", package.executable_name()),
        format!("GUI:          {}", profile.gui_address),
        format!("Controller:   {}", profile.controller_address),
        format!(
            "Commands:     {} ({} copies)",
            profile.run_commands.len(),
            profile.total_copies()
        ),
    ];
    for command in &profile.run_commands {
        lines.push(format!(
            "  - {} x{} ({} threads each)",
            command.command,
            command.effective_copies(),
            command.threads_per_copy
        ));
    }
    lines.push(format!(
        "Jobs:         {}/{} added, {} remaining",
        package.added(),
        package.capacity(),
        package.remaining_count()
    ));
    lines.push(format!("Encoded size: {} bytes", package.encoded_size()));

    if with_jobs {
        for job in package.jobs() {
            lines.push(format!("  {:<8} {}", state_label(job.state()), job));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobpack::arguments;
    use jobpack::core::models::profile::{RunCommand, RunProfile};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sample_package() -> JobPackage {
        let profile = RunProfile::new("cluster", "ctffind")
            .with_command(RunCommand::new("ssh node1 $command", 4));
        let mut package = JobPackage::new(profile, "ctffind", 3).unwrap();
        package
            .add_job("ti", arguments!["image_0.mrc", 512i32])
            .unwrap();
        package
            .add_job("ti", arguments!["image_1.mrc", 256i32])
            .unwrap();
        package.mark_completed(1).unwrap();
        package
    }

    #[test]
    fn summary_lists_profile_and_counts() {
        let package = sample_package();
        let text = render(&package, false);

        assert!(text.contains("Profile:      cluster"));
        assert!(text.contains("Executable:   ctffind"));
        assert!(text.contains("Commands:     1 (4 copies)"));
        assert!(text.contains("Jobs:         2/3 added, 2 remaining"));
        assert!(text.contains(&format!("Encoded size: {} bytes", package.encoded_size())));
        assert!(!text.contains("image_0.mrc"));
    }

    #[test]
    fn job_listing_shows_each_slot_with_state() {
        let text = render(&sample_package(), true);
        let job_lines: Vec<&str> = text.lines().filter(|l| l.contains('#')).collect();

        assert_eq!(job_lines.len(), 3);
        assert!(job_lines[0].contains("pending"));
        assert!(job_lines[0].contains("\"image_0.mrc\", 512"));
        assert!(job_lines[1].contains("done"));
        assert!(job_lines[2].contains("empty"));
        assert!(job_lines[2].contains("#2 []"));
    }

    #[test]
    fn corrupt_file_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.jpkg");
        std::fs::write(&path, b"NOPE\x01").unwrap();

        let result = run(InspectArgs {
            package: path.clone(),
            jobs: false,
        });
        match result {
            Err(CliError::FileParsing { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected a parsing error, got {:?}", other),
        }
    }

    #[test]
    fn written_package_can_be_inspected() {
        let dir = tempdir().unwrap();
        let path: PathBuf = dir.path().join("batch.jpkg");
        frame::write_package_to_path(&path, &sample_package()).unwrap();

        run(InspectArgs {
            package: path,
            jobs: true,
        })
        .unwrap();
    }
}
