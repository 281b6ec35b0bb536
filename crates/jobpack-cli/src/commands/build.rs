use crate::cli::BuildArgs;
use crate::config::PartialManifest;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use crate::utils::table::read_job_table;
use jobpack::core::io::frame;
use jobpack::core::models::package::JobPackage;
use jobpack::engine::progress::ProgressReporter;
use jobpack::workflows::populate::populate;
use tracing::info;

pub fn run(args: BuildArgs) -> Result<()> {
    let package = assemble(&args, Some(CliProgressHandler::new("Adding jobs")))?;

    info!("Writing package to {:?}", &args.output);
    let written = frame::write_package_to_path(&args.output, &package)?;
    println!(
        "✓ Package for '{}' with {}/{} jobs written to {} ({} bytes)",
        package.executable_name(),
        package.added(),
        package.capacity(),
        args.output.display(),
        written
    );
    Ok(())
}

/// Builds the package described by the manifest, CLI overrides and job table.
fn assemble(args: &BuildArgs, progress: Option<CliProgressHandler>) -> Result<JobPackage> {
    let manifest = PartialManifest::from_file(&args.manifest)?;
    info!("Merging manifest with CLI arguments...");
    let config = manifest.merge_with_cli(args)?;

    let table = match &args.jobs {
        Some(path) => {
            let codes = config.type_codes.as_deref().ok_or_else(|| {
                CliError::Config(
                    "A job table requires `type-codes` in the manifest or --type-codes."
                        .to_string(),
                )
            })?;
            Some((codes, read_job_table(path, codes, config.table)?))
        }
        None => None,
    };

    let table_len = table.as_ref().map_or(0, |(_, rows)| rows.len());
    let total = config.jobs.len() + table_len;
    let capacity = config.capacity.unwrap_or(total);
    if total > capacity {
        return Err(CliError::Config(format!(
            "{} jobs were supplied but the capacity is {}.",
            total, capacity
        )));
    }

    let mut package = JobPackage::new(config.profile, &config.executable, capacity)?;
    for job in config.jobs {
        package.add_job(&job.type_codes, job.values)?;
    }
    info!("Added {} jobs from the manifest", package.added());

    if let Some((codes, rows)) = table {
        let reporter = match &progress {
            Some(handler) => ProgressReporter::with_callback(handler.get_callback()),
            None => ProgressReporter::new(),
        };
        populate(&mut package, codes, rows, &reporter)?;
    }

    Ok(package)
}
