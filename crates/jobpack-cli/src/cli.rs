use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "jobpack - build and inspect job package files for distributed cryo-EM processing runs.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a job package file from a TOML manifest and an optional CSV job table.
    Build(BuildArgs),
    /// Print the profile and jobs stored in a job package file.
    Inspect(InspectArgs),
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the package manifest in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Path for the package file to write.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// CSV job table; each row becomes one job, columns parsed by the type codes.
    #[arg(short, long, value_name = "PATH")]
    pub jobs: Option<PathBuf>,

    /// Override the executable every job in the package runs.
    #[arg(short, long, value_name = "NAME")]
    pub executable: Option<String>,

    /// Override the number of job slots. Defaults to the number of jobs supplied.
    #[arg(short, long, value_name = "INT")]
    pub capacity: Option<usize>,

    /// Override the type-code string shared by the manifest and CSV jobs.
    #[arg(short, long, value_name = "CODES")]
    pub type_codes: Option<String>,

    /// Set a specific manifest value, overriding the file.
    /// Can be used multiple times. Example: -S profile.gui-address=10.0.0.1:3000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the job package file.
    #[arg(required = true, value_name = "PATH")]
    pub package: PathBuf,

    /// Also list every job slot with its signature and arguments.
    #[arg(long)]
    pub jobs: bool,
}
