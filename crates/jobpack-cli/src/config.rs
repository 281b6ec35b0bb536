mod defaults;

use crate::cli::BuildArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use crate::utils::table::TableOptions;
use defaults::DefaultsConfig;
use jobpack::core::models::format::{ArgumentList, parse_type_codes};
use jobpack::core::models::profile::{RunCommand, RunProfile};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialTableConfig {
    delimiter: Option<char>,
    has_headers: Option<bool>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialJobEntry {
    type_codes: Option<String>,
    values: Vec<toml::Value>,
}

/// The manifest as written on disk; every field may be absent until merged.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialManifest {
    executable: Option<String>,
    capacity: Option<usize>,
    type_codes: Option<String>,
    profile: Option<RunProfile>,
    csv: Option<PartialTableConfig>,
    #[serde(default)]
    jobs: Vec<PartialJobEntry>,
}

/// A manifest job after its values were typed.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    pub type_codes: String,
    pub values: ArgumentList,
}

/// Everything `build` needs, after file, CLI flags and `--set` were merged.
#[derive(Debug)]
pub struct BuildConfig {
    pub profile: RunProfile,
    pub executable: String,
    /// `None` sizes the package to the jobs supplied.
    pub capacity: Option<usize>,
    /// Codes shared by manifest jobs without their own and by CSV rows.
    pub type_codes: Option<String>,
    pub jobs: Vec<JobSpec>,
    pub table: TableOptions,
}

impl PartialManifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading manifest from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_with_cli(mut self, args: &BuildArgs) -> Result<BuildConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let mut profile = self.profile.take().unwrap_or_default();
        if profile.name.is_empty() {
            profile.name = defaults.profile_name.clone();
        }
        if profile.run_commands.is_empty() {
            profile
                .run_commands
                .push(RunCommand::new(defaults.run_command.clone(), 1));
        }

        let executable = args
            .executable
            .clone()
            .or(self.executable.take())
            .or_else(|| Some(profile.executable_name.clone()).filter(|n| !n.is_empty()))
            .ok_or_else(|| {
                CliError::Config(
                    "An executable is required, via `executable`, `profile.executable-name` or --executable."
                        .to_string(),
                )
            })?;

        let type_codes = args.type_codes.clone().or(self.type_codes.take());
        if let Some(codes) = &type_codes {
            parse_type_codes(codes)
                .map_err(|e| CliError::Config(format!("Invalid `type-codes`: {}", e)))?;
        }

        let jobs = self
            .jobs
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let codes = entry
                    .type_codes
                    .or_else(|| type_codes.clone())
                    .ok_or_else(|| {
                        CliError::Config(format!(
                            "jobs[{}] has no `type-codes` and no manifest-wide `type-codes` is set.",
                            i
                        ))
                    })?;
                let values = parser::parse_toml_row(&codes, &entry.values)
                    .map_err(|e| CliError::Config(format!("jobs[{}]: {}", i, e)))?;
                Ok(JobSpec {
                    type_codes: codes,
                    values,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let table_config = self.csv.take().unwrap_or_default();
        let delimiter = table_config.delimiter.unwrap_or(defaults.csv_delimiter);
        let delimiter = u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                CliError::Config(format!(
                    "`csv.delimiter` must be a single ASCII character, got '{}'.",
                    delimiter
                ))
            })?;

        Ok(BuildConfig {
            profile,
            executable,
            capacity: args.capacity.or(self.capacity),
            type_codes,
            jobs,
            table: TableOptions {
                delimiter,
                has_headers: table_config
                    .has_headers
                    .unwrap_or(defaults.csv_has_headers),
            },
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;
            let value = value_str.to_string();

            match key {
                "executable" => self.executable = Some(value),
                "type-codes" => self.type_codes = Some(value),
                "capacity" => {
                    self.capacity = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "profile.name" => self.profile_mut().name = value,
                "profile.executable-name" => self.profile_mut().executable_name = value,
                "profile.gui-address" => self.profile_mut().gui_address = value,
                "profile.controller-address" => self.profile_mut().controller_address = value,
                "csv.delimiter" => {
                    let mut chars = value_str.chars();
                    let delimiter = match (chars.next(), chars.next()) {
                        (Some(c), None) => c,
                        _ => {
                            return Err(CliError::Config(format!(
                                "Invalid character value for {}: {}",
                                key, value_str
                            )));
                        }
                    };
                    self.csv.get_or_insert_with(Default::default).delimiter = Some(delimiter);
                }
                "csv.has-headers" => {
                    self.csv.get_or_insert_with(Default::default).has_headers =
                        Some(value_str.parse().map_err(|_| {
                            CliError::Config(format!(
                                "Invalid boolean value for {}: {}",
                                key, value_str
                            ))
                        })?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn profile_mut(&mut self) -> &mut RunProfile {
        self.profile.get_or_insert_with(Default::default)
    }
}
