use crate::core::io::codec::{self, LEN_PREFIX, prefixed_len};
use crate::core::io::traits::{WireDecode, WireEncode};
use crate::engine::error::Result;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// One way of launching worker copies, as configured in a run profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunCommand {
    /// Launch command line; `$command` style substitution is left to the launcher.
    pub command: String,
    #[serde(default = "default_copies")]
    pub number_of_copies: i32,
    #[serde(default = "default_copies")]
    pub threads_per_copy: i32,
    #[serde(default)]
    pub override_total_copies: bool,
    #[serde(default)]
    pub overridden_number_of_copies: i32,
    /// Delay between launching successive copies.
    #[serde(default)]
    pub delay_ms: i32,
}

fn default_copies() -> i32 {
    1
}

impl RunCommand {
    pub fn new(command: impl Into<String>, number_of_copies: i32) -> Self {
        Self {
            command: command.into(),
            number_of_copies,
            threads_per_copy: 1,
            override_total_copies: false,
            overridden_number_of_copies: 0,
            delay_ms: 0,
        }
    }

    /// Number of copies this command contributes to a run.
    pub fn effective_copies(&self) -> i32 {
        if self.override_total_copies {
            self.overridden_number_of_copies
        } else {
            self.number_of_copies
        }
    }

    fn encoded_size(&self) -> usize {
        prefixed_len(self.command.len()) + 4 + 4 + 1 + 4 + 4
    }

    fn write_body(&self, writer: &mut impl Write) -> Result<()> {
        codec::write_text(writer, &self.command)?;
        codec::write_i32(writer, self.number_of_copies)?;
        codec::write_i32(writer, self.threads_per_copy)?;
        codec::write_bool(writer, self.override_total_copies)?;
        codec::write_i32(writer, self.overridden_number_of_copies)?;
        codec::write_i32(writer, self.delay_ms)
    }

    fn decode(reader: &mut impl Read) -> Result<Self> {
        Ok(Self {
            command: codec::read_text(reader)?,
            number_of_copies: codec::read_i32(reader)?,
            threads_per_copy: codec::read_i32(reader)?,
            override_total_copies: codec::read_bool(reader)?,
            overridden_number_of_copies: codec::read_i32(reader)?,
            delay_ms: codec::read_i32(reader)?,
        })
    }
}

/// Identifies the executable and launch parameters for a batch of jobs.
///
/// A job package treats the profile as an opaque prefix except for the
/// executable name. On the wire the text fields come first, in declaration
/// order, followed by the command count and the commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub executable_name: String,
    #[serde(default)]
    pub gui_address: String,
    #[serde(default)]
    pub controller_address: String,
    #[serde(default)]
    pub run_commands: Vec<RunCommand>,
}

impl RunProfile {
    pub fn new(name: impl Into<String>, executable_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executable_name: executable_name.into(),
            ..Self::default()
        }
    }

    pub fn with_command(mut self, command: RunCommand) -> Self {
        self.run_commands.push(command);
        self
    }

    /// Total number of worker copies launched across all commands.
    pub fn total_copies(&self) -> i32 {
        self.run_commands
            .iter()
            .map(RunCommand::effective_copies)
            .sum()
    }
}

impl WireEncode for RunProfile {
    fn encoded_size(&self) -> usize {
        prefixed_len(self.name.len())
            + prefixed_len(self.executable_name.len())
            + prefixed_len(self.gui_address.len())
            + prefixed_len(self.controller_address.len())
            + LEN_PREFIX
            + self
                .run_commands
                .iter()
                .map(RunCommand::encoded_size)
                .sum::<usize>()
    }

    fn write_body(&self, writer: &mut impl Write) -> Result<()> {
        codec::write_text(writer, &self.name)?;
        codec::write_text(writer, &self.executable_name)?;
        codec::write_text(writer, &self.gui_address)?;
        codec::write_text(writer, &self.controller_address)?;
        codec::write_len(writer, self.run_commands.len())?;
        for command in &self.run_commands {
            command.write_body(writer)?;
        }
        Ok(())
    }
}

impl WireDecode for RunProfile {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        let name = codec::read_text(reader)?;
        let executable_name = codec::read_text(reader)?;
        let gui_address = codec::read_text(reader)?;
        let controller_address = codec::read_text(reader)?;
        let count = codec::read_len(reader)?;
        let mut run_commands = Vec::new();
        for _ in 0..count {
            run_commands.push(RunCommand::decode(reader)?);
        }
        Ok(Self {
            name,
            executable_name,
            gui_address,
            controller_address,
            run_commands,
        })
    }
}
