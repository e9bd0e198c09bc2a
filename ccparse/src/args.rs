// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains the command line interface of the application.
//!
//! The command line parsing is implemented using the `clap` library.
//! The `Arguments` type is the structured form of the program invocation.

use crate::properties::MergeMode;
use anyhow::anyhow;
use clap::{arg, command, ArgAction, ArgMatches, Command};
use std::fmt;

/// Common constants used in the module.
pub const STDIN_FILE_NAME: &str = "-";
const DEFAULT_OUTPUT_FILE: &str = ".vscode/c_cpp_properties.json";

/// Represents the command line arguments of the application.
#[derive(Debug, PartialEq)]
pub struct Arguments {
    // The path of the configuration file.
    pub config: Option<String>,
    // The build log to scan, `-` for the standard input.
    pub input: String,
    // The properties file to update.
    pub output: String,
    // Overrides of the configuration file values.
    pub name: Option<String>,
    pub merge: Option<MergeMode>,
    pub builtin_info: bool,
}

impl Arguments {
    pub fn reads_stdin(&self) -> bool {
        self.input == STDIN_FILE_NAME
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arguments: input={}, output={}", self.input, self.output)?;
        if let Some(config) = &self.config {
            write!(f, ", config={config}")?;
        }
        if let Some(name) = &self.name {
            write!(f, ", name={name}")?;
        }
        if let Some(merge) = &self.merge {
            write!(f, ", merge={merge}")?;
        }
        if !self.builtin_info {
            write!(f, ", built-in info disabled")?;
        }
        Ok(())
    }
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        let config = matches.get_one::<String>("config").map(String::to_string);
        let input = matches.get_one::<String>("input").map(String::to_string).expect("input is defaulted");
        let output = matches.get_one::<String>("output").map(String::to_string).expect("output is defaulted");
        let name = matches.get_one::<String>("name").map(String::to_string);
        let merge = matches
            .get_one::<String>("merge")
            .map(|value| value.parse::<MergeMode>().map_err(|message| anyhow!(message)))
            .transpose()?;
        let builtin_info = !matches.get_flag("no-builtin");

        Ok(Arguments { config, input, output, name, merge, builtin_info })
    }
}

/// Represents the command line interface of the application.
///
/// The build log is read line by line, the first compiler invocation
/// recognized by the configured parsers is merged into the properties file.
pub fn cli() -> Command {
    command!().args(&[
        arg!(-c --config <FILE> "Path of the config file"),
        arg!(-i --input <FILE> "Path of the build log, '-' reads the standard input")
            .default_value(STDIN_FILE_NAME)
            .hide_default_value(false),
        arg!(-o --output <FILE> "Path of the properties file")
            .default_value(DEFAULT_OUTPUT_FILE)
            .hide_default_value(false),
        arg!(-n --name <NAME> "Name of the configuration to write"),
        arg!(-m --merge <MODE> "How to merge into the existing configuration").value_parser(MergeMode::NAMES),
        arg!(--"no-builtin" "Do not query the compiler for its built-in includes and defines")
            .action(ArgAction::SetTrue),
    ])
}
