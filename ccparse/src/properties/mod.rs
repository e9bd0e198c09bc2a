// SPDX-License-Identifier: GPL-3.0-or-later

//! The IDE configuration file (`c_cpp_properties.json`).
//!
//! The file holds named configurations. A parsed compiler invocation is
//! turned into a configuration, which is merged into the stored file by
//! name. The file is only written when the merge changed its content.

mod configuration;

pub use configuration::{Configuration, GCC_INTELLISENSE_MODE};

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};
use thiserror::Error;

/// The version of the file format written.
pub const PROPERTIES_VERSION: u32 = 4;

/// The content of the properties file.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub configurations: Vec<Configuration>,
}

fn default_version() -> u32 {
    PROPERTIES_VERSION
}

impl Default for Content {
    fn default() -> Self {
        Self { version: PROPERTIES_VERSION, configurations: Vec::new() }
    }
}

impl Content {
    pub fn new(configurations: Vec<Configuration>) -> Self {
        Self { version: PROPERTIES_VERSION, configurations }
    }

    pub fn configuration(&self, name: &str) -> Option<&Configuration> {
        self.configurations.iter().find(|configuration| configuration.name == name)
    }

    /// Merges the configurations of the other into this one.
    ///
    /// Configurations are paired by name, the ones not present yet are
    /// appended. Returns whether the content changed.
    pub fn merge(&mut self, other: Content, mode: MergeMode) -> bool {
        let before = self.clone();

        for incoming in other.configurations {
            match self.configurations.iter_mut().find(|stored| stored.name == incoming.name) {
                Some(stored) => merge_configuration(stored, incoming, mode),
                None => self.configurations.push(incoming),
            }
        }

        *self != before
    }
}

/// How a configuration is combined with the stored one of the same name.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// The incoming configuration replaces the stored one.
    #[default]
    Replace,
    /// The stored list entries stay in place, new entries are appended.
    Unique,
    /// The incoming list entries come first, the stored ones which are not
    /// present in the incoming list are appended.
    KeepOrder,
}

impl MergeMode {
    pub const NAMES: [&'static str; 3] = ["replace", "unique", "keep-order"];
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeMode::Replace => "replace",
            MergeMode::Unique => "unique",
            MergeMode::KeepOrder => "keep-order",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for MergeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "replace" => Ok(MergeMode::Replace),
            "unique" => Ok(MergeMode::Unique),
            "keep-order" => Ok(MergeMode::KeepOrder),
            _ => Err(format!("Unknown merge mode: {value}")),
        }
    }
}

fn merge_configuration(stored: &mut Configuration, incoming: Configuration, mode: MergeMode) {
    match mode {
        MergeMode::Replace => *stored = incoming,
        MergeMode::Unique => {
            stored.update_scalars(&incoming);
            for (current, incoming) in stored.lists_mut(&incoming) {
                for entry in incoming {
                    if !current.contains(entry) {
                        current.push(entry.clone());
                    }
                }
            }
        }
        MergeMode::KeepOrder => {
            stored.update_scalars(&incoming);
            for (current, incoming) in stored.lists_mut(&incoming) {
                let mut merged = incoming.clone();
                merged.extend(current.iter().filter(|entry| !incoming.contains(entry)).cloned());
                *current = merged;
            }
        }
    }
}

/// The properties file as loaded, merged and written by the application.
#[derive(Debug, Default)]
pub struct Properties {
    content: Option<Content>,
    changed: bool,
}

impl Properties {
    /// Loads the file content, a missing file is not an error.
    ///
    /// Returns whether the file was loaded.
    pub fn read(&mut self, path: &Path) -> Result<bool, PropertiesError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                log::debug!("Properties file not found: {}", path.display());
                return Ok(false);
            }
            Err(source) => return Err(PropertiesError::FileAccess { path: path.to_path_buf(), source }),
        };

        let content = serde_json::from_str(&text)
            .map_err(|source| PropertiesError::Parse { path: path.to_path_buf(), source })?;
        self.content = Some(content);
        self.changed = false;
        Ok(true)
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    /// Whether the content differs from what was read or last written.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Merges the content into the loaded one. Returns whether it changed.
    pub fn merge(&mut self, incoming: Content, mode: MergeMode) -> bool {
        let changed = match self.content.as_mut() {
            Some(content) => content.merge(incoming, mode),
            None => {
                self.content = Some(incoming);
                true
            }
        };
        self.changed |= changed;
        changed
    }

    /// Writes the content when it changed. Returns whether it was written.
    ///
    /// The content goes to a temporary file in the target directory first,
    /// which is then renamed over the target.
    pub fn write(&mut self, path: &Path) -> Result<bool, PropertiesError> {
        let Some(content) = self.content.as_ref().filter(|_| self.changed) else {
            return Ok(false);
        };
        let text = to_json_string(content)?;

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_access = |source| PropertiesError::FileAccess { path: path.to_path_buf(), source };

        fs::create_dir_all(directory).map_err(file_access)?;
        let mut temporary = tempfile::NamedTempFile::new_in(directory).map_err(file_access)?;
        temporary.write_all(text.as_bytes()).map_err(file_access)?;
        temporary.persist(path).map_err(|error| file_access(error.error))?;

        log::info!("Properties written to: {}", path.display());
        self.changed = false;
        Ok(true)
    }
}

/// Serializes the content with four space indentation.
pub fn to_json_string(content: &Content) -> Result<String, PropertiesError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    content.serialize(&mut serializer).map_err(PropertiesError::Serialize)?;
    String::from_utf8(buffer).map_err(|error| PropertiesError::Encoding(error.to_string()))
}

#[derive(Debug, Error)]
pub enum PropertiesError {
    #[error("Failed to access properties file '{path}': {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse properties file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize properties: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Properties are not valid UTF-8: {0}")]
    Encoding(String),
}
