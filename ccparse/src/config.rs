// SPDX-License-Identifier: GPL-3.0-or-later

//! This module defines the configuration of the application.
//!
//! The configuration is either loaded from a file or used with default
//! values, which are defined in the code. It tells which parser engines
//! are tried on the lines of the build log, and how the result is merged
//! into the properties file.
//!
//! The configuration file syntax is based on the YAML format.
//! The default configuration file name is `ccparse.yml`.
//!
//! The configuration file location is searched in the following order:
//! 1. The current working directory
//! 2. The local configuration directory of the user
//! 3. The configuration directory of the user
//! 4. The local configuration directory of the application
//! 5. The configuration directory of the application
//!
//! ```yaml
//! schema: "1.0"
//!
//! parsers:
//!   - dialect: gcc
//!     match:
//!       - regex: '(?:^|-)g\+\+\s+'
//!       - regex: '\s+-c\s+'
//!     dont_match:
//!       - regex: '-o\s/dev/null'
//!     builtin_info: true
//!     directory_options:
//!       prefix: ["/opt/sdk/"]
//!
//! properties:
//!   configuration: Arduino
//!   merge: unique
//! ```

// Re-Export the types and the loader module content.
pub use loader::{ConfigError, Loader};
pub use types::*;
pub use validation::{ValidationError, Validator};

mod types {
    use crate::parser::DirectoryOptions;
    use crate::properties::MergeMode;
    use serde::{Deserialize, Serialize};
    use std::fmt;

    /// Represents the application configuration.
    #[derive(Debug, PartialEq, Deserialize, Serialize)]
    pub struct Main {
        #[serde(deserialize_with = "validate_schema_version")]
        pub schema: String,
        #[serde(default = "default_parsers")]
        pub parsers: Vec<Parser>,
        #[serde(default)]
        pub properties: Properties,
    }

    impl Default for Main {
        fn default() -> Self {
            Self {
                schema: String::from(SUPPORTED_SCHEMA_VERSION),
                parsers: default_parsers(),
                properties: Properties::default(),
            }
        }
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Configuration:")?;
            let yaml_string = serde_yml::to_string(self).map_err(|_| fmt::Error)?;
            for line in yaml_string.lines() {
                writeln!(f, "{}", line)?;
            }
            Ok(())
        }
    }

    /// A parser engine: the dialect and the trigger of it.
    #[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
    pub struct Parser {
        #[serde(default)]
        pub dialect: Dialect,
        #[serde(rename = "match", default)]
        pub match_: Vec<Pattern>,
        #[serde(default)]
        pub dont_match: Vec<Pattern>,
        #[serde(default = "default_enabled")]
        pub builtin_info: bool,
        #[serde(default)]
        pub directory_options: DirectoryOptions,
    }

    impl Parser {
        /// The engine recognizing the compile commands of `g++`.
        pub fn gcc() -> Self {
            Self {
                dialect: Dialect::Gcc,
                match_: vec![Pattern::regex(r"(?:^|-)g\+\+\s+"), Pattern::regex(r"\s+-c\s+")],
                dont_match: vec![Pattern::regex(r"-o\s/dev/null")],
                builtin_info: true,
                directory_options: DirectoryOptions::default(),
            }
        }
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
    pub enum Dialect {
        #[default]
        #[serde(rename = "gcc")]
        Gcc,
    }

    /// A trigger pattern, written as `literal: <text>` or `regex: <expression>`.
    #[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
    #[serde(untagged)]
    pub enum Pattern {
        Literal { literal: String },
        Regex { regex: String },
    }

    impl Pattern {
        pub fn literal(text: &str) -> Self {
            Pattern::Literal { literal: text.to_string() }
        }

        pub fn regex(expression: &str) -> Self {
            Pattern::Regex { regex: expression.to_string() }
        }
    }

    /// Where the parsed result goes in the properties file.
    #[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
    pub struct Properties {
        #[serde(default = "default_configuration_name")]
        pub configuration: String,
        #[serde(default)]
        pub merge: MergeMode,
    }

    impl Default for Properties {
        fn default() -> Self {
            Self { configuration: default_configuration_name(), merge: MergeMode::default() }
        }
    }

    pub(super) const SUPPORTED_SCHEMA_VERSION: &str = "1.0";
    const DEFAULT_CONFIGURATION_NAME: &str = "ccparse";

    fn default_parsers() -> Vec<Parser> {
        vec![Parser::gcc()]
    }

    fn default_configuration_name() -> String {
        String::from(DEFAULT_CONFIGURATION_NAME)
    }

    fn default_enabled() -> bool {
        true
    }

    // Custom deserialization function to validate the schema version
    fn validate_schema_version<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let schema: String = Deserialize::deserialize(deserializer)?;
        if schema != SUPPORTED_SCHEMA_VERSION {
            use serde::de::Error;
            Err(Error::custom(format!(
                "Unsupported schema version: {schema}. Expected: {SUPPORTED_SCHEMA_VERSION}"
            )))
        } else {
            Ok(schema)
        }
    }
}

pub mod validation {
    use super::types::*;
    use thiserror::Error;

    /// Trait for validating configuration objects
    pub trait Validator<T> {
        type Error: std::error::Error;

        fn validate(config: &T) -> Result<(), Self::Error>;
    }

    /// Validation errors for configuration
    #[derive(Debug, Error)]
    pub enum ValidationError {
        #[error("Empty string value for field '{field}'")]
        EmptyString { field: String },
        #[error("Empty list for field '{field}'")]
        EmptyList { field: String },
        #[error("Invalid regular expression in field '{field}': {message}")]
        InvalidPattern { field: String, message: String },
        #[error("Multiple validation errors: {errors:?}")]
        Multiple { errors: Vec<ValidationError> },
    }

    /// Combinator for collecting and handling validation errors
    #[derive(Default)]
    struct ValidationCollector {
        errors: Vec<ValidationError>,
    }

    impl ValidationCollector {
        fn add(&mut self, error: ValidationError) {
            self.errors.push(error);
        }

        fn add_result(&mut self, result: Result<(), ValidationError>) {
            if let Err(error) = result {
                match error {
                    ValidationError::Multiple { errors } => self.errors.extend(errors),
                    single_error => self.errors.push(single_error),
                }
            }
        }

        fn finish(mut self) -> Result<(), ValidationError> {
            match self.errors.len() {
                0 => Ok(()),
                1 => Err(self.errors.remove(0)),
                _ => Err(ValidationError::Multiple { errors: self.errors }),
            }
        }
    }

    impl Validator<Main> for Main {
        type Error = ValidationError;

        fn validate(config: &Main) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::default();

            if config.parsers.is_empty() {
                collector.add(ValidationError::EmptyList { field: "parsers".to_string() });
            }
            for (idx, parser) in config.parsers.iter().enumerate() {
                collector.add_result(validate_parser(idx, parser));
            }
            collector.add_result(Properties::validate(&config.properties));

            collector.finish()
        }
    }

    fn validate_parser(idx: usize, parser: &Parser) -> Result<(), ValidationError> {
        let mut collector = ValidationCollector::default();

        if parser.match_.is_empty() {
            collector.add(ValidationError::EmptyList { field: format!("parsers[{idx}].match") });
        }
        let patterns = parser
            .match_
            .iter()
            .enumerate()
            .map(|(pos, pattern)| (format!("parsers[{idx}].match[{pos}]"), pattern))
            .chain(
                parser
                    .dont_match
                    .iter()
                    .enumerate()
                    .map(|(pos, pattern)| (format!("parsers[{idx}].dont_match[{pos}]"), pattern)),
            );
        for (field, pattern) in patterns {
            collector.add_result(validate_pattern(field, pattern));
        }

        collector.finish()
    }

    fn validate_pattern(field: String, pattern: &Pattern) -> Result<(), ValidationError> {
        match pattern {
            Pattern::Literal { literal } if literal.is_empty() => Err(ValidationError::EmptyString { field }),
            Pattern::Literal { .. } => Ok(()),
            Pattern::Regex { regex } => regex::Regex::new(regex)
                .map(|_| ())
                .map_err(|error| ValidationError::InvalidPattern { field, message: error.to_string() }),
        }
    }

    impl Validator<Properties> for Properties {
        type Error = ValidationError;

        fn validate(config: &Properties) -> Result<(), Self::Error> {
            if config.configuration.trim().is_empty() {
                return Err(ValidationError::EmptyString { field: "properties.configuration".to_string() });
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn test_default_config_is_valid() {
            assert!(Main::validate(&Main::default()).is_ok());
        }

        #[test]
        fn test_empty_parser_list() {
            let config = Main { parsers: vec![], ..Main::default() };

            assert!(matches!(Main::validate(&config), Err(ValidationError::EmptyList { .. })));
        }

        #[test]
        fn test_errors_are_collected() {
            let parser = Parser {
                match_: vec![],
                dont_match: vec![Pattern::regex("(unclosed"), Pattern::literal("")],
                ..Parser::gcc()
            };
            let config = Main {
                parsers: vec![parser],
                properties: Properties { configuration: " ".to_string(), ..Properties::default() },
                ..Main::default()
            };

            match Main::validate(&config) {
                Err(ValidationError::Multiple { errors }) => {
                    assert_eq!(errors.len(), 4);
                    assert!(matches!(&errors[1], ValidationError::InvalidPattern { field, .. }
                        if field == "parsers[0].dont_match[0]"));
                }
                other => panic!("unexpected validation result: {other:?}"),
            }
        }
    }
}

pub mod loader {
    use super::{Main, Validator};
    use directories::{BaseDirs, ProjectDirs};
    use log::{debug, info};
    use std::fs::OpenOptions;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    /// The configuration file name searched in the default locations.
    pub const CONFIG_FILE_NAME: &str = "ccparse.yml";

    pub struct Loader {}

    impl Loader {
        /// Loads the configuration from the specified file or the default locations.
        ///
        /// If the configuration file is specified, it will be used. Otherwise, the default locations
        /// will be searched for the configuration file. If the configuration file is not found, the
        /// default configuration will be returned.
        pub fn load(current_directory: &Path, filename: Option<&Path>) -> Result<Main, ConfigError> {
            if let Some(path) = filename {
                return Self::from_file(path);
            }
            for location in Self::file_locations(current_directory) {
                debug!("Checking configuration file: {}", location.display());
                if location.exists() {
                    return Self::from_file(location.as_path());
                }
            }
            debug!("Configuration file not found. Using the default configuration.");
            Ok(Main::default())
        }

        /// The default locations where the configuration file can be found.
        fn file_locations(current_directory: &Path) -> Vec<PathBuf> {
            let mut locations = vec![current_directory.to_path_buf()];

            if let Some(base_dirs) = BaseDirs::new() {
                locations.push(base_dirs.config_local_dir().to_path_buf());
                locations.push(base_dirs.config_dir().to_path_buf());
            }
            if let Some(proj_dirs) = ProjectDirs::from("com.github", "ccparse", "ccparse") {
                locations.push(proj_dirs.config_local_dir().to_path_buf());
                locations.push(proj_dirs.config_dir().to_path_buf());
            }
            locations.dedup();
            locations.iter().map(|path| path.join(CONFIG_FILE_NAME)).collect()
        }

        /// Loads the configuration from the specified file.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            info!("Loading configuration file: {}", path.display());

            let reader = OpenOptions::new()
                .read(true)
                .open(path)
                .map_err(|source| ConfigError::FileAccess { path: path.to_path_buf(), source })?;

            let content: Main = Self::from_reader(reader)
                .map_err(|source| ConfigError::ParseError { path: path.to_path_buf(), source })?;

            Main::validate(&content)
                .map_err(|source| ConfigError::ValidationError { path: path.to_path_buf(), source })?;

            Ok(content)
        }

        /// Define the deserialization format of the config file.
        fn from_reader<R, T>(rdr: R) -> serde_yml::Result<T>
        where
            R: std::io::Read,
            T: serde::de::DeserializeOwned,
        {
            serde_yml::from_reader(rdr)
        }
    }

    /// Represents all possible configuration-related errors.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("Failed to access configuration file '{path}': {source}")]
        FileAccess {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("Failed to parse configuration from file '{path}': {source}")]
        ParseError {
            path: PathBuf,
            #[source]
            source: serde_yml::Error,
        },
        #[error("Configuration validation failed: {source}")]
        ValidationError {
            path: PathBuf,
            #[source]
            source: crate::config::validation::ValidationError,
        },
    }

}
