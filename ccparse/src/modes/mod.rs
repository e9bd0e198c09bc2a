// SPDX-License-Identifier: GPL-3.0-or-later

mod execution;

pub use execution::{Consumer, PropertiesWriter, Scanner};

use crate::builtin::GccInfoSource;
use crate::parser::{Engine, GccParser, Pattern, Runner, Trigger, TriggerError};
use crate::{args, config};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

/// The build log the application reads.
#[derive(Debug)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

/// The configured application: scans the input, writes the result.
pub struct Application {
    input: Input,
    scanner: Scanner,
    consumer: Box<dyn Consumer>,
}

impl Application {
    /// Configure the application based on the command line arguments and the configuration.
    ///
    /// The command line arguments take precedence over the configuration
    /// values. Invalid trigger patterns are reported here, before any input
    /// is read.
    pub fn configure(args: args::Arguments, config: config::Main) -> Result<Self, ConfigurationError> {
        let engines = config
            .parsers
            .iter()
            .map(|parser| create_engine(parser, args.builtin_info))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("Parser engines configured: {}", engines.len());
        let input = if args.reads_stdin() { Input::Stdin } else { Input::File(PathBuf::from(&args.input)) };

        let name = args.name.unwrap_or(config.properties.configuration);
        if name.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfiguration("empty configuration name".to_string()));
        }
        let mode = args.merge.unwrap_or(config.properties.merge);
        log::debug!("Writing configuration '{name}' with merge mode {mode}");

        let consumer = PropertiesWriter::new(args.output, name, mode);

        Ok(Self { input, scanner: Scanner::new(Runner::new(engines)), consumer: Box::new(consumer) })
    }

    /// It actually runs the application.
    ///
    /// The errors here are run-time errors: the input can't be read or the
    /// properties file can't be updated.
    pub fn run(self) -> ExitCode {
        self.execute().unwrap_or_else(|error| {
            log::error!("ccparse: {error}");
            ExitCode::FAILURE
        })
    }

    fn execute(self) -> anyhow::Result<ExitCode> {
        let Self { input, mut scanner, mut consumer } = self;

        let found = match &input {
            Input::Stdin => scanner.scan(io::stdin().lock())?,
            Input::File(path) => {
                let file = File::open(path)
                    .map_err(|error| anyhow::anyhow!("Failed to open build log {}: {error}", path.display()))?;
                scanner.scan(BufReader::new(file))?
            }
        };

        match found {
            Some(result) => {
                log::info!("{result}");
                consumer.consume(result)?;
                Ok(ExitCode::SUCCESS)
            }
            None => {
                log::warn!("No compiler invocation found in {input:?}");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn create_engine(parser: &config::Parser, builtin_info: bool) -> Result<Engine, ConfigurationError> {
    let patterns = |list: &[config::Pattern]| list.iter().map(Pattern::try_from).collect::<Result<Vec<_>, _>>();
    let trigger = Trigger::new(patterns(&parser.match_)?, patterns(&parser.dont_match)?);

    let dialect = match parser.dialect {
        config::Dialect::Gcc => GccParser::new().with_directory_options(parser.directory_options.clone()),
    };

    let mut engine = Engine::new(trigger, Box::new(dialect)).with_info_source(Box::new(GccInfoSource::default()));
    engine.set_info_enabled(parser.builtin_info && builtin_info);
    Ok(engine)
}

impl TryFrom<&config::Pattern> for Pattern {
    type Error = TriggerError;

    fn try_from(value: &config::Pattern) -> Result<Self, Self::Error> {
        match value {
            config::Pattern::Literal { literal } => Ok(Pattern::literal(literal.as_str())),
            config::Pattern::Regex { regex } => Pattern::regex(regex),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid parser trigger: {0}")]
    Trigger(#[from] TriggerError),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
