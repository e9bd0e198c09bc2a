// SPDX-License-Identifier: GPL-3.0-or-later

//! This module extracts compiler invocation metadata from build log lines.
//!
//! The main abstractions are:
//! - `Trigger`: decides from the raw line whether an engine should try it.
//! - `Dialect`: classifies the arguments of a line into a `ParseResult`.
//!   The gcc-family dialect is implemented by `GccParser`.
//! - `Engine`: binds a trigger and a dialect, keeps the first result and
//!   optionally enriches it with the compiler's built-in information.
//! - `Runner`: feeds lines to an ordered list of engines until one of them
//!   produces a result.

pub mod engine;
pub mod gcc;
pub mod reader;
pub mod result;
pub mod runner;
pub mod tokenizer;
pub mod trigger;

pub use engine::{Engine, Enrichment};
pub use gcc::{DirectoryOption, DirectoryOptions, GccParser};
pub use reader::{FileReader, FsFileReader};
pub use result::{CppStandard, ParseResult};
pub use runner::Runner;
pub use tokenizer::tokenize;
pub use trigger::{Pattern, Trigger, TriggerError};

use std::path::PathBuf;
use thiserror::Error;

/// Classifies the arguments of a single command line.
///
/// Implementors may keep state between calls (like the directory options of
/// the gcc dialect), therefore parsing takes a mutable reference.
pub trait Dialect {
    /// Short name of the dialect, used in log messages.
    fn name(&self) -> &'static str;

    fn parse(&mut self, line: &str) -> Result<ParseResult, ParseError>;
}

/// Failures which abort the parsing of a line.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read response file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Response file {path} is nested deeper than {limit} levels")]
    ResponseFileTooDeep { path: PathBuf, limit: usize },
    #[error("Response file {path} includes itself")]
    ResponseFileCycle { path: PathBuf },
}
