// SPDX-License-Identifier: GPL-3.0-or-later

//! Built-in information of compilers.
//!
//! Compilers have default include directories and predefined macros which
//! are not visible on the command line. Source analysis tools need them to
//! resolve headers like the standard library ones, so a parsed result can
//! be enriched with these values through a [`BuiltInInfoSource`].

pub mod gcc;

pub use gcc::{CommandProbe, CompilerProbe, GccInfoSource, ProbeOutput};

use thiserror::Error;

/// Include directories and defines the compiler uses without being asked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuiltInInfo {
    pub includes: Vec<String>,
    pub defines: Vec<String>,
}

impl BuiltInInfo {
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.defines.is_empty()
    }
}

/// Answers queries for the built-in information of a compiler.
///
/// Returns `Ok(None)` when the compiler was queried but reported nothing.
#[cfg_attr(test, mockall::automock)]
pub trait BuiltInInfoSource {
    fn info(&mut self, compiler: &str) -> Result<Option<BuiltInInfo>, InfoError>;
}

/// Failures of a built-in information query.
///
/// The errors carry no OS handles, so they can be cached and replayed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InfoError {
    #[error("Compiler not found: {compiler}")]
    NotFound { compiler: String },
    #[error("Failed to execute compiler {compiler}: {reason}")]
    Execution { compiler: String, reason: String },
    #[error("Compiler {compiler} failed with exit code {code:?}")]
    Status { compiler: String, code: Option<i32> },
}
