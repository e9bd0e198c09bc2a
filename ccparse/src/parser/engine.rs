// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Dialect, ParseError, ParseResult, Trigger};
use crate::builtin::{BuiltInInfoSource, InfoError};

/// The outcome of the built-in information enrichment of a result.
#[derive(Debug, PartialEq, Eq)]
pub enum Enrichment {
    /// The engine was told not to query built-in information.
    Disabled,
    /// No information source is attached to the engine.
    NoSource,
    /// The result has no compiler to query for.
    NoCompiler,
    /// The source was queried, but reported nothing.
    NoData,
    Applied,
    /// The query failed, the result is used as it is.
    Failed(InfoError),
}

/// A dialect bound to a trigger.
///
/// The engine keeps the first result it produces. Further lines are ignored
/// until the engine is reset. The state of the dialect (like the directory
/// options of gcc) is kept across resets.
pub struct Engine {
    trigger: Trigger,
    dialect: Box<dyn Dialect>,
    info: Option<Box<dyn BuiltInInfoSource>>,
    info_enabled: bool,
    result: Option<ParseResult>,
}

impl Engine {
    pub fn new(trigger: Trigger, dialect: Box<dyn Dialect>) -> Self {
        Self { trigger, dialect, info: None, info_enabled: true, result: None }
    }

    /// Attaches the source of the compiler built-in information.
    pub fn with_info_source(mut self, info: Box<dyn BuiltInInfoSource>) -> Self {
        self.info = Some(info);
        self
    }

    pub fn set_info_enabled(&mut self, enabled: bool) {
        self.info_enabled = enabled;
    }

    pub fn is_info_enabled(&self) -> bool {
        self.info_enabled
    }

    pub fn name(&self) -> &'static str {
        self.dialect.name()
    }

    /// Parses the line when the trigger accepts it.
    ///
    /// Returns whether the engine holds a result after the call. When a
    /// result is already held, the line is not looked at.
    pub fn match_line(&mut self, line: &str) -> Result<bool, ParseError> {
        if self.result.is_some() {
            return Ok(true);
        }
        if !self.trigger.is_triggered(line) {
            return Ok(false);
        }

        let mut result = self.dialect.parse(line)?;
        log::debug!("Engine {} matched line: {line}", self.name());

        match enrich(&mut result, self.info.as_deref_mut(), self.info_enabled) {
            Enrichment::Failed(error) => log::warn!("Built-in info is not available: {error}"),
            outcome => log::debug!("Built-in info enrichment: {outcome:?}"),
        }

        self.result = Some(result);
        Ok(true)
    }

    pub fn result(&self) -> Option<&ParseResult> {
        self.result.as_ref()
    }

    /// Drops the result, the engine accepts lines again.
    pub fn reset(&mut self) {
        self.result = None;
    }
}

/// Appends the built-in includes and defines of the compiler to the result.
fn enrich(
    result: &mut ParseResult,
    info: Option<&mut (dyn BuiltInInfoSource + 'static)>,
    enabled: bool,
) -> Enrichment {
    if !enabled {
        return Enrichment::Disabled;
    }
    let Some(info) = info else {
        return Enrichment::NoSource;
    };
    if !result.has_compiler() {
        return Enrichment::NoCompiler;
    }

    match info.info(&result.compiler) {
        Ok(Some(built_in)) => {
            result.includes.extend(built_in.includes);
            result.defines.extend(built_in.defines);
            Enrichment::Applied
        }
        Ok(None) => Enrichment::NoData,
        Err(error) => Enrichment::Failed(error),
    }
}
