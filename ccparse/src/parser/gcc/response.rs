// SPDX-License-Identifier: GPL-3.0-or-later

//! Expansion of `@file` arguments.
//!
//! The content of a response file is parsed like a command line of its
//! own, then spliced into the result of the referencing line. The
//! expansion keeps track of the files being expanded, so a file including
//! itself (directly or through others) fails instead of recursing forever.

use crate::parser::{FileReader, ParseError, ParseResult};
use std::path::PathBuf;

/// How deep response files may include each other.
pub const MAX_DEPTH: usize = 32;

pub(super) struct ResponseFiles<'a> {
    reader: &'a dyn FileReader,
    stack: Vec<PathBuf>,
}

impl<'a> ResponseFiles<'a> {
    pub(super) fn new(reader: &'a dyn FileReader) -> Self {
        Self { reader, stack: Vec::new() }
    }

    /// Reads the response file and marks it as being expanded.
    ///
    /// Every successful call must be paired with a call to `leave`.
    pub(super) fn enter(&mut self, path: &str) -> Result<String, ParseError> {
        let path = PathBuf::from(path);
        if self.stack.contains(&path) {
            return Err(ParseError::ResponseFileCycle { path });
        }
        if self.stack.len() >= MAX_DEPTH {
            return Err(ParseError::ResponseFileTooDeep { path, limit: MAX_DEPTH });
        }

        let content = self
            .reader
            .read_file(&path)
            .map_err(|source| ParseError::FileRead { path: path.clone(), source })?;
        log::debug!("Expanding response file: {} (depth {})", path.display(), self.stack.len() + 1);

        self.stack.push(path);
        Ok(content)
    }

    pub(super) fn leave(&mut self) {
        self.stack.pop();
    }
}

/// Merges the result of a response file into the result of the referencing line.
///
/// Defines and includes are appended. The options are appended to both the
/// options and the trash of the parent. The compiler and the trash of the
/// response file are not carried over.
pub(super) fn splice(nested: ParseResult, parent: &mut ParseResult) {
    parent.defines.extend(nested.defines);
    parent.includes.extend(nested.includes);
    parent.trash.extend(nested.options.iter().cloned());
    parent.options.extend(nested.options);
}
