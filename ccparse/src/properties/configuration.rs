// SPDX-License-Identifier: GPL-3.0-or-later

//! One entry of the `configurations` list of the properties file.
//!
//! The field names are given by the consuming IDE extension, see
//! <https://code.visualstudio.com/docs/cpp/c-cpp-properties-schema-reference>

use crate::parser::ParseResult;
use serde::{Deserialize, Serialize};

/// IntelliSense mode written for results of the gcc dialect.
pub const GCC_INTELLISENSE_MODE: &str = "gcc-x64";

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub name: String,
    pub compiler_path: String,
    pub compiler_args: Vec<String>,
    pub intelli_sense_mode: String,
    pub include_path: Vec<String>,
    pub forced_include: Vec<String>,
    pub c_standard: String,
    pub cpp_standard: String,
    pub defines: Vec<String>,
}

impl Configuration {
    /// Creates a named configuration from the parsed compiler invocation.
    pub fn from_result(name: impl Into<String>, result: &ParseResult) -> Self {
        Self {
            name: name.into(),
            compiler_path: result.compiler.clone(),
            compiler_args: result.options.clone(),
            intelli_sense_mode: GCC_INTELLISENSE_MODE.to_string(),
            include_path: result.includes.clone(),
            forced_include: Vec::new(),
            c_standard: String::new(),
            cpp_standard: result.cpp_standard.as_str().to_string(),
            defines: result.defines.clone(),
        }
    }

    /// Replaces the scalar fields with the non-empty ones of the other.
    pub(super) fn update_scalars(&mut self, other: &Configuration) {
        let scalars = [
            (&mut self.compiler_path, &other.compiler_path),
            (&mut self.intelli_sense_mode, &other.intelli_sense_mode),
            (&mut self.c_standard, &other.c_standard),
            (&mut self.cpp_standard, &other.cpp_standard),
        ];
        for (current, incoming) in scalars {
            if !incoming.is_empty() {
                current.clone_from(incoming);
            }
        }
    }

    /// The list fields paired with the same fields of the other.
    pub(super) fn lists_mut<'a>(
        &'a mut self,
        other: &'a Configuration,
    ) -> [(&'a mut Vec<String>, &'a Vec<String>); 4] {
        [
            (&mut self.compiler_args, &other.compiler_args),
            (&mut self.include_path, &other.include_path),
            (&mut self.forced_include, &other.forced_include),
            (&mut self.defines, &other.defines),
        ]
    }
}
