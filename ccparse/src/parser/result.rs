// SPDX-License-Identifier: GPL-3.0-or-later

//! The value object produced by a successful parse.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The C++ language standard detected from the compiler flags.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum CppStandard {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "c++98")]
    Cpp98,
    #[serde(rename = "c++11")]
    Cpp11,
    #[serde(rename = "c++14")]
    Cpp14,
    #[serde(rename = "c++17")]
    Cpp17,
    #[serde(rename = "c++20")]
    Cpp20,
}

impl CppStandard {
    /// Maps the numeric suffix of a `-std=` flag to the standard.
    pub fn from_version(version: &str) -> Option<Self> {
        match version {
            "98" => Some(CppStandard::Cpp98),
            "11" => Some(CppStandard::Cpp11),
            "14" => Some(CppStandard::Cpp14),
            "17" => Some(CppStandard::Cpp17),
            "20" => Some(CppStandard::Cpp20),
            _ => None,
        }
    }

    /// The name used in the IDE configuration file (empty for none).
    pub fn as_str(&self) -> &'static str {
        match self {
            CppStandard::None => "",
            CppStandard::Cpp98 => "c++98",
            CppStandard::Cpp11 => "c++11",
            CppStandard::Cpp14 => "c++14",
            CppStandard::Cpp17 => "c++17",
            CppStandard::Cpp20 => "c++20",
        }
    }
}

impl fmt::Display for CppStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CppStandard::None => write!(f, "none"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Classified content of a compiler command line.
///
/// Every token of the command line lands in exactly one of the buckets
/// (`compiler`, `includes`, `defines`, `options`, `trash`). The only
/// exception are the options of an expanded response file, which are
/// appended to both `options` and `trash`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// The compiler executable, empty when not detected.
    pub compiler: String,
    /// Include directories in discovery order.
    pub includes: Vec<String>,
    /// Preprocessor defines in discovery order (`NAME` or `NAME=VALUE`).
    pub defines: Vec<String>,
    /// Flags which were recognized but not classified further.
    pub options: Vec<String>,
    /// Tokens filtered out as noise.
    pub trash: Vec<String>,
    pub cpp_standard: CppStandard,
}

impl ParseResult {
    pub fn has_compiler(&self) -> bool {
        !self.compiler.is_empty()
    }
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compiler: {:?}, includes: {}, defines: {}, options: {}, trash: {}, standard: {}",
            self.compiler,
            self.includes.len(),
            self.defines.len(),
            self.options.len(),
            self.trash.len(),
            self.cpp_standard
        )
    }
}
