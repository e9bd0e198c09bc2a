// SPDX-License-Identifier: GPL-3.0-or-later

//! GCC directory options (`-iprefix`, `-isystem`, ...).
//!
//! https://gcc.gnu.org/onlinedocs/gcc/Directory-Options.html

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The keyword following `-i` of a directory option.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryOption {
    Prefix,
    WithPrefix,
    WithPrefixBefore,
    Sysroot,
    Multilib,
    PluginDir,
    Quote,
    System,
    DirAfter,
}

impl DirectoryOption {
    pub const ALL: [DirectoryOption; 9] = [
        DirectoryOption::Prefix,
        DirectoryOption::WithPrefix,
        DirectoryOption::WithPrefixBefore,
        DirectoryOption::Sysroot,
        DirectoryOption::Multilib,
        DirectoryOption::PluginDir,
        DirectoryOption::Quote,
        DirectoryOption::System,
        DirectoryOption::DirAfter,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            DirectoryOption::Prefix => "prefix",
            DirectoryOption::WithPrefix => "withprefix",
            DirectoryOption::WithPrefixBefore => "withprefixbefore",
            DirectoryOption::Sysroot => "sysroot",
            DirectoryOption::Multilib => "multilib",
            DirectoryOption::PluginDir => "plugindir",
            DirectoryOption::Quote => "quote",
            DirectoryOption::System => "system",
            DirectoryOption::DirAfter => "dirafter",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.keyword() == keyword)
    }

    /// The options which are resolved against a previously declared prefix.
    pub fn uses_prefix(&self) -> bool {
        matches!(self, DirectoryOption::WithPrefix | DirectoryOption::WithPrefixBefore)
    }
}

impl fmt::Display for DirectoryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-i{}", self.keyword())
    }
}

/// Directory option values collected over the lifetime of an engine.
///
/// The values are kept in declaration order per option. The state is not
/// cleared between lines, because a `-iprefix` seen on one invocation
/// applies to the later ones too.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryOptions {
    entries: BTreeMap<DirectoryOption, Vec<String>>,
}

impl DirectoryOptions {
    pub fn get(&self, option: DirectoryOption) -> &[String] {
        self.entries.get(&option).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn push(&mut self, option: DirectoryOption, path: impl Into<String>) {
        self.entries.entry(option).or_default().push(path.into());
    }

    /// The first declared prefix, when it is not empty.
    pub fn prefix(&self) -> Option<&str> {
        self.get(DirectoryOption::Prefix).first().map(String::as_str).filter(|prefix| !prefix.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}

impl From<BTreeMap<DirectoryOption, Vec<String>>> for DirectoryOptions {
    fn from(entries: BTreeMap<DirectoryOption, Vec<String>>) -> Self {
        Self { entries }
    }
}
