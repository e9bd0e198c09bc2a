// SPDX-License-Identifier: GPL-3.0-or-later

//! Built-in information of GCC compatible compilers.
//!
//! The compiler is asked to preprocess an empty C++ input in verbose mode
//! while dumping the macro definitions:
//!
//! ```text
//! g++ -xc++ -E -v -dM - < /dev/null
//! ```
//!
//! The predefined macros are printed to the standard output as `#define`
//! directives, the include search list goes to the standard error.

use super::{BuiltInInfo, BuiltInInfoSource, InfoError};
use std::collections::HashMap;
use std::process::{Command, Stdio};

const PROBE_ARGUMENTS: [&str; 5] = ["-xc++", "-E", "-v", "-dM", "-"];

const QUOTE_SEARCH_START: &str = "#include \"...\" search starts here:";
const ANGLE_SEARCH_START: &str = "#include <...> search starts here:";
const SEARCH_END: &str = "End of search list.";
const FRAMEWORK_SUFFIX: &str = " (framework directory)";

/// The captured output of a compiler probe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs the compiler with the probe arguments.
#[cfg_attr(test, mockall::automock)]
pub trait CompilerProbe {
    fn probe(&self, compiler: &str) -> Result<ProbeOutput, InfoError>;
}

/// Probes the compiler by executing it as a child process.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandProbe;

impl CompilerProbe for CommandProbe {
    fn probe(&self, compiler: &str) -> Result<ProbeOutput, InfoError> {
        let executable =
            which::which(compiler).map_err(|_| InfoError::NotFound { compiler: compiler.to_string() })?;
        log::debug!("Probing compiler: {}", executable.display());

        let output = Command::new(&executable)
            .args(PROBE_ARGUMENTS)
            .stdin(Stdio::null())
            .output()
            .map_err(|error| InfoError::Execution { compiler: compiler.to_string(), reason: error.to_string() })?;

        if !output.status.success() {
            return Err(InfoError::Status { compiler: compiler.to_string(), code: output.status.code() });
        }

        Ok(ProbeOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Built-in information source for the gcc dialect.
///
/// Executing the compiler is expensive compared to parsing a line, so the
/// answers are cached per compiler string. Failures are cached too; a
/// missing compiler won't appear during the lifetime of the source.
pub struct GccInfoSource<P: CompilerProbe> {
    probe: P,
    cache: HashMap<String, Result<Option<BuiltInInfo>, InfoError>>,
}

impl Default for GccInfoSource<CommandProbe> {
    fn default() -> Self {
        Self::new(CommandProbe)
    }
}

impl<P: CompilerProbe> GccInfoSource<P> {
    pub fn new(probe: P) -> Self {
        Self { probe, cache: HashMap::new() }
    }
}

impl<P: CompilerProbe> BuiltInInfoSource for GccInfoSource<P> {
    fn info(&mut self, compiler: &str) -> Result<Option<BuiltInInfo>, InfoError> {
        if let Some(cached) = self.cache.get(compiler) {
            log::trace!("Built-in info of {compiler} served from cache");
            return cached.clone();
        }

        let answer = self
            .probe
            .probe(compiler)
            .map(|output| parse_probe_output(&output.stdout, &output.stderr))
            .map(|info| Some(info).filter(|info| !info.is_empty()));
        self.cache.insert(compiler.to_string(), answer.clone());
        answer
    }
}

/// Extracts the defines and the include search list from the probe output.
pub fn parse_probe_output(stdout: &str, stderr: &str) -> BuiltInInfo {
    BuiltInInfo { includes: parse_search_list(stderr), defines: parse_defines(stdout) }
}

fn parse_defines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.strip_prefix("#define "))
        .filter_map(|definition| {
            let definition = definition.trim();
            match definition.split_once(' ') {
                Some((name, value)) => Some(format!("{name}={}", value.trim_start())),
                None if !definition.is_empty() => Some(definition.to_string()),
                None => None,
            }
        })
        .collect()
}

fn parse_search_list(stderr: &str) -> Vec<String> {
    let mut includes = Vec::new();
    let mut in_search_list = false;

    for line in stderr.lines() {
        let line = line.trim();
        match line {
            QUOTE_SEARCH_START | ANGLE_SEARCH_START => in_search_list = true,
            SEARCH_END => in_search_list = false,
            _ if in_search_list && !line.is_empty() => {
                let path = line.strip_suffix(FRAMEWORK_SUFFIX).unwrap_or(line);
                includes.push(path.to_string());
            }
            _ => {}
        }
    }
    includes
}
