// SPDX-License-Identifier: GPL-3.0-or-later

use crate::parser::{ParseResult, Runner};
use crate::properties::{Configuration, Content, MergeMode, Properties, PropertiesError};
use std::io::{self, BufRead};
use std::path::PathBuf;

/// A trait for consuming the recognized compiler invocation.
#[cfg_attr(test, mockall::automock)]
pub trait Consumer {
    /// Stores the result. Returns whether the stored content changed.
    fn consume(&mut self, result: &ParseResult) -> Result<bool, PropertiesError>;
}

/// Feeds the lines of a build log to the parser engines.
pub struct Scanner {
    runner: Runner,
}

impl Scanner {
    pub fn new(runner: Runner) -> Self {
        Self { runner }
    }

    /// Reads lines until one of them is recognized.
    ///
    /// Build logs are not necessarily valid UTF-8, invalid sequences are
    /// replaced instead of failing the read.
    pub fn scan(&mut self, mut reader: impl BufRead) -> io::Result<Option<&ParseResult>> {
        let mut buffer = Vec::new();
        let mut number = 0usize;

        while reader.read_until(b'\n', &mut buffer)? > 0 {
            number += 1;
            let line = String::from_utf8_lossy(&buffer);
            self.runner.parse(line.trim_end_matches(['\n', '\r']));
            buffer.clear();

            if self.runner.result().is_some() {
                log::info!("Compiler invocation found on line {number}");
                break;
            }
        }
        log::debug!("Lines scanned: {number}");

        Ok(self.runner.result())
    }
}

/// Merges the result into the properties file.
pub struct PropertiesWriter {
    path: PathBuf,
    name: String,
    mode: MergeMode,
}

impl PropertiesWriter {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, mode: MergeMode) -> Self {
        Self { path: path.into(), name: name.into(), mode }
    }
}

impl Consumer for PropertiesWriter {
    fn consume(&mut self, result: &ParseResult) -> Result<bool, PropertiesError> {
        let mut properties = Properties::default();
        properties.read(&self.path)?;

        let configuration = Configuration::from_result(self.name.as_str(), result);
        if !properties.merge(Content::new(vec![configuration]), self.mode) {
            log::info!("Properties are up to date: {}", self.path.display());
        }
        properties.write(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::reader::MockFileReader;
    use crate::parser::{Engine, GccParser, Trigger};
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn scanner() -> Scanner {
        let trigger = Trigger::from_regexes(&[r"(?:^|-)g\+\+\s+", r"\s+-c\s+"], &[r"-o\s/dev/null"]).unwrap();
        let engine = Engine::new(trigger, Box::new(GccParser::with_reader(Box::new(MockFileReader::new()))));
        Scanner::new(Runner::new(vec![engine]))
    }

    #[test]
    fn test_scan_finds_first_invocation() {
        let log = "\
make[1]: Entering directory '/build'
g++ -DFIRST -c first.cpp -o first.cpp.o\r
g++ -DSECOND -c second.cpp -o second.cpp.o
";
        let mut sut = scanner();

        let result = sut.scan(Cursor::new(log)).unwrap().cloned().unwrap();

        assert_eq!(result.defines, vec!["FIRST"]);
        assert_eq!(result.trash, vec!["-c", "first.cpp", "-o", "first.cpp.o"]);
    }

    #[test]
    fn test_scan_without_invocation() {
        let log = "g++ -o app main.o\ng++ -c probe.cpp -o /dev/null\n";
        let mut sut = scanner();

        assert!(sut.scan(Cursor::new(log)).unwrap().is_none());
    }

    #[test]
    fn test_scan_tolerates_invalid_utf8() {
        let log: &[u8] = b"\xff\xfe garbage\ng++ -DOK -c ok.cpp\n";
        let mut sut = scanner();

        let result = sut.scan(Cursor::new(log)).unwrap().cloned().unwrap();

        assert_eq!(result.defines, vec!["OK"]);
    }

    #[test]
    fn test_properties_writer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".vscode").join("c_cpp_properties.json");
        let result = ParseResult {
            compiler: "g++".to_string(),
            includes: vec!["inc".to_string()],
            ..Default::default()
        };
        let mut sut = PropertiesWriter::new(&path, "Test", MergeMode::Unique);

        assert!(sut.consume(&result).unwrap());
        assert!(!sut.consume(&result).unwrap());

        let content: Content = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let configuration = content.configuration("Test").unwrap();
        assert_eq!(configuration.compiler_path, "g++");
        assert_eq!(configuration.include_path, vec!["inc"]);
    }
}
