// SPDX-License-Identifier: GPL-3.0-or-later

use std::io;
use std::path::Path;

/// Reads the content of files referenced from a command line.
///
/// Response file expansion goes through this seam, so the parsing engine
/// can be used against an in-memory file system as well.
#[cfg_attr(test, mockall::automock)]
pub trait FileReader {
    fn read_file(&self, path: &Path) -> io::Result<String>;
}

/// Reads files from the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileReader;

impl FileReader for FsFileReader {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
