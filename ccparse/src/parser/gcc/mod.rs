// SPDX-License-Identifier: GPL-3.0-or-later

//! Command line parser for GCC and GCC-compatible compilers.
//!
//! The arguments of the line are classified one by one with the rules of
//! the [`rules`] module. Defines, include directories and the compiler
//! executable are extracted, directory options are collected into the
//! parser state, response files are expanded in place. What remains is
//! sorted into options and trash. As a last step the C++ standard is
//! detected from the options.

mod directory;
mod response;
mod rules;

pub use directory::{DirectoryOption, DirectoryOptions};
pub use response::MAX_DEPTH as MAX_RESPONSE_FILE_DEPTH;

use super::{tokenize, CppStandard, Dialect, FileReader, FsFileReader, ParseError, ParseResult};
use regex::Regex;
use response::ResponseFiles;
use rules::Argument;
use std::iter::Peekable;
use std::sync::LazyLock;

/// Matches the language standard flags, the capture is the version number.
///
/// https://gcc.gnu.org/projects/cxx-status.html
static CPP_STANDARD_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-std=(?:c\+\+|gnu\+\+)([0-9]+)$").expect("Invalid C++ standard pattern"));

/// Parser for the GCC command line dialect.
pub struct GccParser {
    directory_options: DirectoryOptions,
    reader: Box<dyn FileReader>,
}

impl Default for GccParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GccParser {
    /// Creates a parser which reads response files from the file system.
    pub fn new() -> Self {
        Self::with_reader(Box::new(FsFileReader))
    }

    pub fn with_reader(reader: Box<dyn FileReader>) -> Self {
        Self { directory_options: DirectoryOptions::default(), reader }
    }

    /// Seeds the directory option state, e.g. with a prefix known upfront.
    pub fn with_directory_options(mut self, directory_options: DirectoryOptions) -> Self {
        self.directory_options = directory_options;
        self
    }

    /// The directory options collected so far.
    pub fn directory_options(&self) -> &DirectoryOptions {
        &self.directory_options
    }
}

impl Dialect for GccParser {
    fn name(&self) -> &'static str {
        "gcc"
    }

    fn parse(&mut self, line: &str) -> Result<ParseResult, ParseError> {
        let mut response_files = ResponseFiles::new(self.reader.as_ref());
        let mut result = parse_arguments(line, &mut self.directory_options, &mut response_files)?;
        result.cpp_standard = detect_cpp_standard(&result.options);
        Ok(result)
    }
}

/// Classifies the arguments of a line into a fresh result.
///
/// The directory options are shared with the response files expanded from
/// the line, so a prefix declared before an `@file` argument is visible in
/// the file.
fn parse_arguments(
    line: &str,
    directory_options: &mut DirectoryOptions,
    response_files: &mut ResponseFiles,
) -> Result<ParseResult, ParseError> {
    let mut result = ParseResult::default();
    let mut tokens = tokenize(line).into_iter().peekable();

    while let Some(token) = tokens.next() {
        let argument = rules::unwrap_quoted(&token);

        match rules::classify(&argument) {
            Argument::Define(value) => result.defines.push(value.to_string()),
            Argument::Include(value) => result.includes.push(value.to_string()),
            Argument::Compiler => {
                if result.compiler.is_empty() {
                    result.compiler = argument.to_string();
                } else {
                    log::debug!("Compiler already found, ignoring: {argument}");
                }
            }
            Argument::Directory(option, path) => match path_or_next(path, &mut tokens) {
                Some(path) => apply_directory_option(option, path, directory_options, &mut result),
                None => sort_out(&argument, &mut result),
            },
            Argument::ResponseFile(path) => {
                let nested = expand_response_file(path, directory_options, response_files)?;
                response::splice(nested, &mut result);
                // The reference itself is sorted out like any other argument.
                sort_out(&argument, &mut result);
            }
            Argument::Trash | Argument::Residual => result.trash.push(argument.to_string()),
            Argument::Option => result.options.push(argument.to_string()),
        }
    }

    Ok(result)
}

fn expand_response_file(
    path: &str,
    directory_options: &mut DirectoryOptions,
    response_files: &mut ResponseFiles,
) -> Result<ParseResult, ParseError> {
    let content = response_files.enter(path)?;
    let nested = parse_arguments(&content, directory_options, response_files);
    response_files.leave();
    nested
}

/// Returns the glued path, or takes the next argument when there is none.
///
/// A flag is never taken as the path, it is classified on its own.
fn path_or_next<I>(path: &str, tokens: &mut Peekable<I>) -> Option<String>
where
    I: Iterator<Item = String>,
{
    if !path.is_empty() {
        return Some(path.to_string());
    }
    tokens
        .next_if(|next| !rules::unwrap_quoted(next).starts_with('-'))
        .map(|next| rules::unwrap_quoted(&next).into_owned())
}

fn apply_directory_option(
    option: DirectoryOption,
    path: String,
    directory_options: &mut DirectoryOptions,
    result: &mut ParseResult,
) {
    if !option.uses_prefix() {
        directory_options.push(option, path);
        return;
    }
    match directory_options.prefix() {
        Some(prefix) => result.includes.push(format!("{prefix}{path}")),
        None => log::debug!("No prefix declared before {option}, dropping: {path}"),
    }
}

/// Puts an argument into the options or the trash.
fn sort_out(argument: &str, result: &mut ParseResult) {
    match rules::filter(argument) {
        Argument::Option => result.options.push(argument.to_string()),
        _ => result.trash.push(argument.to_string()),
    }
}

/// The standard of the first `-std=c++NN` or `-std=gnu++NN` option with a known version.
fn detect_cpp_standard(options: &[String]) -> CppStandard {
    options
        .iter()
        .filter_map(|option| CPP_STANDARD_OPTION.captures(option))
        .find_map(|captures| CppStandard::from_version(&captures[1]))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::reader::MockFileReader;
    use std::io;

    fn parse(line: &str) -> ParseResult {
        GccParser::with_reader(Box::new(MockFileReader::new())).parse(line).unwrap()
    }

    fn parser_with_files(files: &'static [(&'static str, &'static str)]) -> GccParser {
        let mut reader = MockFileReader::new();
        reader.expect_read_file().returning(move |path| {
            files
                .iter()
                .find(|(name, _)| path.to_str() == Some(*name))
                .map(|(_, content)| content.to_string())
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        });
        GccParser::with_reader(Box::new(reader))
    }

    #[test]
    fn test_simple_compilation() {
        let result = parse("g++ -DFOO=1 -Iinc -c main.cpp -o main.cpp.o -std=c++17");

        assert_eq!(result.compiler, "g++");
        assert_eq!(result.defines, vec!["FOO=1"]);
        assert_eq!(result.includes, vec!["inc"]);
        assert_eq!(result.options, vec!["-std=c++17"]);
        assert_eq!(result.trash, vec!["-c", "main.cpp", "-o", "main.cpp.o"]);
        assert_eq!(result.cpp_standard, CppStandard::Cpp17);
    }

    #[test]
    fn test_arduino_avr_compilation() {
        let line = concat!(
            r#""/opt/arduino/hardware/tools/avr/bin/avr-g++" -c -g -Os -w -std=gnu++11 -fpermissive "#,
            r#"-fno-exceptions -Wno-error=narrowing -MMD -flto -mmcu=atmega328p -DF_CPU=16000000L "#,
            r#"-DARDUINO=10813 -DARDUINO_AVR_UNO "-I/opt/arduino/hardware/arduino/avr/cores/arduino" "#,
            r#""-I/opt/arduino/hardware/arduino/avr/variants/standard" "/tmp/build/sketch/sketch.ino.cpp" "#,
            r#"-o "/tmp/build/sketch/sketch.ino.cpp.o""#,
        );

        let result = parse(line);

        assert_eq!(result.compiler, "/opt/arduino/hardware/tools/avr/bin/avr-g++");
        assert_eq!(result.defines, vec!["F_CPU=16000000L", "ARDUINO=10813", "ARDUINO_AVR_UNO"]);
        assert_eq!(
            result.includes,
            vec![
                "/opt/arduino/hardware/arduino/avr/cores/arduino",
                "/opt/arduino/hardware/arduino/avr/variants/standard",
            ]
        );
        assert_eq!(
            result.options,
            vec![
                "-w",
                "-std=gnu++11",
                "-fpermissive",
                "-fno-exceptions",
                "-Wno-error=narrowing",
                "-MMD",
                "-flto",
                "-mmcu=atmega328p",
            ]
        );
        assert_eq!(
            result.trash,
            vec![
                "-c",
                "-g",
                "-Os",
                "/tmp/build/sketch/sketch.ino.cpp",
                "-o",
                "/tmp/build/sketch/sketch.ino.cpp.o",
            ]
        );
        assert_eq!(result.cpp_standard, CppStandard::Cpp11);
    }

    #[test]
    fn test_quoted_macro_values() {
        let line = r#"xtensa-esp32-elf-g++ "-DMBEDTLS_CONFIG_FILE=\"mbedtls/esp_config.h\"" '"-DARDUINO_BOARD=\"ESP32_DEV\""' -c x.cpp"#;

        let result = parse(line);

        assert_eq!(result.compiler, "xtensa-esp32-elf-g++");
        assert_eq!(
            result.defines,
            vec![r#"MBEDTLS_CONFIG_FILE="mbedtls/esp_config.h""#, r#"ARDUINO_BOARD="ESP32_DEV""#]
        );
    }

    #[test]
    fn test_first_compiler_wins() {
        let result = parse("g++ -c x.cpp /usr/bin/g++");

        assert_eq!(result.compiler, "g++");
        assert_eq!(result.trash, vec!["-c", "x.cpp"]);
        assert!(result.options.is_empty());
    }

    #[test]
    fn test_bare_define_is_an_option() {
        let result = parse("g++ -D FOO -c a.cpp");

        assert!(result.defines.is_empty());
        assert_eq!(result.options, vec!["-D"]);
        assert_eq!(result.trash, vec!["FOO", "-c", "a.cpp"]);
    }

    #[test]
    fn test_bare_include_does_not_take_the_next_flag() {
        let result = parse("g++ -I -c a.cpp -std=c++17");

        assert!(result.includes.is_empty());
        assert_eq!(result.options, vec!["-I", "-std=c++17"]);
        assert_eq!(result.trash, vec!["-c", "a.cpp"]);
        assert_eq!(result.cpp_standard, CppStandard::Cpp17);
    }

    #[test]
    fn test_dangling_flag_is_an_option() {
        let result = parse("g++ -c a.cpp -I");

        assert!(result.includes.is_empty());
        assert_eq!(result.options, vec!["-I"]);
    }

    #[test]
    fn test_prefix_before_use() {
        let mut sut = GccParser::with_reader(Box::new(MockFileReader::new()));

        let result = sut.parse("g++ -iprefix /a/ -iwithprefix b/ -c x.cpp").unwrap();

        assert_eq!(result.includes, vec!["/a/b/"]);
        assert_eq!(sut.directory_options().get(DirectoryOption::Prefix), ["/a/"]);
    }

    #[test]
    fn test_prefix_after_use_is_ignored() {
        let mut sut = GccParser::with_reader(Box::new(MockFileReader::new()));

        let result = sut.parse("g++ -iwithprefix b/ -iprefix /a/ -c x.cpp").unwrap();

        assert!(result.includes.is_empty());
        assert!(sut.directory_options().get(DirectoryOption::WithPrefix).is_empty());
        assert_eq!(result.trash, vec!["-c", "x.cpp"]);
    }

    #[test]
    fn test_prefix_survives_between_lines() {
        let mut sut = GccParser::with_reader(Box::new(MockFileReader::new()));

        sut.parse("g++ -iprefix/sdk/ -c a.cpp").unwrap();
        let result = sut.parse("g++ -iwithprefixbefore include -c b.cpp").unwrap();

        assert_eq!(result.includes, vec!["/sdk/include"]);
    }

    #[test]
    fn test_seeded_prefix() {
        let mut options = DirectoryOptions::default();
        options.push(DirectoryOption::Prefix, "/opt/sdk/");
        let mut sut = GccParser::with_reader(Box::new(MockFileReader::new())).with_directory_options(options);

        let result = sut.parse("g++ -iwithprefix lib/include -c a.cpp").unwrap();

        assert_eq!(result.includes, vec!["/opt/sdk/lib/include"]);
    }

    #[test]
    fn test_other_directory_options_are_collected() {
        let mut sut = GccParser::with_reader(Box::new(MockFileReader::new()));

        let result = sut.parse("g++ -isystem /usr/local/include -isystem/opt/inc -iquote q -c a.cpp").unwrap();

        assert!(result.includes.is_empty());
        assert_eq!(sut.directory_options().get(DirectoryOption::System), ["/usr/local/include", "/opt/inc"]);
        assert_eq!(sut.directory_options().get(DirectoryOption::Quote), ["q"]);
        assert_eq!(result.trash, vec!["-c", "a.cpp"]);
    }

    #[test]
    fn test_directory_option_does_not_take_the_next_flag() {
        let mut sut = GccParser::with_reader(Box::new(MockFileReader::new()));

        let result = sut.parse("g++ -isystem -c a.cpp").unwrap();

        assert!(sut.directory_options().get(DirectoryOption::System).is_empty());
        assert_eq!(result.options, vec!["-isystem"]);
        assert_eq!(result.trash, vec!["-c", "a.cpp"]);
    }

    #[test]
    fn test_directory_path_ending_with_compiler_name() {
        let mut sut = GccParser::with_reader(Box::new(MockFileReader::new()));

        let result = sut.parse("/usr/bin/g++ -isystem/opt/bin/g++ -c a.cpp").unwrap();

        assert_eq!(result.compiler, "/usr/bin/g++");
        assert_eq!(sut.directory_options().get(DirectoryOption::System), ["/opt/bin/g++"]);
    }

    #[test]
    fn test_response_file_expansion() {
        let mut sut = parser_with_files(&[("args.txt", "-DBAR -Iextra")]);

        let result = sut.parse("g++ -DFOO @args.txt -c main.cpp").unwrap();

        assert_eq!(result.defines, vec!["FOO", "BAR"]);
        assert_eq!(result.includes, vec!["extra"]);
        assert!(result.options.is_empty());
        assert_eq!(result.trash, vec!["@args.txt", "-c", "main.cpp"]);
    }

    #[test]
    fn test_response_file_options_go_to_options_and_trash() {
        let mut sut = parser_with_files(&[("args.txt", "-DBAR -Wall -Iextra")]);

        let result = sut.parse("g++ -DFOO @args.txt -c main.cpp").unwrap();

        assert_eq!(result.options, vec!["-Wall"]);
        assert_eq!(result.trash, vec!["-Wall", "@args.txt", "-c", "main.cpp"]);
    }

    #[test]
    fn test_response_file_sees_declared_prefix() {
        let mut sut = parser_with_files(&[("args.txt", "-iwithprefix inc")]);

        let result = sut.parse("g++ -iprefix/sdk/ @args.txt -c main.cpp").unwrap();

        assert_eq!(result.includes, vec!["/sdk/inc"]);
    }

    #[test]
    fn test_nested_response_files() {
        let mut sut = parser_with_files(&[("outer.txt", "@inner.txt -DONE"), ("inner.txt", "-DTWO")]);

        let result = sut.parse("g++ @outer.txt -c main.cpp").unwrap();

        assert_eq!(result.defines, vec!["TWO", "ONE"]);
    }

    #[test]
    fn test_missing_response_file_fails() {
        let mut sut = parser_with_files(&[]);

        let result = sut.parse("g++ -DFOO @missing.txt -c main.cpp");

        assert!(matches!(result, Err(ParseError::FileRead { .. })));
    }

    #[test]
    fn test_self_including_response_file_fails() {
        let mut sut = parser_with_files(&[("loop.txt", "-DX @loop.txt")]);

        let result = sut.parse("g++ @loop.txt -c main.cpp");

        assert!(matches!(result, Err(ParseError::ResponseFileCycle { .. })));
    }

    #[test]
    fn test_standard_detection() {
        let options = |list: &[&str]| list.iter().map(|option| option.to_string()).collect::<Vec<_>>();

        assert_eq!(detect_cpp_standard(&options(&["-std=c++17"])), CppStandard::Cpp17);
        assert_eq!(detect_cpp_standard(&options(&["-std=gnu++20"])), CppStandard::Cpp20);
        assert_eq!(detect_cpp_standard(&options(&["-Wall"])), CppStandard::None);
        assert_eq!(detect_cpp_standard(&options(&["-std=gnu11"])), CppStandard::None);
        assert_eq!(detect_cpp_standard(&options(&["-std=c++23", "-std=c++14"])), CppStandard::Cpp14);
        assert_eq!(detect_cpp_standard(&options(&["-std=c++98", "-std=c++11"])), CppStandard::Cpp98);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Command line fragments with the number of their arguments landing in a bucket.
        ///
        /// Directory options (and the paths they take) are kept in the parser
        /// state, those arguments land in no bucket.
        fn fragment() -> impl Strategy<Value = (String, usize)> {
            prop_oneof![
                "-D[A-Z_]{1,6}(=[0-9]{1,3})?".prop_map(|argument| (argument, 1)),
                "-I[a-z/]{1,8}".prop_map(|argument| (argument, 1)),
                "-[DI]".prop_map(|argument| (argument, 1)),
                "-[a-hj-zA-Z][a-z0-9=]{0,6}".prop_map(|argument| (argument, 1)),
                "[a-z]{1,6}\\.(cpp|o|c|a)".prop_map(|argument| (argument, 1)),
                "-isystem/[a-z]{1,8}".prop_map(|argument| (argument, 0)),
                "-isystem /[a-z]{1,8}".prop_map(|argument| (argument, 0)),
                "-iwithprefix [a-z]{1,8}".prop_map(|argument| (argument, 0)),
                "-iwithprefix/[a-z]{1,8}".prop_map(|argument| (argument, 0)),
                Just(("-isystem -c".to_string(), 2)),
            ]
        }

        proptest! {
            #[test]
            fn every_argument_lands_in_one_bucket(fragments in prop::collection::vec(fragment(), 0..24)) {
                let line = fragments.iter().fold("g++".to_string(), |line, (fragment, _)| line + " " + fragment);
                let expected: usize = fragments.iter().map(|(_, count)| count).sum();

                let result = parse(&line);

                prop_assert_eq!(result.compiler.as_str(), "g++");
                let classified =
                    result.includes.len() + result.defines.len() + result.options.len() + result.trash.len();
                prop_assert_eq!(classified, expected);
            }
        }
    }
}
