// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Engine, ParseResult};

/// Dispatches lines to an ordered list of engines.
///
/// The engines are tried in order, the first one which produces a result
/// wins. The result is sticky: further lines are ignored until `reset` is
/// called. This mirrors the first result rule of the engines at the list
/// level.
pub struct Runner {
    engines: Vec<Engine>,
    result: Option<usize>,
}

impl Runner {
    pub fn new(engines: Vec<Engine>) -> Self {
        Self { engines, result: None }
    }

    /// Offers the line to the engines, unless a result is already held.
    ///
    /// A failing engine does not stop the dispatch, the line is offered to
    /// the next engine.
    pub fn parse(&mut self, line: &str) {
        if self.result.is_some() {
            return;
        }

        for (index, engine) in self.engines.iter_mut().enumerate() {
            match engine.match_line(line) {
                Ok(true) => {
                    log::debug!("Line matched by engine #{index} ({})", engine.name());
                    self.result = Some(index);
                    return;
                }
                Ok(false) => {}
                Err(error) => log::warn!("Engine {} failed to parse line: {error}", engine.name()),
            }
        }
    }

    pub fn result(&self) -> Option<&ParseResult> {
        self.result.and_then(|index| self.engines.get(index)).and_then(Engine::result)
    }

    /// Resets every engine and forgets the result.
    pub fn reset(&mut self) {
        self.engines.iter_mut().for_each(Engine::reset);
        self.result = None;
    }

    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::reader::MockFileReader;
    use crate::parser::{Dialect, GccParser, ParseError, Trigger};
    use proptest::prelude::*;

    /// A dialect which records the line as its only option.
    struct Echo;

    impl Dialect for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn parse(&mut self, line: &str) -> Result<ParseResult, ParseError> {
            Ok(ParseResult { options: vec![line.to_string()], ..Default::default() })
        }
    }

    fn gcc_engine() -> Engine {
        let trigger = Trigger::from_regexes(&[r"(?:^|-)g\+\+\s+", r"\s+-c\s+"], &[r"-o\s/dev/null"]).unwrap();
        Engine::new(trigger, Box::new(GccParser::with_reader(Box::new(MockFileReader::new()))))
    }

    fn failing_gcc_engine() -> Engine {
        let mut reader = MockFileReader::new();
        reader
            .expect_read_file()
            .returning(|_| Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")));
        let trigger = Trigger::from_regexes(&[r"@"], &[]).unwrap();
        Engine::new(trigger, Box::new(GccParser::with_reader(Box::new(reader))))
    }

    fn echo_engine(pattern: &str) -> Engine {
        Engine::new(Trigger::from_regexes(&[pattern], &[]).unwrap(), Box::new(Echo))
    }

    #[test]
    fn test_matching_line() {
        let mut sut = Runner::new(vec![gcc_engine()]);

        sut.parse("g++ -DFOO=1 -Iinc -c main.cpp -o main.cpp.o -std=c++17");

        let result = sut.result().unwrap();
        assert_eq!(result.compiler, "g++");
        assert_eq!(result.defines, vec!["FOO=1"]);
        assert_eq!(result.includes, vec!["inc"]);
        assert!(result.trash.contains(&"main.cpp".to_string()));
    }

    #[test]
    fn test_line_without_compile_flag() {
        let mut sut = Runner::new(vec![gcc_engine()]);

        sut.parse("g++ main.o -o main");

        assert!(sut.result().is_none());
    }

    #[test]
    fn test_first_engine_wins() {
        let mut sut = Runner::new(vec![echo_engine("first"), echo_engine("line")]);

        sut.parse("first line");

        assert_eq!(sut.result().map(|result| result.options.clone()), Some(vec!["first line".to_string()]));
    }

    #[test]
    fn test_later_engine_gets_the_line() {
        let mut sut = Runner::new(vec![echo_engine("^never$"), echo_engine("line")]);

        sut.parse("second line");

        assert!(sut.result().is_some());
        assert!(sut.engines()[0].result().is_none());
    }

    #[test]
    fn test_result_is_sticky() {
        let mut sut = Runner::new(vec![echo_engine("line")]);

        sut.parse("first line");
        sut.parse("second line");

        assert_eq!(sut.result().map(|result| result.options.clone()), Some(vec!["first line".to_string()]));
    }

    #[test]
    fn test_failing_engine_passes_the_line_on() {
        let mut sut = Runner::new(vec![failing_gcc_engine(), echo_engine("line")]);

        sut.parse("g++ @args.txt line");

        assert_eq!(sut.result().map(|result| result.options.clone()), Some(vec!["g++ @args.txt line".to_string()]));
    }

    #[test]
    fn test_reset_clears_every_engine() {
        let mut sut = Runner::new(vec![echo_engine("line"), echo_engine("line")]);
        sut.parse("first line");

        sut.reset();

        assert!(sut.result().is_none());
        assert!(sut.engines().iter().all(|engine| engine.result().is_none()));

        sut.parse("second line");
        assert_eq!(sut.result().map(|result| result.options.clone()), Some(vec!["second line".to_string()]));
    }

    proptest! {
        #[test]
        fn reset_is_idempotent(line in "[a-z ]{0,16}", resets in 1usize..4) {
            let mut sut = Runner::new(vec![echo_engine("a"), echo_engine("b")]);
            sut.parse(&line);

            for _ in 0..resets {
                sut.reset();
            }

            prop_assert!(sut.result().is_none());
            prop_assert!(sut.engines().iter().all(|engine| engine.result().is_none()));
        }
    }
}
