// SPDX-License-Identifier: GPL-3.0-or-later

//! The ordered argument classification table of the GCC dialect.
//!
//! The rules are split in two groups. The directives extract something
//! (defines, includes, the compiler, directory options, response files),
//! the filters sort the rest into options and trash. The first matching
//! rule wins; an argument matching no rule is residual.

use super::directory::DirectoryOption;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// The outcome of classifying one argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Argument<'a> {
    /// `-D<value>`, the value is never empty.
    Define(&'a str),
    /// `-I<value>`, the value is never empty.
    Include(&'a str),
    /// The compiler executable itself.
    Compiler,
    /// `-i<keyword><path>`; an empty path means the path is the next argument.
    Directory(DirectoryOption, &'a str),
    /// `@<path>`
    ResponseFile(&'a str),
    /// Output, optimization, debug and compile-only flags, source and object files.
    Trash,
    /// Any other flag.
    Option,
    /// Anything else.
    Residual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RuleKind {
    Define,
    Include,
    Compiler,
    Directory,
    ResponseFile,
    Trash,
    Option,
}

/// A classification rule: a pattern and what a match of it means.
struct ArgumentRule {
    pattern: Regex,
    kind: RuleKind,
}

impl ArgumentRule {
    fn new(pattern: &str, kind: RuleKind) -> Self {
        let pattern = Regex::new(pattern).expect("Invalid GCC argument pattern");
        Self { pattern, kind }
    }

    fn apply<'a>(&self, argument: &'a str) -> Option<Argument<'a>> {
        let captures = self.pattern.captures(argument)?;

        let result = match self.kind {
            RuleKind::Define => Argument::Define(group(&captures, 1)),
            RuleKind::Include => Argument::Include(group(&captures, 1)),
            RuleKind::Compiler => Argument::Compiler,
            RuleKind::Directory => {
                let option = DirectoryOption::from_keyword(group(&captures, 1))?;
                Argument::Directory(option, group(&captures, 2))
            }
            RuleKind::ResponseFile => Argument::ResponseFile(group(&captures, 1)),
            RuleKind::Trash => Argument::Trash,
            RuleKind::Option => Argument::Option,
        };
        Some(result)
    }
}

fn group<'a>(captures: &Captures<'a>, index: usize) -> &'a str {
    captures.get(index).map_or("", |m| m.as_str())
}

static DIRECTIVES: LazyLock<Vec<ArgumentRule>> = LazyLock::new(|| {
    // Longer keywords first, so "withprefixbefore" is not read as "withprefix".
    let mut keywords: Vec<&str> = DirectoryOption::ALL.iter().map(DirectoryOption::keyword).collect();
    keywords.sort_by_key(|keyword| std::cmp::Reverse(keyword.len()));

    vec![
        ArgumentRule::new(r"^-D(.+)$", RuleKind::Define),
        ArgumentRule::new(r"^-I(.+)$", RuleKind::Include),
        // A flag never names the compiler, even when its value ends with one.
        ArgumentRule::new(r"^(?:[^-@].*[-/\\]|[/\\])?g\+\+(?:\.exe)?$", RuleKind::Compiler),
        ArgumentRule::new(&format!(r"^-i({})\s?(.*)$", keywords.join("|")), RuleKind::Directory),
        ArgumentRule::new(r"^@\s?(.+)$", RuleKind::ResponseFile),
    ]
});

static FILTERS: LazyLock<Vec<ArgumentRule>> = LazyLock::new(|| {
    vec![
        ArgumentRule::new(r"^-o|^-O|^-g|^-c|cpp(?:\.o)?$", RuleKind::Trash),
        ArgumentRule::new(r"^-", RuleKind::Option),
    ]
});

fn first_match<'a>(rules: &[ArgumentRule], argument: &'a str) -> Option<Argument<'a>> {
    rules.iter().find_map(|rule| rule.apply(argument))
}

/// Classifies an argument against the full rule table.
pub(super) fn classify(argument: &str) -> Argument<'_> {
    first_match(&DIRECTIVES, argument).unwrap_or_else(|| filter(argument))
}

/// Classifies an argument against the filter rules only.
pub(super) fn filter(argument: &str) -> Argument<'_> {
    first_match(&FILTERS, argument).unwrap_or(Argument::Residual)
}

/// Unpacks arguments wrapped in double quotes, like `"-DNAME=\"value\""`.
///
/// The escaped quotes inside are reverted.
pub(super) fn unwrap_quoted(argument: &str) -> Cow<'_, str> {
    match argument.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) if !inner.is_empty() => Cow::Owned(inner.replace("\\\"", "\"")),
        _ => Cow::Borrowed(argument),
    }
}
