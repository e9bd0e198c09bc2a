// SPDX-License-Identifier: GPL-3.0-or-later

//! Shell-like splitting of a raw command line into arguments.

/// Splits the line the way a POSIX shell splits words, with quote removal.
///
/// Empty arguments are dropped. Unterminated quotes do not fail the split:
/// the quote is closed at the end of the line, so the remaining text ends
/// up in one argument. When that does not help either, the line is split
/// on whitespace.
pub fn tokenize(line: &str) -> Vec<String> {
    let words = match shell_words::split(line) {
        Ok(words) => words,
        Err(error) => {
            log::debug!("Best-effort split of line with {error}: {line}");
            best_effort_split(line)
        }
    };
    words.into_iter().filter(|word| !word.is_empty()).collect()
}

fn best_effort_split(line: &str) -> Vec<String> {
    ["\"", "'", "\\\"\""]
        .iter()
        .find_map(|closing| shell_words::split(&format!("{line}{closing}")).ok())
        .unwrap_or_else(|| line.split_whitespace().map(String::from).collect())
}
