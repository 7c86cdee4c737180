//! Splits story scripts into `[command]text` lines and dialogue text into
//! counted tokens.
//!
//! Latin, Greek and Cyrillic runs, numbers and abbreviations are counted as
//! one token each. Everything else, most notably Han characters and
//! punctuation, is counted character by character.

use crate::{constants::ELLIPSIS_STR, types::*};
use regex::Regex;
use std::{cell::LazyCell, str::Split};

thread_local! {
    static LINE_RE: LazyCell<Regex> = LazyCell::new(|| unsafe {
        Regex::new(r"^(?:\[(.+)\])?(.+)?").unwrap_unchecked()
    });
    static MARKUP_RE: LazyCell<Regex> = LazyCell::new(|| unsafe {
        Regex::new(r"<[A-Za-z\d/=#@\.]+>|\{@[Nn]ickname\}|\\r|\\n").unwrap_unchecked()
    });
    static NUMBER_RE: LazyCell<Regex> = LazyCell::new(|| unsafe {
        Regex::new(r"^-?[\x{03B1}-\x{03C9}\d]+(?:[\.\-:：]\d+)?(?:%|℃|u/L|M)?")
            .unwrap_unchecked()
    });
    static WORD_RE: LazyCell<Regex> = LazyCell::new(|| unsafe {
        Regex::new(r"^[A-Za-z\x{03B1}-\x{03C9}\x{0400}-\x{04FF}\x{00C0}-\x{00D6}\x{00D8}-\x{00F6}\x{00F8}-\x{00FF}\d]+(?:[/—\-']?[A-Za-z\d]+)*")
            .unwrap_unchecked()
    });
}

/// Lazy iterator over the non-empty lines of a script.
pub struct ScriptLines<'a> {
    lines: Split<'a, char>,
}

impl<'a> Iterator for ScriptLines<'a> {
    type Item = ScriptLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;

            if line.is_empty() {
                continue;
            }

            let Some(captures) = LINE_RE.with(|re| re.captures(line)) else {
                continue;
            };

            let command = captures.get(1).map(|m| m.as_str().trim());
            let text = captures.get(2).map(|m| m.as_str().trim());

            if command.is_none() && text.is_none() {
                continue;
            }

            return Some(ScriptLine { command, text });
        }
    }
}

#[inline]
fn is_word_char(char: char) -> bool {
    char.is_alphanumeric() || char == '_'
}

/// `a.m.`, `PM` and the like, when not followed by a word character.
fn match_am_pm(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();

    if !matches!(bytes.first(), Some(b'A' | b'a' | b'P' | b'p')) {
        return None;
    }

    let mut end = 1;

    if bytes.get(end) == Some(&b'.') {
        end += 1;
    }

    if !matches!(bytes.get(end), Some(b'M' | b'm')) {
        return None;
    }

    end += 1;

    if rest[end..].chars().next().is_some_and(is_word_char) {
        return None;
    }

    if bytes.get(end) == Some(&b'.') {
        end += 1;
    }

    Some(end)
}

/// Runs of `X.` groups, like `Dr.` or `U.S.A`. A dot followed by another dot
/// ends the run.
fn match_abbreviation(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let letters_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_alphabetic())
            .count()
    };

    let mut end = 0;
    let mut groups = 0;

    loop {
        let dot = end + letters_from(end);

        if dot > end && bytes.get(dot) == Some(&b'.') && bytes.get(dot + 1) != Some(&b'.') {
            end = dot + 1;
            groups += 1;
        } else {
            break;
        }
    }

    if groups == 0 {
        return None;
    }

    Some(end + letters_from(end))
}

/// Length of the token starting at `rest`, trying the patterns by priority.
fn match_token(rest: &str) -> Option<usize> {
    match_am_pm(rest)
        .or_else(|| NUMBER_RE.with(|re| re.find(rest).map(|m| m.end())))
        .or_else(|| match_abbreviation(rest))
        .or_else(|| WORD_RE.with(|re| re.find(rest).map(|m| m.end())))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Tokenizer;

impl Tokenizer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Iterates the `[command]text` lines of `script`. Iterating the same
    /// script again yields the same lines.
    #[must_use]
    pub fn lines<'a>(&self, script: &'a str) -> ScriptLines<'a> {
        ScriptLines {
            lines: script.split('\n'),
        }
    }

    /// Counts the tokens of dialogue `text`.
    ///
    /// Markup is blanked out first. Every token is counted under its own
    /// text, every other character on its own, except spaces.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Counter {
        let text = MARKUP_RE.with(|re| re.replace_all(text, " ").into_owned());

        let mut counter = Counter::new();
        let mut loose = String::with_capacity(text.len());
        let mut last = 0;
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];

            if let Some(length) = match_token(rest) {
                loose.push_str(&text[last..pos]);
                counter.add(&rest[..length], 1);
                pos += length;
                last = pos;
            } else {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }

        loose.push_str(&text[last..]);

        let loose = loose
            .replace("……", ELLIPSIS_STR)
            .replace("......", ELLIPSIS_STR)
            .replace("——", "—");

        for char in loose.chars().filter(|c| *c != ' ') {
            counter.add_char(char);
        }

        counter
    }
}
