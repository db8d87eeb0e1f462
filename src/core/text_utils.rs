// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Shared text utilities for line classification.

/// Convert a string to uppercase ASCII.
#[inline]
pub fn to_upper(s: &str) -> String {
    s.to_ascii_uppercase()
}

/// Split a line into code and comment parts at the first unquoted semicolon.
pub fn split_comment(line: &str) -> (&str, &str) {
    let bytes = line.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    let mut idx = 0usize;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\'' if !in_double => {
                in_single = !in_single;
            }
            b'"' if !in_single => {
                in_double = !in_double;
            }
            b';' if !in_single && !in_double => {
                return (&line[..idx], &line[idx..]);
            }
            _ => {}
        }
        idx += 1;
    }
    (line, "")
}

/// A whitespace-delimited word and its byte offset in the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub offset: usize,
}

impl Word<'_> {
    /// One-based column of the word's first byte.
    pub fn column(&self) -> usize {
        self.offset + 1
    }
}

/// A simple cursor for scanning text word-by-word.
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of the input.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Skip whitespace characters.
    pub fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Check whether only whitespace remains.
    pub fn at_end(&self) -> bool {
        self.input[self.pos..].trim_start().is_empty()
    }

    /// Consume the next run of non-whitespace characters.
    pub fn take_word(&mut self) -> Option<Word<'a>> {
        self.skip_ws();
        let rest = &self.input[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = Word {
            text: &rest[..len],
            offset: self.pos,
        };
        self.pos += len;
        Some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_comment() {
        assert_eq!(split_comment("code ; comment"), ("code ", "; comment"));
        assert_eq!(split_comment("no comment"), ("no comment", ""));
        assert_eq!(
            split_comment("\"str;ing\" ; comment"),
            ("\"str;ing\" ", "; comment")
        );
        assert_eq!(
            split_comment("'c;har' ; comment"),
            ("'c;har' ", "; comment")
        );
        assert_eq!(split_comment("IFDEF FOO;why"), ("IFDEF FOO", ";why"));
    }

    #[test]
    fn test_cursor_take_word() {
        let mut cursor = Cursor::new("  foo:\tIFDEF  bar ");
        assert_eq!(
            cursor.take_word(),
            Some(Word {
                text: "foo:",
                offset: 2
            })
        );
        let directive = cursor.take_word().unwrap();
        assert_eq!(directive.text, "IFDEF");
        assert_eq!(directive.column(), 8);
        assert!(!cursor.at_end());
        assert_eq!(cursor.take_word().map(|w| w.text), Some("bar"));
        assert!(cursor.at_end());
        assert_eq!(cursor.take_word(), None);
    }

    #[test]
    fn test_to_upper() {
        assert_eq!(to_upper("DosVer_3"), "DOSVER_3");
    }
}
