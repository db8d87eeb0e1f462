// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Source file decoding and output file encoding.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::core::error::{FilterError, FilterErrorKind};
use crate::core::resolver::LineSink;

const UTF8_BOM: &str = "\u{feff}";

/// Text encoding used for both input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceEncoding {
    #[default]
    #[value(name = "utf-8", alias = "utf8")]
    Utf8,
    /// Byte-transparent single-byte encoding; each byte maps to one char.
    #[value(name = "latin-1", aliases = ["latin1", "iso-8859-1", "ibm437", "cp437"])]
    Latin1,
}

impl SourceEncoding {
    pub fn decode(self, bytes: &[u8]) -> Result<String, FilterError> {
        match self {
            SourceEncoding::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(text.to_string()),
                Err(err) => {
                    let valid = &bytes[..err.valid_up_to()];
                    let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
                    Err(FilterError::new(
                        FilterErrorKind::Encoding,
                        "Input is not valid utf-8; try --encoding latin-1 for DOS code page sources",
                        Some(&format!("invalid byte on line {line}")),
                    ))
                }
            },
            SourceEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    /// Encode `text`; chars outside latin-1 become `?`.
    pub fn encode_into(self, text: &str, buf: &mut Vec<u8>) {
        match self {
            SourceEncoding::Utf8 => buf.extend_from_slice(text.as_bytes()),
            SourceEncoding::Latin1 => buf.extend(
                text.chars()
                    .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?')),
            ),
        }
    }
}

/// Line terminator written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detect from the first line of `text`.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(idx) if text[..idx].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Decoded input split into lines without terminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub lines: Vec<String>,
    pub line_ending: LineEnding,
    pub bom: bool,
}

impl SourceText {
    pub fn from_text(text: &str) -> Self {
        let (bom, text) = match text.strip_prefix(UTF8_BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let lines = text
            .split_inclusive('\n')
            .map(|line| match line.strip_suffix('\n') {
                Some(line) => line.strip_suffix('\r').unwrap_or(line).to_string(),
                None => line.to_string(),
            })
            .collect();
        Self {
            lines,
            line_ending: LineEnding::detect(text),
            bom,
        }
    }
}

pub fn read_source(path: &Path, encoding: SourceEncoding) -> Result<SourceText, FilterError> {
    let bytes = fs::read(path).map_err(|err| {
        FilterError::new(
            FilterErrorKind::Io,
            "Error opening file",
            Some(&format!("{}: {err}", path.display())),
        )
    })?;
    let text = encoding.decode(&bytes).map_err(|err| {
        FilterError::new(
            FilterErrorKind::Encoding,
            err.message(),
            Some(&path.display().to_string()),
        )
    })?;
    Ok(SourceText::from_text(&text))
}

/// Buffered output file; every written line gets the configured terminator.
///
/// Dropping the file without [`OutputFile::finish`] still flushes through
/// `BufWriter`, but write errors are then lost.
#[derive(Debug)]
pub struct OutputFile {
    writer: BufWriter<File>,
    path: PathBuf,
    encoding: SourceEncoding,
    line_ending: LineEnding,
    buf: Vec<u8>,
}

impl OutputFile {
    pub fn create(
        path: &Path,
        encoding: SourceEncoding,
        line_ending: LineEnding,
        bom: bool,
    ) -> Result<Self, FilterError> {
        let file = File::create(path).map_err(|err| {
            FilterError::new(
                FilterErrorKind::Io,
                "Error creating output file",
                Some(&format!("{}: {err}", path.display())),
            )
        })?;
        let mut output = Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            encoding,
            line_ending,
            buf: Vec::new(),
        };
        if bom && encoding == SourceEncoding::Utf8 {
            output.writer.write_all(UTF8_BOM.as_bytes()).map_err(|err| {
                FilterError::new(
                    FilterErrorKind::Io,
                    "Error writing output",
                    Some(&err.to_string()),
                )
            })?;
        }
        Ok(output)
    }

    /// Flush buffered output to disk.
    pub fn finish(mut self) -> Result<(), FilterError> {
        self.writer.flush().map_err(|err| {
            FilterError::new(
                FilterErrorKind::Io,
                "Error writing output",
                Some(&format!("{}: {err}", self.path.display())),
            )
        })
    }
}

impl LineSink for OutputFile {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.buf.clear();
        self.encoding.encode_into(line, &mut self.buf);
        self.buf
            .extend_from_slice(self.line_ending.as_str().as_bytes());
        self.writer.write_all(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_line_ending_from_first_line() {
        assert_eq!(LineEnding::detect("A\r\nB\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("A\nB\r\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("no newline"), LineEnding::Lf);
        assert_eq!(LineEnding::detect(""), LineEnding::Lf);
    }

    #[test]
    fn splits_lines_and_strips_terminators() {
        let source = SourceText::from_text("\u{feff}IFDEF A\r\nNOP\r\nENDIF");
        assert!(source.bom);
        assert_eq!(source.line_ending, LineEnding::CrLf);
        assert_eq!(source.lines, vec!["IFDEF A", "NOP", "ENDIF"]);

        let source = SourceText::from_text("");
        assert!(source.lines.is_empty());
        assert!(!source.bom);
    }

    #[test]
    fn stray_carriage_returns_stay_in_the_line() {
        let source = SourceText::from_text("DB 1\r\r\nDB 2\nEND\r");
        assert_eq!(source.line_ending, LineEnding::CrLf);
        assert_eq!(source.lines, vec!["DB 1\r", "DB 2", "END\r"]);

        let source = SourceText::from_text("A\n\nB\n");
        assert_eq!(source.lines, vec!["A", "", "B"]);
    }

    #[test]
    fn latin1_is_byte_transparent() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let text = SourceEncoding::Latin1.decode(&bytes).unwrap();
        assert_eq!(text.chars().count(), 256);
        let mut back = Vec::new();
        SourceEncoding::Latin1.encode_into(&text, &mut back);
        assert_eq!(back, bytes);

        let mut lossy = Vec::new();
        SourceEncoding::Latin1.encode_into("a\u{2500}b", &mut lossy);
        assert_eq!(lossy, b"a?b");
    }

    #[test]
    fn utf8_errors_name_the_line() {
        let err = SourceEncoding::Utf8
            .decode(b"NOP\nDB 0\n\xb0\xc4\n")
            .unwrap_err();
        assert_eq!(err.kind(), FilterErrorKind::Encoding);
        assert!(err.message().contains("--encoding latin-1"));
        assert!(err.message().ends_with("invalid byte on line 3"));
    }
}
