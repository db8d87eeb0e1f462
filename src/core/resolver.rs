// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Block resolver for IFDEF/IFNDEF/ELSEIFDEF/ELSEIFNDEF/ELSE/ENDIF filtering.
//!
//! Lines are fed one at a time. Every open conditional block is a frame on
//! an explicit stack; the mode of the innermost frame decides what happens
//! to the next line:
//!
//! - no frame (top level), [`BlockMode::Included`] and
//!   [`BlockMode::Passthrough`] emit content lines and resolve nested
//!   directives;
//! - [`BlockMode::Excluded`] and [`BlockMode::Exhausted`] drop lines and only
//!   track nested `IF...`/`ENDIF` pairs until a branch or the closing `ENDIF`
//!   is reached.

use std::io;

use crate::core::classify::{classify, scan_for_definition, Directive, LineClass};
use crate::core::error::{FilterError, FilterErrorKind, FilterStats};
use crate::core::events::{BlockKind, EventSink, FilterEvent};
use crate::core::symbols::{DefinitionScan, FilterSymbols, Resolution, Symbol};

/// Destination for emitted lines.
pub trait LineSink {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

impl LineSink for Vec<String> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

impl<T: LineSink + ?Sized> LineSink for &mut T {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}

/// Why the resolver is inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// Condition true: emit content, drop the block's own directives.
    Included,
    /// Condition false: drop lines until a branch that resolves true.
    Excluded,
    /// Included branch already ended: drop lines until `ENDIF`.
    Exhausted,
    /// Preserved or unrelated block: copy every line, directives included.
    Passthrough,
}

impl BlockMode {
    fn suppressing(self) -> bool {
        matches!(self, BlockMode::Excluded | BlockMode::Exhausted)
    }
}

#[derive(Debug, Clone)]
struct BlockFrame {
    mode: BlockMode,
    opened_at: u32,
    opener: String,
    directive: String,
    /// Blocks opened inside a suppressed region, innermost last.
    skipped: Vec<SkippedBlock>,
}

#[derive(Debug, Clone)]
struct SkippedBlock {
    opened_at: u32,
    opener: String,
    directive: String,
}

impl BlockFrame {
    fn skip(&mut self, line_num: u32, line: &str, directive: &Directive) {
        self.skipped.push(SkippedBlock {
            opened_at: line_num,
            opener: line.to_string(),
            directive: directive.name().to_string(),
        });
    }
}

/// Streaming conditional-block resolver over one input.
#[derive(Debug)]
pub struct BlockResolver<'a> {
    symbols: &'a mut FilterSymbols,
    stack: Vec<BlockFrame>,
    line_num: u32,
    stats: FilterStats,
}

impl<'a> BlockResolver<'a> {
    pub fn new(symbols: &'a mut FilterSymbols) -> Self {
        Self {
            symbols,
            stack: Vec::new(),
            line_num: 0,
            stats: FilterStats::default(),
        }
    }

    /// Current nesting depth of open `IF...` blocks.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Mode of the innermost open block, `None` at top level.
    pub fn mode(&self) -> Option<BlockMode> {
        self.stack.last().map(|frame| frame.mode)
    }

    pub fn line_num(&self) -> u32 {
        self.line_num
    }

    pub fn stats(&self) -> &FilterStats {
        &self.stats
    }

    /// Process the next input line.
    pub fn process_line<O, E>(
        &mut self,
        line: &str,
        out: &mut O,
        events: &mut E,
    ) -> Result<(), FilterError>
    where
        O: LineSink + ?Sized,
        E: EventSink + ?Sized,
    {
        self.line_num = self.line_num.saturating_add(1);
        self.stats.lines_read = self.stats.lines_read.saturating_add(1);
        let line_num = self.line_num;
        let class = classify(line).map_err(|err| err.with_context(line_num, line))?;
        let result = match self.mode() {
            Some(mode) if mode.suppressing() => self.process_suppressed(line, class, events),
            mode => self.process_active(line, class, mode, out, events),
        };
        result.map_err(|err| err.with_context(line_num, line))
    }

    /// Finish the pass; fails if a block is still open.
    pub fn finish(self) -> Result<FilterStats, FilterError> {
        if let Some(frame) = self.stack.last() {
            let (opened_at, opener, directive) = match frame.skipped.last() {
                Some(inner) => (inner.opened_at, &inner.opener, &inner.directive),
                None => (frame.opened_at, &frame.opener, &frame.directive),
            };
            return Err(FilterError::new(
                FilterErrorKind::Unterminated,
                "End of input reached before the ENDIF of this conditional block",
                Some(directive.as_str()),
            )
            .with_context(opened_at, opener));
        }
        Ok(self.stats)
    }

    fn process_active<O, E>(
        &mut self,
        line: &str,
        class: LineClass<'_>,
        mode: Option<BlockMode>,
        out: &mut O,
        events: &mut E,
    ) -> Result<(), FilterError>
    where
        O: LineSink + ?Sized,
        E: EventSink + ?Sized,
    {
        let directive = match class.directive {
            Some(directive) => directive,
            None => {
                self.discover(line, events);
                return self.emit(out, line);
            }
        };

        match directive {
            Directive::IfDef(symbol) => {
                self.open_conditional(line, class.label, "IFDEF", symbol, false, out, events)
            }
            Directive::IfNDef(symbol) => {
                self.open_conditional(line, class.label, "IFNDEF", symbol, true, out, events)
            }
            Directive::OtherIf(name) => {
                self.emit(out, line)?;
                self.push(BlockMode::Passthrough, line, &name);
                events.event(FilterEvent::BlockEntered {
                    line: self.line_num,
                    directive: name,
                    symbol: None,
                    kind: BlockKind::Passthrough,
                });
                Ok(())
            }
            Directive::EndIf => match mode {
                Some(BlockMode::Included) => {
                    self.retain_label(class.label, out, events)?;
                    self.close_block(events);
                    Ok(())
                }
                Some(_) => {
                    self.emit(out, line)?;
                    self.close_block(events);
                    Ok(())
                }
                None => self.copy_stray(line, "ENDIF", out, events),
            },
            branch => match mode {
                Some(BlockMode::Included) => {
                    self.retain_label(class.label, out, events)?;
                    if let Some(frame) = self.stack.last_mut() {
                        frame.mode = BlockMode::Exhausted;
                    }
                    events.event(FilterEvent::BranchClosed {
                        line: self.line_num,
                        directive: branch.name().to_string(),
                    });
                    Ok(())
                }
                Some(_) => self.emit(out, line),
                None => self.copy_stray(line, branch.name(), out, events),
            },
        }
    }

    fn process_suppressed<E>(
        &mut self,
        line: &str,
        class: LineClass<'_>,
        events: &mut E,
    ) -> Result<(), FilterError>
    where
        E: EventSink + ?Sized,
    {
        let directive = match class.directive {
            Some(directive) => directive,
            None => {
                if self.symbols.scan() == DefinitionScan::Everywhere {
                    self.discover(line, events);
                }
                return Ok(());
            }
        };
        let line_num = self.line_num;
        let frame = match self.stack.last_mut() {
            Some(frame) => frame,
            None => return Ok(()),
        };

        if !frame.skipped.is_empty() {
            if directive.opens_block() {
                frame.skip(line_num, line, &directive);
            } else if directive == Directive::EndIf {
                frame.skipped.pop();
            }
            return Ok(());
        }

        match directive {
            Directive::EndIf => {
                let opened_at = frame.opened_at;
                self.stack.pop();
                events.event(FilterEvent::BlockExited {
                    line: line_num,
                    opened_at,
                });
            }
            ref nested if nested.opens_block() => frame.skip(line_num, line, nested),
            _ if frame.mode == BlockMode::Exhausted => {}
            Directive::Else => {
                frame.mode = BlockMode::Included;
                events.event(FilterEvent::BranchTaken {
                    line: line_num,
                    directive: "ELSE".to_string(),
                });
            }
            Directive::ElseIfDef(ref symbol) | Directive::ElseIfNDef(ref symbol) => {
                let negated = matches!(directive, Directive::ElseIfNDef(_));
                match self.symbols.resolve(symbol, negated) {
                    Resolution::Preserved => {
                        return Err(FilterError::new(
                            FilterErrorKind::PreservedBranch,
                            "ELSEIFDEF/ELSEIFNDEF on a preserved (-P) definition inside a block excluded by filtering is not supported",
                            Some(symbol.as_str()),
                        ));
                    }
                    Resolution::Included => {
                        frame.mode = BlockMode::Included;
                        events.event(FilterEvent::BranchTaken {
                            line: line_num,
                            directive: directive.name().to_string(),
                        });
                    }
                    Resolution::Excluded => {}
                }
            }
            Directive::OtherElse(name) => {
                events.event(FilterEvent::UnresolvedBranch {
                    line: line_num,
                    directive: name,
                });
            }
            Directive::IfDef(_) | Directive::IfNDef(_) | Directive::OtherIf(_) => {}
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn open_conditional<O, E>(
        &mut self,
        line: &str,
        label: Option<&str>,
        directive: &str,
        symbol: Symbol,
        negated: bool,
        out: &mut O,
        events: &mut E,
    ) -> Result<(), FilterError>
    where
        O: LineSink + ?Sized,
        E: EventSink + ?Sized,
    {
        let kind = match self.symbols.resolve(&symbol, negated) {
            Resolution::Preserved => {
                self.emit(out, line)?;
                self.push(BlockMode::Passthrough, line, directive);
                BlockKind::Preserved
            }
            Resolution::Included => {
                self.retain_label(label, out, events)?;
                self.push(BlockMode::Included, line, directive);
                BlockKind::Included
            }
            Resolution::Excluded => {
                self.retain_label(label, out, events)?;
                self.push(BlockMode::Excluded, line, directive);
                BlockKind::Excluded
            }
        };
        events.event(FilterEvent::BlockEntered {
            line: self.line_num,
            directive: directive.to_string(),
            symbol: Some(symbol),
            kind,
        });
        Ok(())
    }

    fn push(&mut self, mode: BlockMode, opener: &str, directive: &str) {
        self.stack.push(BlockFrame {
            mode,
            opened_at: self.line_num,
            opener: opener.to_string(),
            directive: directive.to_string(),
            skipped: Vec::new(),
        });
    }

    fn close_block<E>(&mut self, events: &mut E)
    where
        E: EventSink + ?Sized,
    {
        if let Some(frame) = self.stack.pop() {
            events.event(FilterEvent::BlockExited {
                line: self.line_num,
                opened_at: frame.opened_at,
            });
        }
    }

    fn copy_stray<O, E>(
        &mut self,
        line: &str,
        directive: &str,
        out: &mut O,
        events: &mut E,
    ) -> Result<(), FilterError>
    where
        O: LineSink + ?Sized,
        E: EventSink + ?Sized,
    {
        self.emit(out, line)?;
        events.event(FilterEvent::StrayDirective {
            line: self.line_num,
            directive: directive.to_string(),
        });
        Ok(())
    }

    fn retain_label<O, E>(
        &mut self,
        label: Option<&str>,
        out: &mut O,
        events: &mut E,
    ) -> Result<(), FilterError>
    where
        O: LineSink + ?Sized,
        E: EventSink + ?Sized,
    {
        if let Some(label) = label {
            self.emit(out, label)?;
            self.stats.labels_retained += 1;
            events.event(FilterEvent::LabelRetained {
                line: self.line_num,
                label: label.to_string(),
            });
        }
        Ok(())
    }

    fn discover<E>(&mut self, line: &str, events: &mut E)
    where
        E: EventSink + ?Sized,
    {
        if let Some(symbol) = scan_for_definition(line) {
            if self.symbols.define(symbol.clone()) {
                self.stats.symbols_discovered += 1;
                events.event(FilterEvent::SymbolDiscovered {
                    line: self.line_num,
                    symbol,
                });
            }
        }
    }

    fn emit<O>(&mut self, out: &mut O, text: &str) -> Result<(), FilterError>
    where
        O: LineSink + ?Sized,
    {
        out.write_line(text).map_err(|err| {
            FilterError::new(
                FilterErrorKind::Io,
                "Error writing output",
                Some(err.to_string().as_str()),
            )
        })?;
        self.stats.lines_written += 1;
        Ok(())
    }
}

/// Filter a whole line sequence in one forward pass.
///
/// `symbols` keeps every definition discovered along the way. A fatal error
/// is reported to `events` before it is returned.
pub fn filter_lines<I, S, O, E>(
    lines: I,
    symbols: &mut FilterSymbols,
    out: &mut O,
    events: &mut E,
) -> Result<FilterStats, FilterError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    O: LineSink + ?Sized,
    E: EventSink + ?Sized,
{
    let mut resolver = BlockResolver::new(symbols);
    let result = lines
        .into_iter()
        .try_for_each(|line| resolver.process_line(line.as_ref(), out, events))
        .and_then(|()| resolver.finish());
    if let Err(err) = &result {
        events.event(FilterEvent::Fatal {
            line: err.line().unwrap_or(0),
            message: err.message().to_string(),
        });
    }
    result
}
