//! Where command lines come from.

use crate::config::MAX_LINE_LEN;
use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Read, Write};

/// Result of a single read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line of input without its trailing newline, as raw bytes.
    Line(Vec<u8>),
    /// The read produced nothing (e.g. Ctrl-C in the editor); try again.
    Interrupted,
    /// End of input.
    Eof,
}

/// A source of command lines that knows how to show the prompt.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Interactive source backed by `rustyline`, for terminals.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialise line editor")?;
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                // Arrow-key recall only; the shell keeps its own numbered history.
                self.editor.add_history_entry(line.as_str())?;
                Ok(ReadOutcome::Line(line.into_bytes()))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err).context("failed to read line"),
        }
    }
}

/// Reads lines from any buffered reader and writes the prompt itself.
///
/// After a read that returns nothing the prompt is not repeated until a line has been
/// delivered, so a retried read looks like a single prompt.
///
/// At most `max_line_len` bytes of a line are kept; the rest of it is read and dropped.
pub struct PlainSource<R, W> {
    reader: R,
    prompt_out: W,
    prompted: bool,
    max_line_len: usize,
}

impl<R: BufRead, W: Write> PlainSource<R, W> {
    pub fn new(reader: R, prompt_out: W) -> Self {
        Self {
            reader,
            prompt_out,
            prompted: false,
            max_line_len: MAX_LINE_LEN,
        }
    }

    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// Consume input up to and including the next newline.
    fn discard_rest_of_line(&mut self) -> Result<()> {
        loop {
            let available = self
                .reader
                .fill_buf()
                .context("failed to read from standard input")?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&byte| byte == b'\n') {
                Some(newline) => {
                    self.reader.consume(newline + 1);
                    return Ok(());
                }
                None => {
                    let len = available.len();
                    self.reader.consume(len);
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> LineSource for PlainSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        if !self.prompted {
            write!(self.prompt_out, "{prompt}")?;
            self.prompt_out.flush()?;
            self.prompted = true;
        }

        // One byte of room for the newline.
        let limit = self.max_line_len + 1;
        let mut buf = Vec::with_capacity(limit);
        let read = (&mut self.reader)
            .take(limit as u64)
            .read_until(b'\n', &mut buf)
            .context("failed to read from standard input")?;
        if read == 0 {
            return Ok(ReadOutcome::Eof);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        } else if read == limit {
            buf.truncate(self.max_line_len);
            self.discard_rest_of_line()?;
            tracing::debug!(kept = buf.len(), "overlong line truncated");
        }
        self.prompted = false;
        Ok(ReadOutcome::Line(buf))
    }
}
