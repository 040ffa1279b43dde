//! Command history with `!n` recall.

use crate::error::ShellError;
use crate::ring::RingBuffer;
use regex::bytes::Regex;
use std::sync::LazyLock;

/// `!` followed by a decimal index, optionally padded with trailing whitespace.
static RECALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!(\d+)\s*$").expect("recall pattern is valid"));

/// The last few command lines, oldest first.
///
/// Lines are kept as raw bytes. Indices are storage positions, not sequence numbers:
/// after an eviction index 0 is whatever is now the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: RingBuffer<Vec<u8>>,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RingBuffer::with_capacity(capacity),
        }
    }

    /// Store a copy of `line`, evicting the oldest entry when full.
    pub fn record(&mut self, line: &[u8]) {
        if let Some(evicted) = self.entries.push_evicting_oldest(line.to_vec()) {
            tracing::trace!(
                evicted = %String::from_utf8_lossy(&evicted),
                "history full, dropped oldest entry"
            );
        }
    }

    /// Substitute a `!n` line with history entry `n`.
    ///
    /// Lines that do not start with `!` come back unchanged. A `!` line whose suffix is
    /// not a decimal number, or names an index past the end, is an error.
    pub fn expand(&self, line: &[u8]) -> Result<Vec<u8>, ShellError> {
        if !line.starts_with(b"!") {
            return Ok(line.to_vec());
        }
        let entry = RECALL
            .captures(line)
            .and_then(|caps| std::str::from_utf8(&caps[1]).ok()?.parse::<usize>().ok())
            .and_then(|index| self.entries.get(index).map(|entry| (index, entry)));
        let Some((index, entry)) = entry else {
            tracing::debug!(requested = %String::from_utf8_lossy(line), "recall not in history");
            return Err(ShellError::RecallOutOfRange);
        };
        tracing::debug!(index, entry = %String::from_utf8_lossy(entry), "history recall");
        Ok(entry.clone())
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.entries.get(index).map(Vec::as_slice)
    }

    /// `(index, line)` pairs, oldest first.
    pub fn list(&self) -> impl Iterator<Item = (usize, &[u8])> {
        self.entries.iter().map(Vec::as_slice).enumerate()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
