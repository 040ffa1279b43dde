//! Splitting a raw command line into arguments.

use crate::config::{MAX_NUM_ARGUMENTS, MAX_TOKEN_LEN};
use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;

/// Bytes that separate tokens.
pub const DELIMITERS: [u8; 3] = [b' ', b'\t', b'\n'];

/// Splits a command line into at most [`MAX_NUM_ARGUMENTS`] owned tokens.
///
/// Runs of delimiters never produce empty tokens, so a blank line yields an empty vector
/// ("no command"). Tokens longer than [`MAX_TOKEN_LEN`] bytes are truncated, and anything
/// after the eleventh token is dropped without complaint. Bytes are copied as they are;
/// the line does not have to be valid UTF-8.
///
/// # Arguments
/// * `line` - The line to split. It is not modified.
///
/// # Returns
/// The tokens in order; index 0 is the command name.
pub fn split_into_tokens(line: &[u8]) -> Vec<OsString> {
    line.split(|byte| DELIMITERS.contains(byte))
        .filter(|word| !word.is_empty())
        .take(MAX_NUM_ARGUMENTS)
        .map(|word| OsString::from_vec(truncate(word, MAX_TOKEN_LEN).to_vec()))
        .collect()
}

/// The first `max` bytes of `bytes`, or all of them when shorter.
pub fn truncate(bytes: &[u8], max: usize) -> &[u8] {
    &bytes[..bytes.len().min(max)]
}
