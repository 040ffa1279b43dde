//! Tunables for a shell session.

/// Prompt printed before every read.
pub const PROMPT: &str = "msh> ";
/// Longest accepted input line in bytes, not counting the newline.
pub const MAX_LINE_LEN: usize = 254;
/// Longest single token in bytes; longer tokens are truncated.
pub const MAX_TOKEN_LEN: usize = 255;
/// Program name plus ten arguments.
pub const MAX_NUM_ARGUMENTS: usize = 11;
pub const HISTORY_CAPACITY: usize = 15;
pub const PID_CAPACITY: usize = 20;

/// Session configuration.
///
/// [`Default`] yields the stock `msh` behaviour; the binary only lets the user flip
/// `exit_on_eof` and `line_editor`.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub prompt: String,
    pub history_capacity: usize,
    pub pid_capacity: usize,
    pub max_line_len: usize,
    /// Stop the loop on end of input instead of retrying the read.
    pub exit_on_eof: bool,
    /// Use the interactive line editor when standard input is a terminal.
    pub line_editor: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: PROMPT.to_string(),
            history_capacity: HISTORY_CAPACITY,
            pid_capacity: PID_CAPACITY,
            max_line_len: MAX_LINE_LEN,
            exit_on_eof: false,
            line_editor: true,
        }
    }
}
