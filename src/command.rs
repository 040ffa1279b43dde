use crate::state::ShellState;
use anyhow::Result;
use std::ffi::OsStr;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Object-safe trait for any command that can be dispatched by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command, writing shell-side output to `stdout`.
    ///
    /// External programs inherit the process's own standard streams; `stdout` only
    /// receives what the shell itself prints.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, state: &mut ShellState)
    -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    ///
    /// Tokens are raw bytes from the input line and need not be valid UTF-8.
    fn try_create(
        &self,
        state: &ShellState,
        name: &OsStr,
        args: &[&OsStr],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
