use thiserror::Error;

/// Errors the shell reports to the user before carrying on with the next prompt.
///
/// The `Display` text of each variant is exactly what gets printed.
#[derive(Debug, Error)]
pub enum ShellError {
    /// `!n` named an index past the end of history, or `n` was not a number.
    #[error("Command not in history.")]
    RecallOutOfRange,

    /// `fork` failed; no child exists and no pid is recorded.
    #[error("Error forking a new process.")]
    Spawn(#[source] nix::Error),

    /// `waitpid` on the child failed.
    #[error("Error waiting for process {pid}: {source}")]
    Wait {
        pid: i32,
        #[source]
        source: nix::Error,
    },

    /// An argument cannot be handed to `execvp`.
    #[error("{name}: invalid argument (contains a NUL byte)")]
    InvalidArgument { name: String },
}
