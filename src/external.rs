use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::state::ShellState;
use anyhow::Result;
use nix::libc;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvp, fork, write};
use std::ffi::{CString, OsStr, OsString};
use std::io::Write;
use std::os::unix::ffi::OsStrExt;

/// Command that is not a builtin.
///
/// The program is looked up on `PATH` by `execvp` inside the forked child, so any name
/// is accepted here and a missing program is only noticed after the fork.
pub struct ExternalCommand {
    argv: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(argv: Vec<OsString>) -> Self {
        Self { argv }
    }

    /// The argument vector for `execvp`, byte for byte as typed.
    fn c_argv(&self) -> Result<Vec<CString>, ShellError> {
        self.argv
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<Result<Vec<CString>, _>>()
            .map_err(|_| ShellError::InvalidArgument {
                name: self.name().to_string_lossy().into_owned(),
            })
    }

    fn name(&self) -> &OsStr {
        self.argv.first().map(OsString::as_os_str).unwrap_or_default()
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        _state: &ShellState,
        name: &OsStr,
        args: &[&OsStr],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let argv = std::iter::once(name)
            .chain(args.iter().copied())
            .map(OsStr::to_os_string)
            .collect();
        Some(Box::new(ExternalCommand::new(argv)))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<ExitCode> {
        let argv = self.c_argv()?;
        let Some(program) = argv.first() else {
            return Ok(0);
        };
        // Built before forking: the child must not allocate.
        let mut not_found = self.name().as_bytes().to_vec();
        not_found.extend_from_slice(b": Command not found.\n");
        let name = self.name().to_string_lossy();

        stdout.flush()?;
        std::io::stdout().flush()?;

        // SAFETY: the child only calls execvp, write and _exit before it is replaced or
        // terminates, all of which are safe after fork in a multi-threaded parent.
        match unsafe { fork() }.map_err(ShellError::Spawn)? {
            ForkResult::Child => {
                let _ = execvp(program, &argv);
                let _ = write(std::io::stdout(), &not_found);
                unsafe { libc::_exit(libc::EXIT_FAILURE) }
            }
            ForkResult::Parent { child } => {
                tracing::debug!(pid = child.as_raw(), program = %name, "spawned");
                let waited = wait_for(child);
                state.pids.record(child);
                let code = waited?;
                tracing::debug!(pid = child.as_raw(), code, "child finished");
                Ok(code)
            }
        }
    }
}

/// Blocks until `child` terminates and converts its status to a shell exit code.
fn wait_for(child: Pid) -> Result<ExitCode, ShellError> {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, signal, core_dumped)) => {
                return Ok(terminated_by_signal(signal as i32, core_dumped));
            }
            // Stopped/continued notifications are not requested, but are not final either.
            Ok(_) => continue,
            Err(nix::errno::Errno::EINTR) => continue,
            Err(source) => {
                tracing::warn!(pid = child.as_raw(), error = %source, "waitpid failed");
                return Err(ShellError::Wait {
                    pid: child.as_raw(),
                    source,
                });
            }
        }
    }
}

fn terminated_by_signal(signal: i32, core_dumped: bool) -> ExitCode {
    if core_dumped { 255 } else { 128 + signal }
}
