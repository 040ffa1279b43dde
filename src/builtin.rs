use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::interpreter::Factory;
use crate::state::ShellState;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::ffi::OsStr;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Every name that selects this command, e.g. `["exit", "quit"]`.
    fn names() -> &'static [&'static str];

    /// Executes the command against the shell state.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<ExitCode> {
        match T::execute(*self, stdout, state) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stdout, "{e:#}")?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _state: &mut ShellState,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", self.output.trim_end())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _state: &ShellState,
        name: &OsStr,
        args: &[&OsStr],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let name = name.to_str().filter(|name| T::names().contains(name))?;
        let Some(args) = args.iter().map(|arg| arg.to_str()).collect::<Option<Vec<&str>>>()
        else {
            return Some(Box::new(InvalidArgs {
                output: format!("{name}: arguments must be valid UTF-8"),
                is_error: true,
            }));
        };
        Some(match T::from_args(&[name], &args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

#[derive(FromArgs)]
/// Leave the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn names() -> &'static [&'static str] {
        &["exit", "quit"]
    }

    fn execute(self, _stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        state.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME
/// environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    /// Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn names() -> &'static [&'static str] {
        &["cd"]
    }

    fn execute(self, _stdout: &mut dyn Write, _state: &mut ShellState) -> Result<ExitCode> {
        let target = match self.target {
            Some(t) => PathBuf::from(t),
            None => env::var_os("HOME")
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("cd: no target and HOME not set"))?,
        };

        env::set_current_dir(&target).with_context(|| format!("cd: {}", target.display()))?;
        tracing::debug!(dir = %target.display(), "changed directory");
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the recorded command lines, oldest first, as `index: command`.
pub struct ShowHistory {}

impl BuiltinCommand for ShowHistory {
    fn names() -> &'static [&'static str] {
        &["history"]
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        for (index, line) in state.history.list() {
            write!(stdout, "{index}: ")?;
            stdout.write_all(line)?;
            writeln!(stdout)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the ids of recently spawned processes, oldest first.
pub struct ListPids {}

impl BuiltinCommand for ListPids {
    fn names() -> &'static [&'static str] {
        &["listpids"]
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        for pid in state.pids.list() {
            writeln!(stdout, "{pid}")?;
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::Pid;
    use std::env as stdenv;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn make_unique_temp_dir() -> io::Result<PathBuf> {
        let mut p = stdenv::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("msh_test_cd_{}_{}", std::process::id(), nanos));
        fs::create_dir_all(&p)?;
        Ok(p)
    }

    fn create(name: &str, args: &[&str]) -> Box<dyn ExecutableCommand> {
        let args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();
        let state = ShellState::default();
        let factories: Vec<Box<dyn CommandFactory>> = vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<ShowHistory>::default()),
            Box::new(Factory::<ListPids>::default()),
        ];
        factories
            .iter()
            .find_map(|f| f.try_create(&state, OsStr::new(name), &args))
            .expect("builtin should be recognised")
    }

    #[test]
    fn test_exit_and_quit_set_flag() {
        for name in ["exit", "quit"] {
            let mut state = ShellState::default();
            let code = create(name, &["ignored"])
                .execute(&mut Vec::new(), &mut state)
                .unwrap();
            assert_eq!(code, 0);
            assert!(state.should_exit);
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let state = ShellState::default();
        let factory = Factory::<Exit>::default();
        assert!(factory.try_create(&state, OsStr::new("EXIT"), &[]).is_none());
        assert!(factory.try_create(&state, OsStr::new("exit"), &[]).is_some());
    }

    #[test]
    fn test_history_lists_index_and_text() {
        let mut state = ShellState::default();
        state.history.record(b"echo hi");
        state.history.record(b"history");
        let mut out = Vec::new();
        let code = ShowHistory {}.execute(&mut out, &mut state).unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "0: echo hi\n1: history\n");
    }

    #[test]
    fn test_history_prints_raw_bytes() {
        let mut state = ShellState::default();
        state.history.record(b"cat f\xe9");
        let mut out: Vec<u8> = Vec::new();
        ShowHistory {}.execute(&mut out, &mut state).unwrap();
        assert_eq!(out, b"0: cat f\xe9\n");
    }

    #[test]
    fn test_non_utf8_builtin_argument_is_reported() {
        use std::os::unix::ffi::OsStrExt;

        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let state = ShellState::default();
        let cmd = Factory::<Cd>::default()
            .try_create(&state, OsStr::new("cd"), &[OsStr::from_bytes(b"f\xe9")])
            .expect("cd should be recognised");

        let mut state = ShellState::default();
        let mut out: Vec<u8> = Vec::new();
        assert_eq!(cmd.execute(&mut out, &mut state).unwrap(), 1);
        assert_eq!(String::from_utf8(out).unwrap(), "cd: arguments must be valid UTF-8\n");
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_listpids_one_per_line() {
        let mut state = ShellState::default();
        state.pids.record(Pid::from_raw(41));
        state.pids.record(Pid::from_raw(42));
        let mut out = Vec::new();
        ListPids {}.execute(&mut out, &mut state).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "41\n42\n");
    }

    #[test]
    fn test_history_rejects_extra_arguments() {
        let mut state = ShellState::default();
        let mut out = Vec::new();
        let code = create("history", &["bogus"])
            .execute(&mut out, &mut state)
            .unwrap();
        assert_eq!(code, 1);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_help_is_not_an_error() {
        let mut state = ShellState::default();
        let mut out = Vec::new();
        let code = create("cd", &["--help"])
            .execute(&mut out, &mut state)
            .unwrap();
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().contains("Usage: cd"));
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir().expect("failed to create temp dir");
        let canonical_temp = fs::canonicalize(&temp).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();

        let mut state = ShellState::default();
        let cmd = Cd {
            target: Some(temp.to_string_lossy().to_string()),
        };
        let res = BuiltinCommand::execute(cmd, &mut Vec::new(), &mut state);
        assert!(res.is_ok());

        let new_cwd = fs::canonicalize(stdenv::current_dir().unwrap()).unwrap();
        assert_eq!(new_cwd, canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_to_home_when_none() {
        let _lock = lock_current_dir();
        let Some(home) = stdenv::var_os("HOME") else {
            return;
        };
        let orig = stdenv::current_dir().unwrap();

        let mut state = ShellState::default();
        let res = BuiltinCommand::execute(Cd { target: None }, &mut Vec::new(), &mut state);
        assert!(res.is_ok());
        assert_eq!(
            fs::canonicalize(stdenv::current_dir().unwrap()).unwrap(),
            fs::canonicalize(home).unwrap()
        );

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_nonexistent_path_reports_and_continues() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();

        let mut state = ShellState::default();
        let name = format!("nonexistent_dir_for_msh_test_{}", std::process::id());
        let mut out = Vec::new();
        let code = create("cd", &[name.as_str()])
            .execute(&mut out, &mut state)
            .unwrap();

        assert_eq!(code, 1);
        let message = String::from_utf8(out).unwrap();
        assert!(message.starts_with(&format!("cd: {name}: ")));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }
}
