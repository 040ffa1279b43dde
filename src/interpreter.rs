use crate::command::{CommandFactory, ExitCode};
use crate::config::ShellConfig;
use crate::input::{LineSource, ReadOutcome};
use crate::state::ShellState;
use crate::tokenizer::{split_into_tokens, truncate};
use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: BuiltinCommand and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The shell's execution loop.
///
/// The interpreter owns the [`ShellState`] (history and pid log) and a list of
/// [`CommandFactory`] objects that are queried in order to create commands by name.
/// See [`Default`] for the factories included out of the box.
///
/// Example
/// ```
/// use msh::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// sh.execute_line(b"history", &mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "0: history\n");
/// ```
pub struct Interpreter {
    config: ShellConfig,
    state: ShellState,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(config: ShellConfig, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            state: ShellState::new(&config),
            config,
            commands,
        }
    }

    /// Create an interpreter with the stock commands and the given configuration.
    pub fn with_config(config: ShellConfig) -> Self {
        Self::new(config, default_commands())
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns the command's exit code or an error if no factory recognises `name`
    /// or the command fails to execute.
    pub fn run(
        &mut self,
        name: &OsStr,
        args: &[&OsStr],
        stdout: &mut dyn Write,
    ) -> Result<ExitCode> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.state, name, args) {
                return cmd.execute(stdout, &mut self.state);
            }
        }
        Err(anyhow::anyhow!("command not found: {}", name.to_string_lossy()))
    }

    /// Process one raw input line: expand, tokenize, record, dispatch.
    ///
    /// Problems with the command itself are reported on `stdout` and are not errors;
    /// `Err` is reserved for failing to write that report.
    pub fn execute_line(&mut self, line: &[u8], stdout: &mut dyn Write) -> Result<()> {
        let line = truncate(line, self.config.max_line_len);
        let line = match self.state.history.expand(line) {
            Ok(line) => line,
            Err(err) => {
                writeln!(stdout, "{err}")?;
                return Ok(());
            }
        };

        let tokens = split_into_tokens(&line);
        // Recorded before dispatch so `history` sees itself.
        self.state.history.record(&line);

        let Some((name, args)) = tokens.split_first() else {
            return Ok(());
        };
        let args: Vec<&OsStr> = args.iter().map(OsString::as_os_str).collect();
        let command = name.to_string_lossy();
        tracing::debug!(%command, ?args, "dispatching");

        match self.run(name, &args, stdout) {
            Ok(code) => tracing::debug!(%command, code, "command finished"),
            Err(err) => writeln!(stdout, "{err}")?,
        }
        Ok(())
    }

    /// Prompt, read and execute lines until `exit`/`quit`.
    ///
    /// Reads that yield nothing are retried; with `exit_on_eof` set, end of input also
    /// ends the loop.
    pub fn repl(&mut self, source: &mut dyn LineSource, stdout: &mut dyn Write) -> Result<()> {
        while !self.state.should_exit {
            let Some(line) = self.read_line(source)? else {
                tracing::debug!("end of input");
                break;
            };
            self.execute_line(&line, stdout)?;
            stdout.flush()?;
        }
        Ok(())
    }

    fn read_line(&self, source: &mut dyn LineSource) -> Result<Option<Vec<u8>>> {
        loop {
            match source.read_line(&self.config.prompt)? {
                ReadOutcome::Line(line) => return Ok(Some(line)),
                ReadOutcome::Interrupted => continue,
                ReadOutcome::Eof if self.config.exit_on_eof => return Ok(None),
                ReadOutcome::Eof => continue,
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::with_config(ShellConfig::default())
    }
}

/// The stock commands:
/// - built-ins: `exit`/`quit`, `cd`, `history`, `listpids`
/// - external program launcher, which accepts every other name
fn default_commands() -> Vec<Box<dyn CommandFactory>> {
    use crate::builtin::*;
    use crate::external::ExternalCommand;
    vec![
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<ShowHistory>::default()),
        Box::new(Factory::<ListPids>::default()),
        Box::new(Factory::<ExternalCommand>::default()),
    ]
}
