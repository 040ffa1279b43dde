use crate::config::ShellConfig;
use crate::history::History;
use crate::pids::ProcessRegistry;

/// Everything the execution loop owns between prompts.
///
/// The state contains:
/// - `history`: recent command lines, recorded before each command runs.
/// - `pids`: ids of recently spawned children.
/// - `should_exit`: set by `exit`/`quit` so the loop stops after the current command.
#[derive(Debug, Clone)]
pub struct ShellState {
    pub history: History,
    pub pids: ProcessRegistry,
    pub should_exit: bool,
}

impl ShellState {
    pub fn new(config: &ShellConfig) -> Self {
        Self {
            history: History::new(config.history_capacity),
            pids: ProcessRegistry::new(config.pid_capacity),
            should_exit: false,
        }
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new(&ShellConfig::default())
    }
}
