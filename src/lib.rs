//! `msh`, a minimal interactive command shell.
//!
//! Each line read from the user is history-expanded (`!n`), split on whitespace into at
//! most eleven tokens, recorded in a bounded history, and then either handled by a
//! built-in (`exit`/`quit`, `cd`, `history`, `listpids`) or run as an external program in
//! a forked child that the shell waits for. The ids of spawned children are kept in a
//! second bounded log.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`] and [`state`]
//! expose the traits and types needed to plug in your own commands.

mod builtin;
pub mod command;
pub mod config;
pub mod error;
mod external;
pub mod history;
pub mod input;
mod interpreter;
pub mod logging;
pub mod pids;
pub mod ring;
pub mod state;
pub mod tokenizer;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
