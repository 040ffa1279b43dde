use anyhow::Result;
use argh::FromArgs;
use msh::Interpreter;
use msh::config::ShellConfig;
use msh::input::{EditorSource, LineSource, PlainSource};
use std::io::IsTerminal;

#[derive(FromArgs)]
/// A minimal interactive shell with numbered history and a log of spawned process ids.
struct Args {
    #[argh(switch)]
    /// exit at end of input instead of waiting for more
    exit_on_eof: bool,

    #[argh(switch)]
    /// read standard input directly, without the line editor
    plain: bool,
}

fn main() -> Result<()> {
    msh::logging::init_logging();

    let args: Args = argh::from_env();
    let config = ShellConfig {
        exit_on_eof: args.exit_on_eof,
        line_editor: !args.plain,
        ..ShellConfig::default()
    };

    let mut source: Box<dyn LineSource> = if config.line_editor && std::io::stdin().is_terminal() {
        Box::new(EditorSource::new()?)
    } else {
        Box::new(
            PlainSource::new(std::io::stdin().lock(), std::io::stdout())
                .with_max_line_len(config.max_line_len),
        )
    };

    let mut sh = Interpreter::with_config(config);
    sh.repl(source.as_mut(), &mut std::io::stdout())
}
