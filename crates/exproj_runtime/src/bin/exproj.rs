//! Exproj CLI entry point.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use exproj_runtime::{
    ProjectService, ProjectStore, PromptChooser, ScriptedChooser, Shell, StdinEditor, StoreConfig,
    render_tree,
};

/// Game project authoring shell.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// project file to open (or create, with --new)
    path: Option<PathBuf>,

    /// create a new project at PATH instead of opening it
    #[arg(long, default_value_t = false, requires = "path")]
    new: bool,

    /// log filter, e.g. `debug` or `exproj_runtime=trace` (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// print the project tree and exit instead of starting the shell
    #[arg(long, default_value_t = false)]
    batch: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.log_level.as_deref());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.init();
}

fn run(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::default();
    let store = ProjectStore::new(config.clone());

    let service = if args.batch {
        ProjectService::spawn(store, ScriptedChooser::new())?
    } else {
        ProjectService::spawn(store, PromptChooser::new(StdinEditor, &config))?
    };
    let handle = service.handle();

    if let Some(path) = &args.path {
        if args.new {
            handle.new_project(path.clone())?;
        } else {
            handle.open_project(path.clone())?;
        }
    }

    if args.batch {
        print!("{}", render_tree(&handle.project_tree()?));
        return Ok(());
    }

    if std::io::stdin().is_terminal() {
        let mut shell = Shell::new(handle)?;
        if args.path.is_some() {
            shell = shell.without_banner();
        }
        shell.run()?;
    } else {
        Shell::with_editor(StdinEditor, handle)
            .without_banner()
            .run()?;
    }

    service.shutdown();
    Ok(())
}
