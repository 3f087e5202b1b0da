use anyhow::{Context, Result};
use clap::Parser;
use page_scaffold::cli::{Cli, OutputFormat};
use page_scaffold::commands::{CommandTable, Outcome};
use page_scaffold::config::{
    ProjectConfig, load_project_config, resolve_base_package, resolve_project_root,
    resolve_session_path,
};
use page_scaffold::logging::init_cli_logger;
use page_scaffold::session::Session;
use page_scaffold::workspace::{StdinPrompt, Workspace};
use serde::Serialize;
use std::env;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_logger(cli.verbose);

    let current_dir = env::current_dir().context("Failed to read current directory")?;
    let project_root = resolve_project_root(&cli, &current_dir);
    let config = load_project_config(&project_root)?;
    let session_path = resolve_session_path(&cli, &project_root)?;
    let session = Session::load(&session_path)?;
    debug!(
        project = %project_root.display(),
        session = %session_path.display(),
        "loaded context"
    );

    let mut ws = build_workspace(current_dir, &project_root, &config, &session);
    let mut host = Host {
        table: CommandTable::standard(),
        session,
        session_path,
        project_root,
        format: cli.format,
    };

    match cli.command.invocation() {
        Some((name, args)) => {
            let outcome = host.table.dispatch(&mut ws, name, &args)?;
            host.finish(&ws, &outcome)?;
        }
        None => run_shell(&mut host, &mut ws)?,
    }

    Ok(())
}

fn build_workspace(
    current_dir: PathBuf,
    project_root: &Path,
    config: &ProjectConfig,
    session: &Session,
) -> Workspace {
    // A session recorded for another project root is stale.
    let active = if session.project_root.as_deref() == Some(project_root) {
        session.active_resource.clone()
    } else {
        None
    };

    Workspace::new(
        current_dir,
        config.output_root_in(project_root),
        Box::new(StdinPrompt),
    )
    .with_source_roots(config.source_roots_in(project_root))
    .with_base_package(resolve_base_package(project_root, config))
    .with_profile(config.profile.clone())
    .with_active_resource(active)
}

struct Host {
    table: CommandTable,
    session: Session,
    session_path: PathBuf,
    project_root: PathBuf,
    format: OutputFormat,
}

impl Host {
    fn finish(&mut self, ws: &Workspace, outcome: &Outcome) -> Result<()> {
        if outcome.pick_up.is_some() {
            self.session.project_root = Some(self.project_root.clone());
            self.session.active_resource = ws.active_resource.clone();
            self.session.save(&self.session_path)?;
        }
        print_outcome(outcome, ws, self.format)
    }
}

#[derive(Debug, Serialize)]
struct OutcomeReport<'a> {
    message: &'a str,
    value: &'a str,
    active_resource: Option<&'a Path>,
}

impl<'a> OutcomeReport<'a> {
    fn new(outcome: &'a Outcome, ws: &'a Workspace) -> Self {
        Self {
            message: &outcome.message,
            value: &outcome.value,
            active_resource: ws.active_resource.as_deref(),
        }
    }
}

fn print_outcome(outcome: &Outcome, ws: &Workspace, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", outcome.message),
        OutputFormat::Json => {
            let report = OutcomeReport::new(outcome, ws);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn run_shell(host: &mut Host, ws: &mut Workspace) -> Result<()> {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();

    loop {
        if interactive {
            print!("page-scaffold> ");
            std::io::stdout().flush()?;
        }
        // Lock per line: the package prompt reads stdin too.
        let mut line = String::new();
        let read = stdin
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            break;
        }

        match line.trim() {
            "exit" | "quit" => break,
            "help" => {
                print!("{}", host.table.usage());
                continue;
            }
            _ => {}
        }

        match host.table.dispatch_line(ws, &line) {
            Ok(Some(outcome)) => host.finish(ws, &outcome)?,
            Ok(None) => {}
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}
