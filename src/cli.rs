use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::commands::Arguments;

#[derive(Debug, Clone, Parser)]
#[command(name = "page-scaffold")]
#[command(about = "Create page-object classes and add located elements to them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "DIR")]
    pub project: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    pub session: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// One line typed into the shell: a subcommand without the binary name.
#[derive(Debug, Clone, Parser)]
#[command(name = "page-scaffold", no_binary_name = true, disable_help_subcommand = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    NewPage {
        #[arg(long, value_name = "NAMESPACE")]
        package: Option<String>,

        #[arg(long, value_name = "NAME")]
        named: String,
    },
    NewElement {
        #[arg(long, value_name = "NAME")]
        named: String,

        #[arg(long, value_name = "KEY=VALUE")]
        findby: String,
    },
    PickUp {
        path: PathBuf,
    },
    Shell,
}

impl Commands {
    /// Command-table name and arguments; `None` for the shell itself.
    pub fn invocation(&self) -> Option<(&'static str, Arguments)> {
        match self {
            Commands::NewPage { package, named } => Some((
                "new-page",
                Arguments::new()
                    .with("named", named.as_str())
                    .with_opt("package", package.as_deref()),
            )),
            Commands::NewElement { named, findby } => Some((
                "new-element",
                Arguments::new()
                    .with("named", named.as_str())
                    .with("findby", findby.as_str()),
            )),
            Commands::PickUp { path } => Some((
                "pick-up",
                Arguments::new().with("path", path.to_string_lossy()),
            )),
            Commands::Shell => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_page_maps_to_table_arguments() {
        let cli = Cli::parse_from([
            "page-scaffold",
            "new-page",
            "--package",
            "com.app.pages",
            "--named",
            "Login",
        ]);
        let (name, args) = cli.command.invocation().unwrap();
        assert_eq!(name, "new-page");
        assert_eq!(args.get("package"), Some("com.app.pages"));
        assert_eq!(args.get("named"), Some("Login"));
    }

    #[test]
    fn new_element_requires_findby() {
        let err = Cli::try_parse_from(["page-scaffold", "new-element", "--named", "btn"]);
        assert!(err.is_err());
    }

    #[test]
    fn shell_line_shares_subcommand_grammar() {
        let line = ShellLine::try_parse_from([
            "new-element",
            "--named",
            "btn",
            "--findby=xpath=//a[@x='1']",
        ])
        .unwrap();
        let (name, args) = line.command.invocation().unwrap();
        assert_eq!(name, "new-element");
        assert_eq!(args.get("named"), Some("btn"));
        assert_eq!(args.get("findby"), Some("xpath=//a[@x='1']"));

        assert!(ShellLine::try_parse_from(["new-page", "--name", "x"]).is_err());
        assert!(ShellLine::try_parse_from(["--project", "/p", "shell"]).is_err());
    }

    #[test]
    fn global_options_precede_subcommand() {
        let cli = Cli::parse_from([
            "page-scaffold",
            "--project",
            "/work/shop",
            "--format",
            "json",
            "shell",
        ]);
        assert_eq!(cli.project, Some(PathBuf::from("/work/shop")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.command.invocation().is_none());
    }
}
