//! Explicit command table.
//!
//! Each command declares its options up front and executes against a
//! [`Workspace`]. The CLI subcommands and the interactive shell both parse
//! with the same clap grammar and dispatch through the same table.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;

use crate::cli::ShellLine;
use crate::error::{Result, ScaffoldError};
use crate::pages;
use crate::workspace::{Resource, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub required: bool,
    /// Positional parameters take the first bare token instead of `--name`.
    pub positional: bool,
    pub help: &'static str,
}

impl Param {
    const fn option(name: &'static str, required: bool, help: &'static str) -> Self {
        Self {
            name,
            required,
            positional: false,
            help,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    values: BTreeMap<String, String>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn with_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn require(&self, command: &str, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| ScaffoldError::MissingArgument {
            command: command.to_string(),
            param: name.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub message: String,
    pub value: String,
    /// Resource the host should select once the command succeeds.
    pub pick_up: Option<PathBuf>,
}

pub trait Command {
    fn name(&self) -> &'static str;
    fn help(&self) -> &'static str;
    fn params(&self) -> &'static [Param];
    fn execute(&self, ws: &mut Workspace, args: &Arguments) -> Result<Outcome>;
}

pub struct NewPage;

impl Command for NewPage {
    fn name(&self) -> &'static str {
        "new-page"
    }

    fn help(&self) -> &'static str {
        "Create a new page class"
    }

    fn params(&self) -> &'static [Param] {
        const PARAMS: &[Param] = &[
            Param::option("package", false, "the package in which to build this page class"),
            Param::option("named", true, "the page class name"),
        ];
        PARAMS
    }

    fn execute(&self, ws: &mut Workspace, args: &Arguments) -> Result<Outcome> {
        let named = args.require(self.name(), "named")?;
        let created = pages::create_page(ws, named, args.get("package"))?;
        Ok(Outcome {
            message: format!("Created page [{}]", created.qualified_name),
            value: created.qualified_name,
            pick_up: Some(created.path),
        })
    }
}

pub struct NewElement;

impl Command for NewElement {
    fn name(&self) -> &'static str {
        "new-element"
    }

    fn help(&self) -> &'static str {
        "Add a located element field to the current page class"
    }

    fn params(&self) -> &'static [Param] {
        const PARAMS: &[Param] = &[
            Param::option("named", true, "the element field name"),
            Param::option("findby", true, "the locator, as strategy=value"),
        ];
        PARAMS
    }

    fn execute(&self, ws: &mut Workspace, args: &Arguments) -> Result<Outcome> {
        let named = args.require(self.name(), "named")?;
        let findby = args.require(self.name(), "findby")?;
        let created = pages::add_element(ws, named, findby)?;
        Ok(Outcome {
            message: format!("Created element [{}]", created.field_name),
            value: created.field_name,
            pick_up: None,
        })
    }
}

pub struct PickUp;

impl Command for PickUp {
    fn name(&self) -> &'static str {
        "pick-up"
    }

    fn help(&self) -> &'static str {
        "Select a file as the current resource"
    }

    fn params(&self) -> &'static [Param] {
        const PARAMS: &[Param] = &[Param {
            name: "path",
            required: true,
            positional: true,
            help: "the file to select",
        }];
        PARAMS
    }

    fn execute(&self, ws: &mut Workspace, args: &Arguments) -> Result<Outcome> {
        let raw = PathBuf::from(args.require(self.name(), "path")?);
        let path = if raw.is_absolute() {
            raw
        } else {
            ws.current_dir.join(raw)
        };
        if let Resource::Missing(path) = Resource::classify(&path) {
            return Err(ScaffoldError::ResourceTypeMismatch { path });
        }
        Ok(Outcome {
            message: format!("Picked up [{}]", path.display()),
            value: path.display().to_string(),
            pick_up: Some(path),
        })
    }
}

pub struct CommandTable {
    commands: Vec<Box<dyn Command>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(Box::new(NewPage));
        table.register(Box::new(NewElement));
        table.register(Box::new(PickUp));
        table
    }

    pub fn register(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(|c| c.as_ref())
    }

    /// Runs a command and applies its pick-up signal to the workspace.
    pub fn dispatch(&self, ws: &mut Workspace, name: &str, args: &Arguments) -> Result<Outcome> {
        let command = self.get(name).ok_or_else(|| ScaffoldError::UnknownCommand {
            name: name.to_string(),
        })?;
        for param in command.params().iter().filter(|p| p.required) {
            args.require(name, param.name)?;
        }

        let outcome = command.execute(ws, args)?;
        if let Some(path) = &outcome.pick_up {
            ws.pick_up(path.clone());
        }
        Ok(outcome)
    }

    /// Tokenizes one shell line, parses it with the CLI's subcommand grammar
    /// and dispatches it. Blank lines and a nested `shell` yield `None`.
    pub fn dispatch_line(&self, ws: &mut Workspace, line: &str) -> Result<Option<Outcome>> {
        let tokens = split_command_line(line);
        let Some(name) = tokens.first() else {
            return Ok(None);
        };
        if name != "shell" && self.get(name).is_none() {
            return Err(ScaffoldError::UnknownCommand { name: name.clone() });
        }

        let parsed = ShellLine::try_parse_from(tokens.iter()).map_err(|e| {
            let rendered = e.render().to_string();
            let first = rendered.lines().next().unwrap_or_default();
            ScaffoldError::InvalidArguments {
                command: name.clone(),
                message: first.trim_start_matches("error: ").to_string(),
            }
        })?;
        match parsed.command.invocation() {
            Some((name, args)) => self.dispatch(ws, name, &args).map(Some),
            None => Ok(None),
        }
    }

    pub fn usage(&self) -> String {
        let mut out = String::new();
        for command in self.commands() {
            out.push_str(&format!("{:<12} {}\n", command.name(), command.help()));
            for param in command.params() {
                let flag = if param.positional {
                    format!("<{}>", param.name)
                } else {
                    format!("--{}", param.name)
                };
                let required = if param.required { " (required)" } else { "" };
                out.push_str(&format!("    {flag:<12} {}{required}\n", param.help));
            }
        }
        out
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Splits on whitespace; double quotes group and a backslash escapes the next character.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}
