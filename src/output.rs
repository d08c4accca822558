//! Rendering of command results.
//!
//! People get a short plain-text [`Report`]; scripts (`--json`) get one
//! versioned envelope per invocation, on stdout for both outcomes.

use serde::Serialize;

use crate::error::{Error, JsonError, Result};
use crate::ledger::Rejection;

pub const SCHEMA_VERSION: &str = "missions.v1";

/// Flags that shape every command's output
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Plain-text result of one command: a title line, labelled facts, free
/// lines (task or reward rows), warnings, and commands worth running next.
#[derive(Debug, Clone, Default)]
pub struct Report {
    title: String,
    facts: Vec<(String, String)>,
    lines: Vec<String>,
    warnings: Vec<String>,
    hints: Vec<String>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn fact(&mut self, label: impl Into<String>, value: impl ToString) -> &mut Self {
        self.facts.push((label.into(), value.to_string()));
        self
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    pub fn warn(&mut self, text: impl Into<String>) -> &mut Self {
        self.warnings.push(text.into());
        self
    }

    pub fn hint(&mut self, command: impl Into<String>) -> &mut Self {
        self.hints.push(command.into());
        self
    }

    pub fn render(&self) -> String {
        let mut out = self.title.clone();
        for (label, value) in &self.facts {
            out.push_str(&format!("\n  {label}: {value}"));
        }
        if !self.lines.is_empty() {
            out.push('\n');
            for line in &self.lines {
                out.push_str(&format!("\n  {line}"));
            }
        }
        for warning in &self.warnings {
            out.push_str(&format!("\nwarning: {warning}"));
        }
        for hint in &self.hints {
            out.push_str(&format!("\nnext: {hint}"));
        }
        out
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
    #[serde(skip_serializing_if = "is_empty")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    next_steps: &'a [String],
}

fn is_empty(items: &&[String]) -> bool {
    items.is_empty()
}

impl<T: Serialize> Envelope<'_, T> {
    fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    report: &Report,
) -> Result<()> {
    if options.json {
        return Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data: Some(data),
            error: None,
            warnings: &report.warnings,
            next_steps: &report.hints,
        }
        .print();
    }

    if !options.quiet {
        println!("{}", report.render());
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hints = recovery_hints(err);
    if json {
        return Envelope::<()> {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            data: None,
            error: Some(JsonError::from(err)),
            warnings: &[],
            next_steps: &hints,
        }
        .print();
    }

    match err.rejection() {
        Some(rejection) => {
            eprintln!("rejected: {rejection}");
            if let Rejection::InsufficientBalance { balance, cost } = rejection {
                eprintln!("  {} more coins needed", cost.saturating_sub(*balance));
            }
        }
        None => eprintln!("error: {err}"),
    }
    for hint in &hints {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Subcommand name for labelling errors, found before clap parses: the
/// first argument that is neither a flag nor a global flag's value.
pub fn command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if matches!(arg.as_str(), "--dir" | "--config" | "--account" | "--events") {
            args.next();
        } else if !arg.starts_with('-') {
            return arg;
        }
    }
    "missions".to_string()
}

/// Text progress bar, e.g. `[#####.....] 50%`.
pub fn progress_bar(percent: u8, width: usize) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * width / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        ".".repeat(width - filled),
        percent
    )
}

fn recovery_hints(err: &Error) -> Vec<String> {
    let hint = match err {
        Error::NotLoggedIn | Error::AccountNotFound(_) => "missions login <account> --name \"...\"",
        Error::Rejected(
            Rejection::UnknownTask(_) | Rejection::TaskNotCompleted(_) | Rejection::EmptyArtifact,
        ) => "missions tasks",
        Error::Rejected(_) => "missions rewards",
        Error::InvalidConfig(_) => "fix .missions.toml then retry",
        _ => return Vec::new(),
    };
    vec![hint.to_string()]
}
