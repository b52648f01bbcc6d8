use std::path::PathBuf;

use anyhow::{Context, bail};
use va_core::AnalysisStep;

/// One line typed at the workbench prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkbenchCommand {
    Empty,
    List,
    /// List index (1-based) or session id.
    Open(String),
    Step(AnalysisStep),
    Run,
    Files,
    /// List index (1-based) or static path.
    File(String),
    Add(PathBuf),
    Remove(String),
    Cite(usize),
    Report,
    Status,
    Back,
    Help,
    Quit,
}

pub const HELP: &str = "\
  list | ls            list sessions
  open <n|id>          open a session and start polling it
  step <name|1-5>      select an analysis step
  run                  start (or re-run) the selected step
  report               show the selected step's report
  status               show the session overview
  files                list the session's documents
  file <n|path>        show a document in the viewer
  add <path>           upload a document (new session if none is open)
  rm <n|name>          delete a document
  cite <n>             jump the viewer to citation n
  back                 close the session
  help                 show this help
  quit | exit          leave the workbench";

impl WorkbenchCommand {
    /// Parse one input line. Command words are case-insensitive.
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let command = match word.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "list" | "ls" => no_argument(Self::List, rest)?,
            "open" => Self::Open(required(rest, "open <n|id>")?),
            "step" => Self::Step(
                required(rest, "step <name|1-5>")?.parse::<AnalysisStep>()?,
            ),
            "run" => no_argument(Self::Run, rest)?,
            "files" => no_argument(Self::Files, rest)?,
            "file" => Self::File(required(rest, "file <n|path>")?),
            "add" => Self::Add(PathBuf::from(required(rest, "add <path>")?)),
            "rm" | "delete" => Self::Remove(required(rest, "rm <n|name>")?),
            "cite" => Self::Cite(
                required(rest, "cite <n>")?
                    .trim_start_matches('^')
                    .parse()
                    .context("citation number must be a positive integer")?,
            ),
            "report" | "show" => no_argument(Self::Report, rest)?,
            "status" => no_argument(Self::Status, rest)?,
            "back" | "close" => no_argument(Self::Back, rest)?,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(command)
    }
}

fn required(rest: &str, usage: &str) -> anyhow::Result<String> {
    if rest.is_empty() {
        bail!("usage: {usage}");
    }
    Ok(rest.to_string())
}

fn no_argument(command: WorkbenchCommand, rest: &str) -> anyhow::Result<WorkbenchCommand> {
    if !rest.is_empty() {
        bail!("unexpected argument '{rest}'");
    }
    Ok(command)
}
