//! `valan open`: an interactive loop over one session view.
//!
//! A single [`SessionSynchronizer`] owns the view; opening another session,
//! uploading into a fresh one or going back always replaces its poller, so at
//! most one session is polled at a time. A background task prints a notice
//! whenever the selected step changes status.

mod command;

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use va_client::{BackendClient, file_name_of};
use va_core::{AnalysisStep, Language, StepStatus};
use va_sync::{SessionSynchronizer, ViewState};

use crate::cli::root_commands::OpenArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::sessions::list_rows;
use crate::commands::shared::report::{StepReport, ViewerLink};
use crate::commands::shared::views::resolve_index_or_value;
use crate::context::AppContext;
use crate::messages::Message;
use crate::output::render;
use crate::ui;

pub use command::{HELP, WorkbenchCommand};

const PROMPT: &str = "valan> ";

/// Handle `valan open`.
pub async fn handle(args: &OpenArgs, ctx: &AppContext, _flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut bench = Workbench::new(ctx);
    let notifier = spawn_notifier(&bench.sync, ctx.lang);

    if let Some(session) = &args.session {
        if let Err(error) = bench.execute(WorkbenchCommand::Open(session.clone())).await {
            eprintln!("error: {error:#}");
        }
    } else {
        println!("{HELP}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write_prompt(&mut std::io::stdout()).context("failed to write prompt")?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        let command = match WorkbenchCommand::parse(&line) {
            Ok(WorkbenchCommand::Quit) => break,
            Ok(command) => command,
            Err(error) => {
                eprintln!("error: {error:#}");
                continue;
            }
        };
        if let Err(error) = bench.execute(command).await {
            eprintln!("error: {error:#}");
        }
    }

    notifier.abort();
    bench.sync.stop_polling();
    Ok(())
}

struct Workbench<'a> {
    ctx: &'a AppContext,
    sync: SessionSynchronizer<BackendClient>,
    /// Session ids from the last `list`, for `open <n>`.
    listed: Vec<String>,
    color: bool,
}

impl<'a> Workbench<'a> {
    fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            sync: ctx.synchronizer(),
            listed: Vec::new(),
            color: ui::prefs().report_color,
        }
    }

    const fn lang(&self) -> Language {
        self.ctx.lang
    }

    async fn execute(&mut self, command: WorkbenchCommand) -> anyhow::Result<()> {
        match command {
            WorkbenchCommand::Empty | WorkbenchCommand::Quit => {}
            WorkbenchCommand::Help => println!("{HELP}"),
            WorkbenchCommand::List => self.list().await?,
            WorkbenchCommand::Open(target) => self.open(&target).await?,
            WorkbenchCommand::Step(step) => {
                self.sync.select_step(step);
                self.print_body()?;
            }
            WorkbenchCommand::Run => self.run().await?,
            WorkbenchCommand::Files => self.files()?,
            WorkbenchCommand::File(target) => self.file(&target)?,
            WorkbenchCommand::Add(path) => self.add(&path).await?,
            WorkbenchCommand::Remove(target) => self.remove(&target).await?,
            WorkbenchCommand::Cite(ordinal) => self.cite(ordinal)?,
            WorkbenchCommand::Report => self.print_body()?,
            WorkbenchCommand::Status => {
                let (report, state) = self.report()?;
                println!("{}", report.render_overview(state.current_file.as_deref()));
            }
            WorkbenchCommand::Back => {
                self.sync.close_session();
                self.list().await?;
            }
        }
        Ok(())
    }

    async fn list(&mut self) -> anyhow::Result<()> {
        let rows = list_rows(self.ctx).await?;
        self.listed = rows.iter().map(|row| row.id.clone()).collect();
        let numbered: Vec<serde_json::Value> = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                serde_json::json!({
                    "#": index + 1,
                    "title": row.title,
                    "date": row.date,
                    "status": row.status,
                    "id": row.id,
                })
            })
            .collect();
        println!("{}", render(&numbered, OutputFormat::Table)?);
        Ok(())
    }

    async fn open(&self, target: &str) -> anyhow::Result<()> {
        let session_id = resolve_index_or_value(target, &self.listed);
        self.sync.open_session(&session_id);

        let mut rx = self.sync.subscribe();
        let wait = self.ctx.config.polling.interval() + Duration::from_secs(5);
        let loaded = tokio::time::timeout(wait, rx.wait_for(|state| state.session.is_some()))
            .await
            .is_ok_and(|result| result.is_ok());
        if !loaded {
            bail!("{} ({session_id})", Message::LoadFailed.text(self.lang()));
        }

        let (report, state) = self.report()?;
        println!("{}", report.render_human(state.current_file.as_deref(), self.color));
        Ok(())
    }

    async fn run(&self) -> anyhow::Result<()> {
        let state = self.sync.snapshot();
        let session_id = self.require_session(&state)?;
        if state.is_analyzing() {
            println!("{}", Message::AnalysisAlreadyRunning.text(self.lang()));
            return Ok(());
        }

        let response = self
            .ctx
            .client
            .analyze(&session_id, state.current_step)
            .await
            .with_context(|| Message::AnalyzeFailed.text(self.lang()))?;
        let message = if response.already_running() {
            Message::AnalysisAlreadyRunning
        } else {
            Message::AnalysisStarted
        };
        println!("{} ({})", message.text(self.lang()), state.current_step.title(self.lang()));
        Ok(())
    }

    fn files(&self) -> anyhow::Result<()> {
        let (report, state) = self.report()?;
        if report.files.is_empty() {
            println!("{}", Message::NoFiles.text(self.lang()));
        }
        for (index, file) in report.files.iter().enumerate() {
            let marker = if state.current_file.as_deref() == Some(file.as_str()) { '*' } else { ' ' };
            println!("{marker} {}. {}", index + 1, file_name_of(file));
        }
        Ok(())
    }

    fn file(&self, target: &str) -> anyhow::Result<()> {
        let state = self.sync.snapshot();
        let files = self.session_files(&state)?;
        let file = resolve_file(target, &files)
            .with_context(|| format!("no document '{target}' in this session"))?;
        self.sync.select_file(&file);
        self.print_viewer();
        Ok(())
    }

    async fn add(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let state = self.sync.snapshot();
        let Some(session_id) = state.session_id else {
            let response = self
                .ctx
                .client
                .upload(path)
                .await
                .with_context(|| Message::UploadFailed.text(self.lang()))?;
            let file_name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
            self.sync.adopt_upload(&response.session_id, &file_name);
            println!("{} ({})", Message::UploadSucceeded.text(self.lang()), response.session_id);
            return Ok(());
        };

        self.ctx
            .client
            .add_file(&session_id, path)
            .await
            .with_context(|| Message::AddFileFailed.text(self.lang()))?;
        println!("{}", Message::FileAdded.text(self.lang()));
        Ok(())
    }

    async fn remove(&self, target: &str) -> anyhow::Result<()> {
        let state = self.sync.snapshot();
        let session_id = self.require_session(&state)?;
        let files = self.session_files(&state)?;
        let file = resolve_file(target, &files).unwrap_or_else(|| target.to_string());

        self.ctx
            .client
            .delete_file(&session_id, &file)
            .await
            .with_context(|| Message::DeleteFailed.text(self.lang()))?;
        println!("{} ({})", Message::FileDeleted.text(self.lang()), file_name_of(&file));
        Ok(())
    }

    fn cite(&self, ordinal: usize) -> anyhow::Result<()> {
        let (report, _) = self.report()?;
        let citation = report
            .citation(ordinal)
            .with_context(|| format!("{} (^{ordinal})", Message::CitationNotFound.text(self.lang())))?;
        self.sync.open_citation(citation);
        self.print_viewer();
        Ok(())
    }

    fn print_body(&self) -> anyhow::Result<()> {
        let (report, _) = self.report()?;
        println!("{}", report.render_body(self.color));
        Ok(())
    }

    fn print_viewer(&self) {
        if let Some(link) = ViewerLink::from_state(&self.sync.snapshot(), &self.ctx.client) {
            println!("{}", link.url);
        }
    }

    fn report(&self) -> anyhow::Result<(StepReport, ViewState)> {
        let state = self.sync.snapshot();
        self.require_session(&state)?;
        let report = StepReport::from_state(&state, &self.ctx.client, self.lang())
            .with_context(|| Message::Waiting.text(self.lang()))?;
        Ok((report, state))
    }

    fn require_session(&self, state: &ViewState) -> anyhow::Result<String> {
        state
            .session_id
            .clone()
            .with_context(|| Message::NoSessionOpen.text(self.lang()))
    }

    fn session_files(&self, state: &ViewState) -> anyhow::Result<Vec<String>> {
        self.require_session(state)?;
        Ok(state
            .session
            .as_ref()
            .map(|session| session.file_paths.clone())
            .unwrap_or_default())
    }
}

/// Resolve a 1-based index, a full static path or a bare file name against
/// the session's files.
fn resolve_file(target: &str, files: &[String]) -> Option<String> {
    let resolved = resolve_index_or_value(target, files);
    files
        .iter()
        .find(|file| **file == resolved || file_name_of(file) == resolved)
        .cloned()
}

fn write_prompt(out: &mut impl Write) -> std::io::Result<()> {
    out.write_all(PROMPT.as_bytes())?;
    out.flush()
}

/// Print a line whenever the selected step of the open session changes status.
fn spawn_notifier(sync: &SessionSynchronizer<BackendClient>, lang: Language) -> JoinHandle<()> {
    let mut rx = sync.subscribe();
    tokio::spawn(async move {
        let mut last = step_key(&rx.borrow());
        while rx.changed().await.is_ok() {
            let current = step_key(&rx.borrow_and_update());
            if let (Some((id, step, before)), Some((now_id, now_step, now))) = (&last, &current)
                && id == now_id
                && step == now_step
                && before != now
            {
                println!();
                println!("[{}] {} -> {}", step.title(lang), before.label(lang), now.label(lang));
                if let Err(error) = write_prompt(&mut std::io::stdout()) {
                    tracing::debug!(%error, "failed to redraw prompt");
                }
            }
            last = current;
        }
    })
}

fn step_key(state: &ViewState) -> Option<(String, AnalysisStep, StepStatus)> {
    let session = state.session.as_ref()?;
    Some((session.id.clone(), state.current_step, session.status(state.current_step)))
}

#[cfg(test)]
mod tests {
    use va_core::{AnalysisSession, StepRecord};

    use super::*;

    fn files() -> Vec<String> {
        vec![
            "/static/knowledge/a.pdf".to_string(),
            "/static/knowledge/b.pdf".to_string(),
        ]
    }

    #[test]
    fn file_resolves_by_index_path_or_name() {
        let files = files();
        assert_eq!(resolve_file("2", &files).as_deref(), Some("/static/knowledge/b.pdf"));
        assert_eq!(
            resolve_file("/static/knowledge/a.pdf", &files).as_deref(),
            Some("/static/knowledge/a.pdf")
        );
        assert_eq!(resolve_file("b.pdf", &files).as_deref(), Some("/static/knowledge/b.pdf"));
        assert!(resolve_file("c.pdf", &files).is_none());
        assert!(resolve_file("3", &files).is_none());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn prompt_is_written_and_flushed() {
        let mut out = Vec::new();
        write_prompt(&mut out).unwrap();
        assert_eq!(out, b"valan> ");
    }

    #[test]
    fn prompt_flush_failure_is_reported() {
        let err = write_prompt(&mut BrokenPipe).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn step_key_tracks_selected_step_status() {
        assert!(step_key(&ViewState::default()).is_none());

        let mut session = AnalysisSession::new("s-1", "now");
        session.set_step(StepRecord::with_output(
            AnalysisStep::Valuation,
            StepStatus::Running,
            None,
        ));
        let state = ViewState::with_session(session, AnalysisStep::Valuation);
        assert_eq!(
            step_key(&state),
            Some(("s-1".to_string(), AnalysisStep::Valuation, StepStatus::Running))
        );
    }
}
