//! Interactive browsing session.
//!
//! Reads one line at a time. Plain lines are uploaded; lines starting with `/`
//! are commands. A leading `//` uploads the rest of the line with one slash
//! removed.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use super::render::render;
use super::OutputFormat;
use crate::error::Result;
use crate::export::{export_as_file, FileSaver};
use crate::speech::Narrator;
use crate::store::RecordStore;
use crate::view::ViewModel;

/// Printed after a successful upload.
pub const UPLOAD_OK: &str = "Text uploaded successfully!";

/// Printed when reading aloud is requested on a host without a speech engine.
pub const SPEECH_UNSUPPORTED: &str = "Speech synthesis is not supported on this host.";

/// Printed when an export fails.
pub const DOWNLOAD_FAILED: &str = "Failed to download text. Please try again.";

const HELP: &str = "\
Type text and press Enter to upload it.
  /search TERM   filter by TERM (case-insensitive)
  /clear         clear the search
  /list          show the records again
  /refresh       reload the latest records
  /download N    save row N as a text file
  /read N        read row N aloud
  /help          show this help
  /quit          leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Upload the text.
    Upload(String),
    /// Set the search term.
    Search(String),
    /// Reprint the visible list.
    List,
    /// Reload from the store.
    Refresh,
    /// Export a visible row.
    Download(usize),
    /// Speak a visible row.
    Read(usize),
    /// Show help.
    Help,
    /// End the session.
    Quit,
    /// Input that could not be understood.
    Invalid(String),
}

impl SessionCommand {
    /// Parse one input line (without its trailing newline).
    #[must_use]
    pub fn parse(line: &str) -> Self {
        if let Some(escaped) = line.strip_prefix("//") {
            return Self::Upload(format!("/{escaped}"));
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Upload(line.to_string());
        };

        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(n, a)| (n, a.trim()));

        match name {
            "search" | "s" => Self::Search(arg.to_string()),
            "clear" => Self::Search(String::new()),
            "list" | "ls" => Self::List,
            "refresh" | "r" => Self::Refresh,
            "download" | "d" => Self::parse_row(arg).map_or_else(
                || Self::Invalid(format!("usage: /download N (got '{arg}')")),
                Self::Download,
            ),
            "read" => Self::parse_row(arg).map_or_else(
                || Self::Invalid(format!("usage: /read N (got '{arg}')")),
                Self::Read,
            ),
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command '/{other}', try /help")),
        }
    }

    fn parse_row(arg: &str) -> Option<usize> {
        arg.parse().ok().filter(|&row| row > 0)
    }
}

/// A browsing session over a view model and its collaborators.
#[derive(Debug)]
pub struct Session<S, F> {
    view: ViewModel<S>,
    narrator: Narrator,
    saver: F,
}

impl<S: RecordStore, F: FileSaver> Session<S, F> {
    /// Create a session. The view should already be initialized.
    pub fn new(view: ViewModel<S>, narrator: Narrator, saver: F) -> Self {
        Self {
            view,
            narrator,
            saver,
        }
    }

    /// The view model driving the session.
    #[must_use]
    pub fn view(&self) -> &ViewModel<S> {
        &self.view
    }

    /// Run until `/quit` or end of input.
    ///
    /// Store, export and speech failures are reported on `out` and the session
    /// continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "Welcome to the Hive Archives. Type /help for commands.")?;
        self.print_list(out)?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let command = SessionCommand::parse(line.trim_end_matches('\r'));
            if command == SessionCommand::Quit {
                break;
            }
            self.handle(command, out).await?;
        }
        Ok(())
    }

    async fn handle<W: Write>(&mut self, command: SessionCommand, out: &mut W) -> Result<()> {
        match command {
            SessionCommand::Upload(text) => match self.view.submit(&text).await {
                Ok(Some(_)) => {
                    writeln!(out, "{UPLOAD_OK}")?;
                    self.refresh(out).await?;
                    self.print_list(out)?;
                }
                Ok(None) => {}
                Err(err) => writeln!(out, "Upload failed: {err}")?,
            },
            SessionCommand::Search(term) => {
                self.view.set_search_term(term);
                self.print_list(out)?;
            }
            SessionCommand::List => self.print_list(out)?,
            SessionCommand::Refresh => {
                self.refresh(out).await?;
                self.print_list(out)?;
            }
            SessionCommand::Download(row) => self.download(row, out)?,
            SessionCommand::Read(row) => self.read(row, out).await?,
            SessionCommand::Help => writeln!(out, "{HELP}")?,
            SessionCommand::Invalid(message) => writeln!(out, "{message}")?,
            SessionCommand::Quit => {}
        }
        Ok(())
    }

    async fn refresh<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if let Err(err) = self.view.refresh().await {
            writeln!(out, "Could not load records: {err}")?;
        }
        Ok(())
    }

    fn print_list<W: Write>(&self, out: &mut W) -> Result<()> {
        render(out, &self.view.visible_records(), OutputFormat::Plain)
    }

    fn download<W: Write>(&self, row: usize, out: &mut W) -> Result<()> {
        let record = match self.view.visible_row(row) {
            Ok(record) => record,
            Err(err) => {
                writeln!(out, "{err}")?;
                return Ok(());
            }
        };
        match self.saver.save(&export_as_file(record)) {
            Ok(path) => writeln!(out, "Saved {}", path.display())?,
            Err(err) => {
                warn!("Error downloading text: {err}");
                writeln!(out, "{DOWNLOAD_FAILED}")?;
            }
        }
        Ok(())
    }

    async fn read<W: Write>(&self, row: usize, out: &mut W) -> Result<()> {
        let record = match self.view.visible_row(row) {
            Ok(record) => record,
            Err(err) => {
                writeln!(out, "{err}")?;
                return Ok(());
            }
        };
        if !self.narrator.is_available() {
            writeln!(out, "{SPEECH_UNSUPPORTED}")?;
            return Ok(());
        }
        if let Err(err) = self.narrator.speak(&record.text).await {
            warn!("{err}");
            writeln!(out, "Could not read the text aloud.")?;
        }
        Ok(())
    }
}
