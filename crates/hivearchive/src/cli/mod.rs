//! Command-line interface for hivearchive.
//!
//! This module provides the CLI structure, list rendering, and the interactive
//! session used by the `hive` binary.

mod commands;
mod render;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DownloadCommand, ListCommand, OutputFormat, ReadCommand, StatusCommand,
    UploadCommand,
};
pub use render::{render, NO_MATCHES};
pub use session::{Session, SessionCommand, DOWNLOAD_FAILED, SPEECH_UNSUPPORTED, UPLOAD_OK};

/// hive - Welcome to the Hive Archives
///
/// Upload short texts to a shared realtime database, browse the latest ten,
/// search them, save them as files, or have them read aloud.
#[derive(Debug, Parser)]
#[command(name = "hive")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the most recent texts
    List(ListCommand),

    /// Upload a text
    Upload(UploadCommand),

    /// Save a listed text as a file
    Download(DownloadCommand),

    /// Read a listed text aloud
    Read(ReadCommand),

    /// Browse, search and upload interactively
    Browse,

    /// Show store and host capability status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Browse,
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "hive");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli(0, true).verbosity(), crate::logging::Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), crate::logging::Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), crate::logging::Verbosity::Verbose);
        assert_eq!(cli(3, false).verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_with_search() {
        let cli = Cli::try_parse_from(["hive", "list", "-s", "alpha", "-f", "json"]).unwrap();
        match cli.command {
            Command::List(cmd) => {
                assert_eq!(cmd.search.as_deref(), Some("alpha"));
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_upload_text_optional() {
        let cli = Cli::try_parse_from(["hive", "upload", "hello there"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Upload(UploadCommand { text: Some(ref t) }) if t == "hello there"
        ));

        let cli = Cli::try_parse_from(["hive", "upload"]).unwrap();
        assert!(matches!(cli.command, Command::Upload(UploadCommand { text: None })));
    }

    #[test]
    fn test_parse_download() {
        let cli = Cli::try_parse_from(["hive", "download", "3", "-o", "/tmp/out"]).unwrap();
        match cli.command {
            Command::Download(cmd) => {
                assert_eq!(cmd.row, 3);
                assert_eq!(cmd.output, Some(PathBuf::from("/tmp/out")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_read_requires_row() {
        assert!(Cli::try_parse_from(["hive", "read"]).is_err());
        assert!(Cli::try_parse_from(["hive", "read", "1"]).is_ok());
    }

    #[test]
    fn test_parse_with_config_and_verbose() {
        let cli = Cli::try_parse_from(["hive", "-c", "/custom/config.toml", "-vv", "browse"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_status_json() {
        let cli = Cli::try_parse_from(["hive", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }
}
