//! Linux-specific implementation for hivearchive
//!
//! Speech synthesis on Linux goes through whichever command-line engine is
//! installed: Speech Dispatcher (`spd-say`) first, then eSpeak NG, then the
//! classic eSpeak.

#![cfg(target_os = "linux")]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

/// Supported speech engines, in order of preference.
const ENGINES: &[EngineKind] = &[EngineKind::SpdSay, EngineKind::EspeakNg, EngineKind::Espeak];

/// Get platform name
#[must_use]
pub fn platform_name() -> &'static str {
    "Linux"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineKind {
    SpdSay,
    EspeakNg,
    Espeak,
}

impl EngineKind {
    fn program(self) -> &'static str {
        match self {
            Self::SpdSay => "spd-say",
            Self::EspeakNg => "espeak-ng",
            Self::Espeak => "espeak",
        }
    }
}

/// A ready-to-run speech command.
#[derive(Debug)]
pub struct SpeechRequest {
    /// The command to spawn.
    pub command: Command,
    /// Text to write to the child's stdin, if the engine reads it from there.
    pub stdin: Option<String>,
}

/// An installed speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechEngine {
    kind: EngineKind,
    program: PathBuf,
}

impl SpeechEngine {
    /// Engine name, e.g. `espeak-ng`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.program()
    }

    /// Full path of the engine binary.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the command that reads `text` aloud in `language`.
    ///
    /// `language` is a BCP 47 tag such as `pt-BR`.
    #[must_use]
    pub fn request(&self, text: &str, language: &str) -> SpeechRequest {
        let mut command = Command::new(&self.program);
        match self.kind {
            // -w waits until the message has been spoken
            EngineKind::SpdSay => {
                command.args(["-w", "-l", language, "--", text]);
            }
            EngineKind::EspeakNg | EngineKind::Espeak => {
                command.args(["-v", &language.to_ascii_lowercase(), "--", text]);
            }
        }
        SpeechRequest {
            command,
            stdin: None,
        }
    }
}

/// Find the preferred speech engine on `PATH`.
#[must_use]
pub fn find_speech_engine() -> Option<SpeechEngine> {
    let path = std::env::var_os("PATH")?;
    find_speech_engine_in(&path)
}

/// Find the preferred speech engine in a `PATH`-style list of directories.
#[must_use]
pub fn find_speech_engine_in(search_path: &OsStr) -> Option<SpeechEngine> {
    for &kind in ENGINES {
        if let Some(program) = find_in_path(kind.program(), search_path) {
            debug!("Found speech engine {}", program.display());
            return Some(SpeechEngine { kind, program });
        }
    }
    debug!("No speech engine found on PATH");
    None
}

fn find_in_path(program: &str, search_path: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
