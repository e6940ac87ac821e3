//! Speech synthesis via the macOS `say` command.
//!
//! `say` has no language flag; the language is chosen through the voice. The
//! installed voices are listed by `say -v '?'`, one per line:
//!
//! ```text
//! Luciana             pt_BR    # Olá, o meu nome é Luciana e sou uma voz portuguesa.
//! ```

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Location of the system speech command.
const SAY_PATH: &str = "/usr/bin/say";

/// A ready-to-run speech command.
#[derive(Debug)]
pub struct SpeechRequest {
    /// The command to spawn.
    pub command: Command,
    /// Text to write to the child's stdin, if the engine reads it from there.
    pub stdin: Option<String>,
}

/// The system speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechEngine {
    program: PathBuf,
    voices: String,
}

impl SpeechEngine {
    /// Engine name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        "say"
    }

    /// Full path of the engine binary.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the command that reads `text` aloud in `language`.
    ///
    /// Falls back to the default system voice when no installed voice matches
    /// the language. The text is passed on stdin so it is never parsed as an
    /// option.
    #[must_use]
    pub fn request(&self, text: &str, language: &str) -> SpeechRequest {
        let mut command = Command::new(&self.program);
        match voice_for_language(&self.voices, language) {
            Some(voice) => {
                command.args(["-v", &voice]);
            }
            None => warn!("No installed voice for {language}; using the system default"),
        }
        command.args(["-f", "-"]);
        SpeechRequest {
            command,
            stdin: Some(text.to_string()),
        }
    }
}

/// Probe for the `say` command and its installed voices.
#[must_use]
pub fn find_speech_engine() -> Option<SpeechEngine> {
    let program = PathBuf::from(SAY_PATH);
    if !program.is_file() {
        debug!("{SAY_PATH} not found");
        return None;
    }

    let voices = Command::new(&program)
        .args(["-v", "?"])
        .stderr(Stdio::null())
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).into_owned())
        .unwrap_or_default();

    Some(SpeechEngine { program, voices })
}

/// Pick the first voice whose locale matches a BCP 47 tag.
///
/// An exact locale match (`pt-BR` = `pt_BR`) wins over a language-only match
/// (`pt`).
#[must_use]
pub fn voice_for_language(listing: &str, language: &str) -> Option<String> {
    let wanted = language.replace('-', "_").to_ascii_lowercase();
    let wanted_lang = wanted.split('_').next().unwrap_or_default().to_string();

    let voices: Vec<(String, String)> = listing.lines().filter_map(parse_voice_line).collect();

    voices
        .iter()
        .find(|(_, locale)| locale.to_ascii_lowercase() == wanted)
        .or_else(|| {
            voices.iter().find(|(_, locale)| {
                locale.to_ascii_lowercase().split('_').next() == Some(wanted_lang.as_str())
            })
        })
        .map(|(name, _)| name.clone())
}

/// Split a listing line into (voice name, locale).
///
/// Voice names may contain spaces, so the locale is the last token before `#`.
fn parse_voice_line(line: &str) -> Option<(String, String)> {
    let head = line.split('#').next()?.trim_end();
    let (name, locale) = head.rsplit_once(char::is_whitespace)?;
    let name = name.trim();
    if name.is_empty() || !locale.contains('_') {
        return None;
    }
    Some((name.to_string(), locale.to_string()))
}
