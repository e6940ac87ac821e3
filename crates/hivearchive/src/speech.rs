//! Reading records aloud.
//!
//! Speech is an optional host capability. [`probe`] checks for it explicitly
//! and returns a [`Speaker`] handle only when the host has an engine; the
//! [`Narrator`] turns a missing engine into a logged warning instead of an
//! error.

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::SpeechConfig;
use crate::error::{Error, Result};

/// Capability name used in errors and logs.
const CAPABILITY: &str = "speech synthesis";

/// Something that can read text aloud.
#[async_trait]
pub trait Speaker: Send + Sync + Debug {
    /// Engine name for status output.
    fn name(&self) -> &str;

    /// Speak `text` in the given BCP 47 language, returning when done.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCapability`] if the engine cannot run.
    async fn speak(&self, text: &str, language: &str) -> Result<()>;
}

/// Check whether the host can speak, honoring the configuration switch.
#[must_use]
pub fn probe(config: &SpeechConfig) -> Option<Box<dyn Speaker>> {
    if !config.enabled {
        debug!("Speech disabled by configuration");
        return None;
    }
    host::probe()
}

/// Reads records aloud with a fixed language, if a speaker is available.
#[derive(Debug)]
pub struct Narrator {
    speaker: Option<Box<dyn Speaker>>,
    language: String,
}

impl Narrator {
    /// Create a narrator around an optional speaker.
    #[must_use]
    pub fn new(speaker: Option<Box<dyn Speaker>>, language: impl Into<String>) -> Self {
        Self {
            speaker,
            language: language.into(),
        }
    }

    /// Probe the host and build a narrator from the configuration.
    #[must_use]
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(probe(config), config.language.clone())
    }

    /// Whether a speaker is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.speaker.is_some()
    }

    /// Name of the speaker in use, if any.
    #[must_use]
    pub fn speaker_name(&self) -> Option<&str> {
        self.speaker.as_deref().map(|s| s.name())
    }

    /// The language tag passed to the speaker.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Read `text` aloud.
    ///
    /// Without a speaker this only logs a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCapability`] if the speaker fails.
    pub async fn speak(&self, text: &str) -> Result<()> {
        match &self.speaker {
            Some(speaker) => speaker.speak(text, &self.language).await,
            None => {
                warn!("Speech synthesis is not supported on this host");
                Ok(())
            }
        }
    }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
mod host {
    use std::process::Stdio;

    use async_trait::async_trait;
    use tokio::io::AsyncWriteExt;
    use tracing::debug;

    #[cfg(target_os = "linux")]
    use hivearchive_linux as platform;
    #[cfg(target_os = "macos")]
    use hivearchive_mac as platform;

    use super::{Error, Result, Speaker, CAPABILITY};

    /// Speaker backed by the platform's command-line engine.
    #[derive(Debug)]
    pub struct HostSpeaker {
        engine: platform::SpeechEngine,
    }

    pub fn probe() -> Option<Box<dyn Speaker>> {
        platform::find_speech_engine().map(|engine| {
            debug!("Speech engine available: {}", engine.name());
            Box::new(HostSpeaker { engine }) as Box<dyn Speaker>
        })
    }

    #[async_trait]
    impl Speaker for HostSpeaker {
        fn name(&self) -> &str {
            self.engine.name()
        }

        async fn speak(&self, text: &str, language: &str) -> Result<()> {
            let request = self.engine.request(text, language);
            let mut command = tokio::process::Command::from(request.command);
            command.stdout(Stdio::null()).stderr(Stdio::piped());
            if request.stdin.is_some() {
                command.stdin(Stdio::piped());
            } else {
                command.stdin(Stdio::null());
            }

            let mut child = command
                .spawn()
                .map_err(|e| Error::unsupported(CAPABILITY, format!("{}: {e}", self.name())))?;

            if let (Some(input), Some(mut pipe)) = (request.stdin, child.stdin.take()) {
                pipe.write_all(input.as_bytes())
                    .await
                    .map_err(|e| Error::unsupported(CAPABILITY, e.to_string()))?;
                // Dropping the pipe closes it so the engine sees end of input
                drop(pipe);
            }

            let output = child
                .wait_with_output()
                .await
                .map_err(|e| Error::unsupported(CAPABILITY, e.to_string()))?;

            if output.status.success() {
                Ok(())
            } else {
                Err(Error::unsupported(
                    CAPABILITY,
                    format!(
                        "{} exited with {}: {}",
                        self.name(),
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    ),
                ))
            }
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod host {
    use super::Speaker;

    pub fn probe() -> Option<Box<dyn Speaker>> {
        tracing::debug!("No speech engine integration for this platform");
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Spoken = Arc<Mutex<Vec<(String, String)>>>;

    #[derive(Debug, Default)]
    struct RecordingSpeaker {
        spoken: Spoken,
        fail: bool,
    }

    #[async_trait]
    impl Speaker for RecordingSpeaker {
        fn name(&self) -> &str {
            "recording"
        }

        async fn speak(&self, text: &str, language: &str) -> Result<()> {
            if self.fail {
                return Err(Error::unsupported(CAPABILITY, "engine crashed"));
            }
            self.spoken
                .lock()
                .unwrap()
                .push((text.to_string(), language.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_probe_respects_disabled() {
        let config = SpeechConfig {
            enabled: false,
            language: "pt-BR".to_string(),
        };
        assert!(probe(&config).is_none());
    }

    #[tokio::test]
    async fn test_narrator_without_speaker_is_noop() {
        let narrator = Narrator::new(None, "pt-BR");
        assert!(!narrator.is_available());
        assert!(narrator.speaker_name().is_none());
        assert!(narrator.speak("olá").await.is_ok());
    }

    #[tokio::test]
    async fn test_narrator_passes_fixed_language() {
        let spoken = Spoken::default();
        let speaker = RecordingSpeaker {
            spoken: Arc::clone(&spoken),
            fail: false,
        };
        let narrator = Narrator::new(Some(Box::new(speaker)), "pt-BR");
        assert!(narrator.is_available());
        assert_eq!(narrator.speaker_name(), Some("recording"));

        narrator.speak("bom dia").await.unwrap();
        narrator.speak("boa noite").await.unwrap();

        let spoken = spoken.lock().unwrap();
        assert_eq!(
            *spoken,
            vec![
                ("bom dia".to_string(), "pt-BR".to_string()),
                ("boa noite".to_string(), "pt-BR".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_narrator_reports_speaker_failure() {
        let speaker = RecordingSpeaker {
            fail: true,
            ..RecordingSpeaker::default()
        };
        let narrator = Narrator::new(Some(Box::new(speaker)), "pt-BR");
        let err = narrator.speak("x").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedCapability { .. }));
    }
}
