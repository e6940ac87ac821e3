//! macOS-specific implementation for hivearchive.
//!
//! This crate provides macOS host integrations for the hivearchive project,
//! currently speech synthesis through the system `say` command.

#![cfg(target_os = "macos")]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod speech;

pub use speech::{find_speech_engine, voice_for_language, SpeechEngine, SpeechRequest};

/// Get the platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    "macOS"
}
