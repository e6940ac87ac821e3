//! Exporting records as text files.
//!
//! [`export_as_file`] is pure: it only produces the bytes and a suggested
//! name. Writing them somewhere is the job of a [`FileSaver`].

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::record::Record;

/// A record rendered as a downloadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// File contents (the record text as UTF-8).
    pub bytes: Vec<u8>,
    /// Suggested file name, `text-<id>.txt`.
    pub suggested_name: String,
}

/// Render a record as file bytes plus a name derived from its id.
#[must_use]
pub fn export_as_file(record: &Record) -> ExportedFile {
    ExportedFile {
        bytes: record.text.as_bytes().to_vec(),
        suggested_name: format!("text-{}.txt", sanitize_id(&record.id)),
    }
}

/// Keep ids safe to use as a path component.
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Host-level save action for exported files.
pub trait FileSaver {
    /// Save the file, returning where it ended up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExportFailure`] if the file cannot be written.
    fn save(&self, file: &ExportedFile) -> Result<PathBuf>;
}

/// Saves exported files into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    directory: PathBuf,
}

impl DirectorySaver {
    /// Save into `directory`, creating it on first use.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The target directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, file: &ExportedFile) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.directory).map_err(|source| Error::ExportFailure {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.directory.join(&file.suggested_name);
        std::fs::write(&path, &file.bytes).map_err(|source| Error::ExportFailure {
            path: path.clone(),
            source,
        })?;

        info!("Exported {} bytes to {}", file.bytes.len(), path.display());
        Ok(path)
    }
}
