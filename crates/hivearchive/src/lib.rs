//! `hivearchive` - Client and view model for the Hive Archives snippet store
//!
//! This library uploads short texts to a Firebase Realtime Database
//! collection, loads the newest ones, filters them by a case-insensitive
//! search, saves a record as a text file, and reads a record aloud through the
//! host speech engine.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod record;
pub mod speech;
pub mod store;
pub mod view;

pub use config::Config;
pub use error::{Error, Result};
pub use export::{export_as_file, DirectorySaver, ExportedFile, FileSaver};
pub use logging::init_logging;
pub use record::Record;
pub use speech::{Narrator, Speaker};
pub use store::{FirebaseStore, MemoryStore, RecordStore, StoreConnection};
pub use view::ViewModel;
