//! Firebase Realtime Database store over the REST API.
//!
//! Reads use `GET <db>/<path>.json?orderBy="createdAt"&limitToLast=N`. Writes
//! generate the push key locally and `PUT` the document under it, so a retried
//! write lands on the same key instead of creating a duplicate.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, info, warn};

use super::{last_n_ascending, PushIdGenerator, RecordStore};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::record::{now_millis, RawDocument, Record};

/// Marker in the server's error body when the path has no `.indexOn` rule.
const INDEX_NOT_DEFINED: &str = "Index not defined";

/// Where the database lives, taken from the Firebase web config blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConnection {
    /// Base URL of the database, without a trailing slash.
    pub database_url: String,
}

/// The subset of the Firebase web config object that we read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebConfig {
    #[serde(default, rename = "databaseURL")]
    database_url: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
}

impl StoreConnection {
    /// Create a connection to the given database URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL.
    pub fn new(database_url: impl Into<String>) -> Result<Self> {
        Self::validated("database URL", database_url.into())
    }

    /// Read the connection from a JSON blob in an environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreConfigMissing`] if the variable is unset and
    /// [`Error::StoreConfigMalformed`] if it cannot be interpreted.
    pub fn from_env(variable: &str) -> Result<Self> {
        let blob = std::env::var(variable).map_err(|_| Error::StoreConfigMissing {
            variable: variable.to_string(),
        })?;
        Self::from_json(variable, &blob)
    }

    /// Interpret a Firebase web config JSON blob.
    ///
    /// `databaseURL` wins; without it the default Realtime Database URL for
    /// `projectId` is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreConfigMalformed`] if the blob is not JSON or names
    /// no database.
    pub fn from_json(variable: &str, blob: &str) -> Result<Self> {
        let config: WebConfig = serde_json::from_str(blob)
            .map_err(|e| Error::store_config_malformed(variable, e.to_string()))?;

        let url = match (config.database_url, config.project_id) {
            (Some(url), _) if !url.trim().is_empty() => url,
            (_, Some(project)) if !project.trim().is_empty() => {
                format!("https://{}-default-rtdb.firebaseio.com", project.trim())
            }
            _ => {
                return Err(Error::store_config_malformed(
                    variable,
                    "neither databaseURL nor projectId is set",
                ))
            }
        };
        Self::validated(variable, url)
    }

    fn validated(source: &str, url: String) -> Result<Self> {
        let url = url.trim().trim_end_matches('/').to_string();
        match Url::parse(&url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                Ok(Self { database_url: url })
            }
            Ok(parsed) => Err(Error::store_config_malformed(
                source,
                format!("unsupported URL scheme '{}'", parsed.scheme()),
            )),
            Err(e) => Err(Error::store_config_malformed(
                source,
                format!("invalid database URL '{url}': {e}"),
            )),
        }
    }
}

/// A failed request attempt, before it becomes a public error.
#[derive(Debug)]
struct Failure {
    message: String,
    transient: bool,
    index_missing: bool,
}

impl Failure {
    fn transport(err: &reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            transient: true,
            index_missing: false,
        }
    }

    fn status(status: StatusCode, body: &str) -> Self {
        Self {
            message: format!("HTTP {status}: {}", body.trim()),
            transient: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            index_missing: status == StatusCode::BAD_REQUEST && body.contains(INDEX_NOT_DEFINED),
        }
    }

    fn decode(err: &reqwest::Error) -> Self {
        Self {
            message: format!("unreadable response: {err}"),
            transient: false,
            index_missing: false,
        }
    }
}

/// Record store backed by a Firebase Realtime Database.
#[derive(Debug)]
pub struct FirebaseStore {
    client: Client,
    connection: StoreConnection,
    path: String,
    max_retries: usize,
    retry_delay_ms: u64,
    ids: PushIdGenerator,
}

impl FirebaseStore {
    /// Create a store client for `connection` using the store settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(connection: StoreConnection, config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::store_unavailable("connect", e.to_string()))?;

        info!(
            "Using store at {}/{}",
            connection.database_url,
            config.path.trim_matches('/')
        );
        Ok(Self {
            client,
            connection,
            path: config.path.trim_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            ids: PushIdGenerator::new(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{}.json", self.connection.database_url, self.path)
    }

    fn entry_url(&self, id: &str) -> String {
        format!("{}/{}/{}.json", self.connection.database_url, self.path, id)
    }

    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(self.retry_delay_ms.max(1))
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.max_retries)
    }

    async fn fetch_once(
        &self,
        limit: usize,
        ordered: bool,
    ) -> std::result::Result<serde_json::Value, Failure> {
        let mut request = self.client.get(self.collection_url());
        if ordered {
            request = request.query(&[
                ("orderBy", "\"createdAt\"".to_string()),
                ("limitToLast", limit.to_string()),
            ]);
        }

        let response = request.send().await.map_err(|e| Failure::transport(&e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Failure::status(status, &body));
        }
        response.json().await.map_err(|e| Failure::decode(&e))
    }

    async fn fetch_with_retry(
        &self,
        limit: usize,
        ordered: bool,
    ) -> std::result::Result<serde_json::Value, Failure> {
        RetryIf::spawn(
            self.retry_strategy(),
            || self.fetch_once(limit, ordered),
            |f: &Failure| {
                if f.transient {
                    debug!("Retrying fetch after: {}", f.message);
                }
                f.transient
            },
        )
        .await
    }

    async fn put_once(&self, record: &Record) -> std::result::Result<(), Failure> {
        let response = self
            .client
            .put(self.entry_url(&record.id))
            .json(&record.document())
            .send()
            .await
            .map_err(|e| Failure::transport(&e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Failure::status(status, &body))
        }
    }
}

/// Turn the collection snapshot into records, skipping malformed entries.
///
/// The server answers `null` for an empty collection and a JSON array instead
/// of an object when every key looks like a small integer. Array holes come
/// back as `null` and are dropped.
fn snapshot_to_records(snapshot: serde_json::Value) -> Vec<Record> {
    let entries: Vec<(String, serde_json::Value)> = match snapshot {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Object(map) => map.into_iter().collect(),
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
        other => {
            warn!("Ignoring collection snapshot that is not a map: {other}");
            Vec::new()
        }
    };

    entries
        .into_iter()
        .filter_map(|(id, value)| {
            let document = serde_json::from_value::<RawDocument>(value)
                .map_err(|_| "not an object")
                .and_then(RawDocument::into_document);
            match document {
                Ok(document) => Some(Record::from_document(id, document)),
                Err(reason) => {
                    warn!("Skipping stored entry {id}: {reason}");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl RecordStore for FirebaseStore {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Record>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let snapshot = match self.fetch_with_retry(limit, true).await {
            Ok(snapshot) => snapshot,
            Err(failure) if failure.index_missing => {
                warn!(
                    "No index on createdAt for /{}; ordering on the client. \
                     Add \".indexOn\": \"createdAt\" to the database rules.",
                    self.path
                );
                self.fetch_with_retry(limit, false)
                    .await
                    .map_err(|f| Error::store_unavailable("fetch", f.message))?
            }
            Err(failure) => return Err(Error::store_unavailable("fetch", failure.message)),
        };

        let records = snapshot_to_records(snapshot);
        debug!("Fetched {} records", records.len());
        Ok(last_n_ascending(records, limit))
    }

    async fn append(&self, text: &str) -> Result<Record> {
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }

        let created_at = now_millis();
        let record = Record {
            id: self.ids.next_id(created_at),
            text: text.to_string(),
            created_at,
        };

        RetryIf::spawn(
            self.retry_strategy(),
            || self.put_once(&record),
            |f: &Failure| {
                if f.transient {
                    debug!("Retrying append after: {}", f.message);
                }
                f.transient
            },
        )
        .await
        .map_err(|f| Error::store_unavailable("append", f.message))?;

        info!("Stored record {}", record.id);
        Ok(record)
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.connection.database_url, self.path)
    }
}
