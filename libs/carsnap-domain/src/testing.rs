//! In-memory adapters for tests
//!
//! Enabled inside this crate's tests and, for dependent crates, through the
//! `testing` feature. Both fakes count their calls so tests can assert that
//! validation failures never reach storage.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ports::{BlobStore, RecordSink};
use crate::upload::UploadError;

const URL_SCHEME: &str = "memory://";

#[derive(Debug, Clone)]
struct MemoryBlob {
    bytes: Vec<u8>,
    content_type: String,
}

#[derive(Debug, Default)]
struct BlobState {
    containers: HashMap<String, HashMap<String, MemoryBlob>>,
    containers_created: usize,
    store_calls: usize,
}

/// Blob store keeping containers and blobs in a map
///
/// URLs have the form `memory://{container}/{file_name}`.
#[derive(Debug)]
pub struct InMemoryBlobStore {
    container: String,
    failure: Option<String>,
    state: Mutex<BlobState>,
}

impl InMemoryBlobStore {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            failure: None,
            state: Mutex::new(BlobState::default()),
        }
    }

    /// A store whose every write fails with `UploadError::Storage(message)`
    pub fn failing(container: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(container)
        }
    }

    fn state(&self) -> MutexGuard<'_, BlobState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, url: &str) -> Option<MemoryBlob> {
        let (container, file_name) = url.strip_prefix(URL_SCHEME)?.split_once('/')?;
        self.state()
            .containers
            .get(container)?
            .get(file_name)
            .cloned()
    }

    /// Read a blob back by the URL `store` returned
    pub fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        self.lookup(url).map(|blob| blob.bytes)
    }

    /// Content type a blob was stored with
    pub fn content_type(&self, url: &str) -> Option<String> {
        self.lookup(url).map(|blob| blob.content_type)
    }

    pub fn store_calls(&self) -> usize {
        self.state().store_calls
    }

    pub fn container_count(&self) -> usize {
        self.state().containers.len()
    }

    /// How many times `store` had to create the container
    pub fn containers_created(&self) -> usize {
        self.state().containers_created
    }

    pub fn blob_count(&self) -> usize {
        self.state().containers.values().map(HashMap::len).sum()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn store(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> impl Future<Output = Result<String, UploadError>> + Send {
        let result = {
            let mut state = self.state();
            state.store_calls += 1;

            match &self.failure {
                Some(message) => Err(UploadError::storage(message.clone())),
                None => {
                    if !state.containers.contains_key(&self.container) {
                        state.containers_created += 1;
                    }
                    state
                        .containers
                        .entry(self.container.clone())
                        .or_default()
                        .insert(
                            file_name.to_string(),
                            MemoryBlob {
                                bytes: bytes.to_vec(),
                                content_type: mime_type.to_string(),
                            },
                        );
                    Ok(format!("{}{}/{}", URL_SCHEME, self.container, file_name))
                }
            }
        };

        async move { result }
    }
}

#[derive(Debug, Default)]
struct SheetState {
    sheets: HashMap<String, Vec<Vec<String>>>,
    append_calls: usize,
}

/// Record sink keeping sheets as vectors of rows
#[derive(Debug)]
pub struct InMemoryRecordSink {
    sheet: String,
    failure: Option<String>,
    state: Mutex<SheetState>,
}

impl InMemoryRecordSink {
    /// A sink whose target sheet already exists
    pub fn with_sheet(sheet: impl Into<String>) -> Self {
        let sink = Self::without_sheet(sheet);
        sink.state().sheets.insert(sink.sheet.clone(), Vec::new());
        sink
    }

    /// A sink whose target sheet was never created
    pub fn without_sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            failure: None,
            state: Mutex::new(SheetState::default()),
        }
    }

    /// A sink whose sheet exists but every append fails with `message`
    pub fn failing(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::with_sheet(sheet)
        }
    }

    fn state(&self) -> MutexGuard<'_, SheetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn rows(&self, sheet: &str) -> Vec<Vec<String>> {
        self.state().sheets.get(sheet).cloned().unwrap_or_default()
    }

    pub fn sheet_count(&self) -> usize {
        self.state().sheets.len()
    }

    pub fn append_calls(&self) -> usize {
        self.state().append_calls
    }
}

impl RecordSink for InMemoryRecordSink {
    fn append(&self, row: &[String]) -> impl Future<Output = Result<(), UploadError>> + Send {
        let result = {
            let mut state = self.state();
            state.append_calls += 1;

            match (&self.failure, state.sheets.get_mut(&self.sheet)) {
                (_, None) => Err(UploadError::sheet_not_found(&self.sheet)),
                (Some(message), Some(_)) => Err(UploadError::record_sink(message.clone())),
                (None, Some(rows)) => {
                    rows.push(row.to_vec());
                    Ok(())
                }
            }
        };

        async move { result }
    }
}
