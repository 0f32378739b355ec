//! # carsnap local adapters
//!
//! Filesystem-backed adapters for single-host deployments:
//!
//! - [`FolderBlobStore`]: photos live in a named folder under a root directory
//!   that the gateway serves publicly
//! - [`CsvSheetSink`]: the sheet is a CSV file that operators create up front

mod folder_store;
mod sheet_sink;

pub use folder_store::FolderBlobStore;
pub use sheet_sink::CsvSheetSink;
