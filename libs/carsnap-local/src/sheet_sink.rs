//! CSV-file record sink
//!
//! The sheet named `Cars` is the file `{dir}/Cars.csv`. Operators create it
//! (typically with a header row); the sink only ever appends to it.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use carsnap_domain::{ports::RecordSink, upload::UploadError};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, error, info, info_span, Instrument};

/// RecordSink appending rows to an existing CSV file
#[derive(Debug)]
pub struct CsvSheetSink {
    sheet: String,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvSheetSink {
    /// Create a sink for the sheet `sheet` stored in `dir`
    pub fn new(dir: impl AsRef<Path>, sheet: impl Into<String>) -> Self {
        let sheet = sheet.into();
        let path = dir.as_ref().join(format!("{}.csv", sheet));
        info!(sheet = %sheet, path = %path.display(), "Initializing CsvSheetSink");
        Self {
            sheet,
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row of the sheet, header included
    pub async fn rows(&self) -> Result<Vec<Vec<String>>, UploadError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => parse_csv(&content).map_err(|err| {
                UploadError::record_sink(format!(
                    "Failed to parse sheet \"{}\": {}",
                    self.sheet, err
                ))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(UploadError::sheet_not_found(&self.sheet))
            }
            Err(err) => Err(UploadError::record_sink(format!(
                "Failed to read sheet \"{}\": {}",
                self.sheet, err
            ))),
        }
    }

    async fn append_line(&self, line: &str) -> std::io::Result<()> {
        // Opening without `create` makes a missing sheet surface as NotFound
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        let needs_newline = if file.metadata().await?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1)).await?;
            file.read_exact(&mut last).await?;
            last[0] != b'\n'
        } else {
            false
        };

        let mut buf = String::with_capacity(line.len() + 1);
        if needs_newline {
            buf.push('\n');
        }
        buf.push_str(line);

        file.write_all(buf.as_bytes()).await?;
        file.flush().await
    }
}

impl RecordSink for CsvSheetSink {
    fn append(&self, row: &[String]) -> impl std::future::Future<Output = Result<(), UploadError>> + Send {
        let line = format_csv_line(row);
        let span = info_span!("csv_append", sheet = %self.sheet, columns = row.len());

        async move {
            let line = line?;
            let _guard = self.write_lock.lock().await;

            match self.append_line(&line).await {
                Ok(()) => {
                    debug!(path = %self.path.display(), "Appended row");
                    Ok(())
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    error!(path = %self.path.display(), "Sheet file does not exist");
                    Err(UploadError::sheet_not_found(&self.sheet))
                }
                Err(err) => {
                    error!(path = %self.path.display(), error = %err, "Failed to append row");
                    Err(UploadError::record_sink(format!(
                        "Failed to append to sheet \"{}\": {}",
                        self.sheet, err
                    )))
                }
            }
        }
        .instrument(span)
    }
}

/// One RFC 4180 record terminated by `\n`, fields quoted only when needed
fn format_csv_line(row: &[String]) -> Result<String, UploadError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(row)
        .map_err(|err| UploadError::record_sink(format!("Failed to encode row: {}", err)))?;
    let bytes = writer
        .into_inner()
        .map_err(|err| UploadError::record_sink(format!("Failed to encode row: {}", err)))?;

    String::from_utf8(bytes)
        .map_err(|err| UploadError::record_sink(format!("Failed to encode row: {}", err)))
}

fn parse_csv(content: &str) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let rows = reader
        .records()
        .map(|record| record.map(|record| record.iter().map(str::to_string).collect()))
        .collect();
    rows
}
