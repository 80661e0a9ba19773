use crate::error::SinkError;
use crate::results::{ItemRecord, RECORD_HEADER};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Append-only destination for item records
pub trait RecordSink {
    /// Write one record and make it durable before returning
    fn append(&mut self, record: &ItemRecord) -> Result<(), SinkError>;
}

/// CSV output with a fixed header, flushed after every row
///
/// Each row is encoded on its own before it reaches the writer, so a failed append is
/// never replayed by a later one. A row cut off partway is closed off with a line break
/// before the next row is written.
pub struct CsvSink<W: Write> {
    inner: W,
    /// Set after a partial write; `true` when the cut fell inside a quoted field
    torn: Option<bool>,
}

impl CsvSink<File> {
    /// Create (or truncate) the output file and write the header
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap any writer; the header is written and flushed immediately
    pub fn from_writer(inner: W) -> Result<Self, SinkError> {
        let mut sink = Self { inner, torn: None };
        sink.write_row(RECORD_HEADER)?;
        Ok(sink)
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W, SinkError> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_row(&mut self, fields: [&str; 7]) -> Result<(), SinkError> {
        let bytes = encode(fields)?;

        if let Some(in_quotes) = self.torn.take() {
            let terminator: &[u8] = if in_quotes { b"\"\n" } else { b"\n" };
            if let Err(e) = self.inner.write_all(terminator) {
                self.torn = Some(in_quotes);
                return Err(e.into());
            }
        }

        let mut written = 0;
        while written < bytes.len() {
            match self.inner.write(&bytes[written..]) {
                Ok(0) => return Err(self.tear(&bytes[..written], io::ErrorKind::WriteZero.into())),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(self.tear(&bytes[..written], e)),
            }
        }

        self.inner.flush()?;
        Ok(())
    }

    /// Remember a row that only partly reached the writer
    fn tear(&mut self, written: &[u8], error: io::Error) -> SinkError {
        if !written.is_empty() {
            let in_quotes = written.iter().filter(|&&b| b == b'"').count() % 2 == 1;
            ::log::warn!(
                "Row cut off after {} byte(s); it will be terminated before the next row",
                written.len()
            );
            self.torn = Some(in_quotes);
        }
        SinkError::Io(error)
    }
}

/// One CSV line with standard quoting
fn encode(fields: [&str; 7]) -> Result<Vec<u8>, SinkError> {
    let mut encoder = csv::Writer::from_writer(Vec::new());
    encoder.write_record(fields)?;
    encoder.into_inner().map_err(|e| SinkError::Io(e.into_error()))
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn append(&mut self, record: &ItemRecord) -> Result<(), SinkError> {
        self.write_row(record.row())
    }
}
