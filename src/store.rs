//! The backing file.
//!
//! Reading is a lazy line source ([`Records`]); appending writes new lines
//! at the end without touching existing content; trim and remove build
//! the surviving set first and then swap a fully written temporary file
//! into place, so a decode error or a crash never leaves a half-written
//! file behind.
//!
//! There is no locking. Another process writing the file during a trim or
//! remove can lose its changes.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Lines, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{OmnidatError, Result};
use crate::pipeline::{Pipeline, Summary};
use crate::query::Query;
use crate::record::Record;

/// A line-per-record file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file and stream its records in file order.
    pub fn records(&self) -> Result<Records> {
        let file = File::open(&self.path).map_err(|e| self.open_error(e))?;
        debug!(path = %self.path.display(), "opened for reading");
        Ok(Records {
            lines: BufReader::new(file).lines(),
            line_no: 0,
            done: false,
        })
    }

    /// A pipeline with no predicates over this file.
    pub fn pipeline(&self) -> Result<Pipeline<Records>> {
        Ok(Pipeline::new(self.records()?))
    }

    /// Stream the records matching `query` to `sink`.
    pub fn list<F>(&self, query: &Query, sink: F) -> Result<Summary>
    where
        F: FnMut(Record) -> Result<()>,
    {
        let summary = self.pipeline()?.with_query(query).stream(sink)?;
        info!(path = %self.path.display(), read = summary.read, kept = summary.kept, "listed");
        Ok(summary)
    }

    /// Number of records in the file. A missing file has none.
    pub fn count(&self) -> Result<usize> {
        match self.records() {
            Ok(mut records) => records.try_fold(0, |n, r| r.map(|_| n + 1)),
            Err(OmnidatError::FileNotFound(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Append records, one line each. Existing lines are not read or
    /// rewritten; the file is created if missing. Nothing is written unless
    /// every record can be stored.
    pub fn add(&self, records: &[Record]) -> Result<usize> {
        if records.is_empty() || records.iter().any(Record::is_empty) {
            return Err(OmnidatError::EmptyRecord);
        }
        for record in records {
            record.validate()?;
        }
        let mut payload = String::new();
        for record in records {
            payload.push_str(&record.encode());
            payload.push('\n');
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;
        if missing_final_newline(&mut file)? {
            warn!(path = %self.path.display(), "last line had no newline, adding one");
            payload.insert(0, '\n');
        }
        file.write_all(payload.as_bytes())?;
        file.flush()?;

        info!(path = %self.path.display(), added = records.len(), "appended");
        Ok(records.len())
    }

    /// Keep only the records `query` matches.
    pub fn trim(&self, query: &Query) -> Result<Summary> {
        let (records, summary) = self.pipeline()?.with_query(query).collect_approved()?;
        self.rewrite(&records)?;
        info!(path = %self.path.display(), read = summary.read, kept = summary.kept, "trimmed");
        Ok(summary)
    }

    /// Drop the records `query` matches.
    pub fn remove(&self, query: &Query) -> Result<Summary> {
        let (records, summary) = self.pipeline()?.with_query(query).collect_rejected()?;
        self.rewrite(&records)?;
        info!(
            path = %self.path.display(),
            read = summary.read,
            removed = summary.read - summary.kept,
            "removed"
        );
        Ok(summary)
    }

    /// Replace the whole file with `records`.
    pub fn rewrite(&self, records: &[Record]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            for record in records {
                writeln!(writer, "{}", record.encode())?;
            }
            writer.flush()?;
        }
        if let Ok(meta) = fs::metadata(&self.path) {
            fs::set_permissions(tmp.path(), meta.permissions())?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), records = records.len(), "rewrote");
        Ok(())
    }

    fn open_error(&self, e: io::Error) -> OmnidatError {
        if e.kind() == io::ErrorKind::NotFound {
            OmnidatError::FileNotFound(self.path.clone())
        } else {
            OmnidatError::Io(e)
        }
    }
}

fn missing_final_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Decoded records of a file, in order. Blank lines are skipped.
///
/// The first error (I/O or decode) is yielded once and ends the stream.
/// The file is closed when this iterator is dropped.
pub struct Records {
    lines: Lines<BufReader<File>>,
    line_no: usize,
    done: bool,
}

impl Iterator for Records {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            self.line_no += 1;
            match Record::decode(&line) {
                Ok(record) if record.is_empty() => continue,
                Ok(record) => return Some(Ok(record)),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.at_line(self.line_no)));
                }
            }
        }
    }
}
