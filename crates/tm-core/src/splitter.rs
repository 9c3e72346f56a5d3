//! Lexical statement splitting for multi-statement migration scripts
//!
//! The splitter searches the raw bytes for a literal delimiter. It has no
//! notion of string literals, comments or nested blocks, so a `;` inside a
//! quoted string or a comment ends the statement early. Scripts that are not
//! delimiter-clean must be run with multi-statement mode disabled, which
//! sends the whole script as a single statement.

use crate::config::DriverConfig;
use crate::error::{CoreError, CoreResult};
use std::io::{ErrorKind, Read};

/// Statement delimiter used when splitting is enabled.
pub const DEFAULT_DELIMITER: &[u8] = b";";

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Lazily yields the trimmed, non-empty statements of a script.
///
/// The stream is read in chunks and statements are handed out as soon as
/// their delimiter has been seen. A statement longer than `max_size` bytes
/// (excluding the delimiter) ends the iteration with
/// [`CoreError::StatementTooLarge`]; the remainder of the stream is never read.
pub struct StatementSplitter<R> {
    reader: R,
    delimiter: Vec<u8>,
    max_size: usize,
    buf: Vec<u8>,
    // Bytes before this offset are known not to start a delimiter.
    scan_from: usize,
    eof: bool,
    finished: bool,
}

impl<R: Read> StatementSplitter<R> {
    /// Create a splitter. An empty delimiter falls back to [`DEFAULT_DELIMITER`].
    pub fn new(reader: R, delimiter: &[u8], max_size: usize) -> Self {
        let delimiter = if delimiter.is_empty() {
            DEFAULT_DELIMITER.to_vec()
        } else {
            delimiter.to_vec()
        };
        Self {
            reader,
            delimiter,
            max_size,
            buf: Vec::new(),
            scan_from: 0,
            eof: false,
            finished: false,
        }
    }

    fn fail(&mut self, err: CoreError) -> Option<CoreResult<Vec<u8>>> {
        self.finished = true;
        self.buf.clear();
        Some(Err(err))
    }

    fn too_large(&mut self) -> Option<CoreResult<Vec<u8>>> {
        let max_size = self.max_size;
        self.fail(CoreError::StatementTooLarge { max_size })
    }

    fn fill(&mut self) -> std::io::Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Iterator for StatementSplitter<R> {
    type Item = CoreResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if let Some(offset) = find(&self.buf[self.scan_from..], &self.delimiter) {
                let end = self.scan_from + offset;
                if end > self.max_size {
                    return self.too_large();
                }
                let statement = self.buf[..end].trim_ascii().to_vec();
                self.buf.drain(..end + self.delimiter.len());
                self.scan_from = 0;
                if statement.is_empty() {
                    continue;
                }
                return Some(Ok(statement));
            }

            if self.buf.len() > self.max_size {
                return self.too_large();
            }

            if self.eof {
                self.finished = true;
                let statement = self.buf.trim_ascii().to_vec();
                self.buf.clear();
                return if statement.is_empty() {
                    None
                } else {
                    Some(Ok(statement))
                };
            }

            // A delimiter may straddle the chunk boundary.
            self.scan_from = self
                .buf
                .len()
                .saturating_sub(self.delimiter.len().saturating_sub(1));

            match self.fill() {
                Ok(0) => self.eof = true,
                Ok(_) => {}
                Err(e) => return self.fail(CoreError::ScriptRead(e)),
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// The statements of one migration script, split or whole.
pub enum Statements<R> {
    /// Multi-statement mode disabled: the script is one statement.
    Whole(Option<R>),
    /// Multi-statement mode enabled.
    Split(StatementSplitter<R>),
}

impl<R: Read> Statements<R> {
    /// Treat the entire stream as a single statement.
    pub fn whole(reader: R) -> Self {
        Statements::Whole(Some(reader))
    }

    /// Split the stream on `delimiter`.
    pub fn split(reader: R, delimiter: &[u8], max_size: usize) -> Self {
        Statements::Split(StatementSplitter::new(reader, delimiter, max_size))
    }

    /// Pick whole-script or split mode from the driver configuration.
    pub fn for_config(reader: R, config: &DriverConfig) -> Self {
        if config.multi_statement {
            Self::split(reader, DEFAULT_DELIMITER, config.max_statement_size())
        } else {
            Self::whole(reader)
        }
    }
}

impl<R: Read> Iterator for Statements<R> {
    type Item = CoreResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Statements::Whole(reader) => {
                let mut reader = reader.take()?;
                let mut script = Vec::new();
                if let Err(e) = reader.read_to_end(&mut script) {
                    return Some(Err(CoreError::ScriptRead(e)));
                }
                let statement = script.trim_ascii();
                if statement.is_empty() {
                    None
                } else {
                    Some(Ok(statement.to_vec()))
                }
            }
            Statements::Split(splitter) => splitter.next(),
        }
    }
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
