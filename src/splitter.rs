//! Record splitting module
//!
//! Turns a raw byte stream into a lazy sequence of records, split either on
//! line boundaries or on a configurable delimiter byte sequence.

use memchr::memmem;
use std::io::BufRead;
use thiserror::Error;

/// How a source stream is cut into records. Resolved once per run from the
/// configuration.
#[derive(Debug, Clone)]
pub enum SplitMode {
    /// One record per line; `\n` and an optional preceding `\r` are stripped.
    Lines,
    /// Records are separated by this byte sequence; the separator belongs to
    /// neither adjacent record. The sequence must be non-empty.
    Delimiter(Vec<u8>),
}

/// Splitting failure. After any error the splitter yields nothing further
/// and the rest of the stream is abandoned.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("record exceeds the {limit} byte buffer limit")]
    RecordTooLarge { limit: usize },

    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lazy record iterator over a buffered byte stream.
///
/// The internal buffer is bounded: a record larger than `limit` bytes fails
/// with [`SplitError::RecordTooLarge`] instead of buffering without bound.
pub struct RecordSplitter<R: BufRead> {
    reader: R,
    mode: SplitMode,
    limit: usize,
    buf: Vec<u8>,
    /// Prefix of `buf` already known to contain no boundary.
    searched: usize,
    eof: bool,
    done: bool,
}

impl<R: BufRead> RecordSplitter<R> {
    pub fn new(reader: R, mode: SplitMode, limit: usize) -> Self {
        Self {
            reader,
            mode,
            limit,
            buf: Vec::with_capacity(8 * 1024),
            searched: 0,
            eof: false,
            done: false,
        }
    }

    /// Locate the next boundary in the unsearched part of the buffer.
    /// Returns (record end, bytes to consume including the boundary).
    fn find_boundary(&self) -> Option<(usize, usize)> {
        let start = self.searched;
        match &self.mode {
            SplitMode::Lines => memchr::memchr(b'\n', &self.buf[start..])
                .map(|i| (start + i, start + i + 1)),
            SplitMode::Delimiter(delim) => memmem::find(&self.buf[start..], delim)
                .map(|i| (start + i, start + i + delim.len())),
        }
    }

    /// Take a record ending at `end`, consuming `consume` bytes of buffer.
    fn take_record(&mut self, end: usize, consume: usize) -> Vec<u8> {
        let mut record = self.buf[..end].to_vec();
        if matches!(self.mode, SplitMode::Lines) && record.last() == Some(&b'\r') {
            record.pop();
        }
        self.buf.drain(..consume);
        self.searched = 0;
        record
    }

    /// Take whatever remains as the final, unterminated record.
    fn take_rest(&mut self) -> Vec<u8> {
        let end = self.buf.len();
        self.take_record(end, end)
    }

    fn fill(&mut self) -> std::io::Result<()> {
        let chunk = self.reader.fill_buf()?;
        if chunk.is_empty() {
            self.eof = true;
            return Ok(());
        }
        let n = chunk.len();
        self.buf.extend_from_slice(chunk);
        self.reader.consume(n);
        Ok(())
    }
}

impl<R: BufRead> Iterator for RecordSplitter<R> {
    type Item = Result<Vec<u8>, SplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some((end, consume)) = self.find_boundary() {
                if end > self.limit {
                    self.done = true;
                    return Some(Err(SplitError::RecordTooLarge { limit: self.limit }));
                }
                return Some(Ok(self.take_record(end, consume)));
            }

            // No boundary in the buffered data; remember how far we looked.
            // A delimiter may straddle the chunk edge, so back off by its
            // length minus one.
            self.searched = match &self.mode {
                SplitMode::Lines => self.buf.len(),
                SplitMode::Delimiter(delim) => {
                    self.buf.len().saturating_sub(delim.len().saturating_sub(1))
                }
            };

            if self.eof {
                self.done = true;
                if self.buf.is_empty() {
                    return None;
                }
                if self.buf.len() > self.limit {
                    return Some(Err(SplitError::RecordTooLarge { limit: self.limit }));
                }
                return Some(Ok(self.take_rest()));
            }

            if self.buf.len() > self.limit {
                self.done = true;
                return Some(Err(SplitError::RecordTooLarge { limit: self.limit }));
            }

            if let Err(e) = self.fill() {
                self.done = true;
                return Some(Err(SplitError::Io(e)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    const LIMIT: usize = 1024;

    fn split(input: &[u8], mode: SplitMode) -> Vec<Vec<u8>> {
        let splitter = RecordSplitter::new(Cursor::new(input.to_vec()), mode, LIMIT);
        splitter.map(|r| r.unwrap()).collect()
    }

    fn delim(d: &[u8]) -> SplitMode {
        SplitMode::Delimiter(d.to_vec())
    }

    #[test]
    fn test_line_mode() {
        let records = split(b"foo\nbar\n", SplitMode::Lines);
        assert_eq!(records, vec![b"foo".to_vec(), b"bar".to_vec()]);
    }

    #[test]
    fn test_line_mode_unterminated_final_record() {
        let records = split(b"foo\nbar", SplitMode::Lines);
        assert_eq!(records, vec![b"foo".to_vec(), b"bar".to_vec()]);
    }

    #[test]
    fn test_line_mode_crlf() {
        let records = split(b"foo\r\nbar\r\n", SplitMode::Lines);
        assert_eq!(records, vec![b"foo".to_vec(), b"bar".to_vec()]);
    }

    #[test]
    fn test_line_mode_blank_lines_are_records() {
        let records = split(b"foo\n\nbar\n", SplitMode::Lines);
        assert_eq!(records, vec![b"foo".to_vec(), b"".to_vec(), b"bar".to_vec()]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(split(b"", SplitMode::Lines).is_empty());
        assert!(split(b"", delim(b"####")).is_empty());
    }

    #[test]
    fn test_delimiter_mode() {
        let records = split(b"A####B####C", delim(b"####"));
        assert_eq!(records, vec![b"A".to_vec(), b"B".to_vec(), b"C".to_vec()]);
    }

    #[test]
    fn test_delimiter_mode_no_trailing_empty_record() {
        let records = split(b"A####B####", delim(b"####"));
        assert_eq!(records, vec![b"A".to_vec(), b"B".to_vec()]);
    }

    #[test]
    fn test_delimiter_mode_adjacent_delimiters() {
        let records = split(b"A########B", delim(b"####"));
        assert_eq!(records, vec![b"A".to_vec(), b"".to_vec(), b"B".to_vec()]);
    }

    #[test]
    fn test_delimiter_round_trip() {
        let input = b"alpha####beta####gamma";
        let records = split(input, delim(b"####"));
        let rejoined = records.join(&b"####"[..]);
        assert_eq!(rejoined, input.to_vec());
    }

    #[test]
    fn test_delimiter_spanning_read_boundary() {
        // A tiny read buffer forces the delimiter to straddle fill chunks.
        let reader = BufReader::with_capacity(3, Cursor::new(b"AB####CD####EF".to_vec()));
        let splitter = RecordSplitter::new(reader, delim(b"####"), LIMIT);
        let records: Vec<_> = splitter.map(|r| r.unwrap()).collect();
        assert_eq!(records, vec![b"AB".to_vec(), b"CD".to_vec(), b"EF".to_vec()]);
    }

    #[test]
    fn test_record_too_large() {
        let splitter = RecordSplitter::new(Cursor::new(b"0123456789".to_vec()), SplitMode::Lines, 4);
        let results: Vec<_> = splitter.collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(SplitError::RecordTooLarge { limit: 4 })
        ));
    }

    #[test]
    fn test_record_too_large_abandons_stream() {
        // The oversized first record poisons the splitter; the valid
        // records after it are never produced.
        let input = b"0123456789####ok####ok";
        let splitter = RecordSplitter::new(Cursor::new(input.to_vec()), delim(b"####"), 4);
        let results: Vec<_> = splitter.collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_record_at_limit_is_emitted() {
        let records = split(b"abcd####ef", delim(b"####"));
        assert_eq!(records, vec![b"abcd".to_vec(), b"ef".to_vec()]);

        let splitter =
            RecordSplitter::new(Cursor::new(b"abcd####ef".to_vec()), delim(b"####"), 4);
        let records: Vec<_> = splitter.map(|r| r.unwrap()).collect();
        assert_eq!(records, vec![b"abcd".to_vec(), b"ef".to_vec()]);
    }
}
