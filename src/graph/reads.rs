//! Minimal FASTQ/FASTA tokenizer.
//!
//! Grounded on `examples/original_source/src/fastq.c` (`dcjones/pique`'s
//! `fasta_read`/`fastq_read` state machines over a manually managed read
//! buffer), re-expressed as a safe Rust iterator over any `BufRead` instead
//! of hand-rolled buffer management. Format is auto-detected from the first
//! non-whitespace byte (`>` => FASTA, anything else => FASTQ), per spec.md
//! §6. Records missing a field are dropped rather than erroring (§7) — but a
//! genuine `io::Error` from the underlying reader (a broken pipe, a failed
//! disk read) is retained rather than collapsed into the same "no more
//! records" signal, so callers can tell a clean EOF from a failed one.

use std::io::{self, BufRead};

/// A single parsed sequence record. `id` excludes the leading `>`/`@`
/// marker; quality and the second id line are FASTA/FASTQ-specific and
/// unused by ingest (only `seq` feeds the k-mer window).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub seq: Vec<u8>,
}

enum Format {
    Fasta,
    Fastq,
}

/// Streams [`Record`]s out of a buffered reader, auto-detecting FASTA vs
/// FASTQ from the first non-whitespace byte.
pub struct RecordReader<R> {
    lines: std::io::Lines<R>,
    format: Option<Format>,
    pending_header: Option<String>,
    error: Option<io::Error>,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        RecordReader { lines: reader.lines(), format: None, pending_header: None, error: None }
    }

    /// The first I/O error encountered while reading, if any. `None` after a
    /// clean end of input. Consumes the reader — call once the iterator has
    /// been fully drained (§7: I/O failures are fatal, unlike malformed
    /// records, which are dropped silently).
    pub fn into_error(self) -> Option<io::Error> {
        self.error
    }

    /// Pull the next line, or `None` on clean EOF. A genuine `io::Error` is
    /// stashed in `self.error` (first one wins) and also reported as `None`,
    /// so every caller above this naturally stops without needing its own
    /// error handling, while the error itself survives for [`into_error`].
    fn next_line(&mut self) -> Option<String> {
        match self.lines.next() {
            Some(Ok(line)) => Some(line),
            Some(Err(e)) => {
                if self.error.is_none() {
                    self.error = Some(e);
                }
                None
            }
            None => None,
        }
    }

    fn detect(&mut self, first_line: &str) -> Option<Format> {
        first_line
            .trim_start()
            .chars()
            .next()
            .map(|c| if c == '>' { Format::Fasta } else { Format::Fastq })
    }

    fn next_header(&mut self) -> Option<String> {
        if let Some(h) = self.pending_header.take() {
            return Some(h);
        }
        loop {
            let line = self.next_line()?;
            if line.trim().is_empty() {
                continue;
            }
            if self.format.is_none() {
                self.format = self.detect(&line);
            }
            return Some(line);
        }
    }

    fn read_fasta(&mut self, header: String) -> Option<Record> {
        let id = header.trim_start().trim_start_matches('>').to_string();
        let mut seq = Vec::new();
        loop {
            match self.next_line() {
                Some(line) => {
                    if line.trim_start().starts_with('>') {
                        self.pending_header = Some(line);
                        break;
                    }
                    seq.extend(line.trim_end().bytes());
                }
                None => break,
            }
        }
        Some(Record { id, seq })
    }

    fn read_fastq(&mut self, header: String) -> Option<Record> {
        let id = header.trim_start().trim_start_matches('@').to_string();
        let seq = self.next_line()?;
        let plus = self.next_line()?;
        if !plus.trim_start().starts_with('+') {
            // Malformed record: missing separator line. Drop it per §7 and
            // resynchronize by scanning forward for the next `@`-prefixed
            // line rather than assuming positional alignment — the record's
            // qual line (and anything else garbled) is discarded along the
            // way.
            self.resync_to_next_header();
            return None;
        }
        let _qual = self.next_line()?;
        Some(Record { id, seq: seq.trim_end().bytes().collect() })
    }

    /// Discard lines until one starts with `@`, stashing it as the next
    /// header. Used to recover from a malformed FASTQ record instead of
    /// blindly treating whatever line comes next as a header.
    fn resync_to_next_header(&mut self) {
        loop {
            match self.next_line() {
                Some(line) => {
                    if line.trim_start().starts_with('@') {
                        self.pending_header = Some(line);
                        return;
                    }
                }
                None => return,
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            let header = self.next_header()?;
            let record = match self.format {
                Some(Format::Fasta) => self.read_fasta(header),
                Some(Format::Fastq) => self.read_fastq(header),
                None => None,
            };
            if record.is_some() {
                return record;
            }
            // Malformed record dropped; try the next header.
            if self.pending_header.is_none() {
                continue;
            }
        }
    }
}
