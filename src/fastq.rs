//! Streaming FastQ parsing and writing
//!
//! Strict 4-line records. The reader keeps an accurate line counter so that
//! truncated or inconsistent records are reported against the real input
//! line, and length disagreement between sequence and quality is fatal.

use crate::errors::{EnveomicsError, Result};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: String,
    pub qual: String,
}

impl FastqRecord {
    pub fn defline(&self) -> String {
        match &self.desc {
            Some(d) => format!("{} {}", self.id, d),
            None => self.id.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Mean Phred quality assuming the +33 offset.
    pub fn mean_quality(&self) -> f64 {
        if self.qual.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.qual.bytes().map(|b| b.saturating_sub(33) as u64).sum();
        sum as f64 / self.qual.len() as f64
    }
}

pub struct FastqReader<R: BufRead> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
        }
    }

    /// Line number of the last line consumed.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        let n = self.reader.read_line(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }
}

impl<R: BufRead> Iterator for FastqReader<R> {
    type Item = Result<FastqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = loop {
            match self.read_line() {
                Ok(Some(line)) if line.is_empty() => continue,
                Ok(Some(line)) => break line,
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            }
        };
        let header_line = self.line_number;
        if !header.starts_with('@') {
            return Some(Err(EnveomicsError::parse(
                header_line,
                format!("expected '@' defline, got: {header}"),
            )));
        }
        let mut take = |what: &str| -> Result<String> {
            match self.read_line()? {
                Some(line) => Ok(line),
                None => Err(EnveomicsError::parse(
                    self.line_number,
                    format!("record truncated at end of file, missing {what}"),
                )),
            }
        };
        let seq = match take("sequence line") {
            Ok(s) => s,
            Err(e) => return Some(Err(e)),
        };
        let plus = match take("'+' separator line") {
            Ok(s) => s,
            Err(e) => return Some(Err(e)),
        };
        let qual = match take("quality line") {
            Ok(s) => s,
            Err(e) => return Some(Err(e)),
        };
        if !plus.starts_with('+') {
            return Some(Err(EnveomicsError::parse(
                self.line_number - 1,
                format!("expected '+' separator, got: {plus}"),
            )));
        }
        if seq.len() != qual.len() {
            return Some(Err(EnveomicsError::parse(
                self.line_number,
                format!(
                    "sequence length {} does not match quality length {}",
                    seq.len(),
                    qual.len()
                ),
            )));
        }
        let (id, desc) = match header[1..].split_once(char::is_whitespace) {
            Some((id, desc)) => (id.to_string(), Some(desc.trim().to_string())),
            None => (header[1..].to_string(), None),
        };
        Some(Ok(FastqRecord {
            id,
            desc,
            seq,
            qual,
        }))
    }
}

pub struct FastqWriter<W: Write> {
    writer: W,
}

impl<W: Write> FastqWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_record(&mut self, record: &FastqRecord) -> Result<()> {
        writeln!(self.writer, "@{}", record.defline())?;
        writeln!(self.writer, "{}", record.seq)?;
        writeln!(self.writer, "+")?;
        writeln!(self.writer, "{}", record.qual)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_records_and_counts_lines() {
        let text = "@r1 lib=a\nACGT\n+\nIIII\n@r2\nTT\n+r2\nII\n";
        let mut reader = FastqReader::new(Cursor::new(text));
        let r1 = reader.next().unwrap().unwrap();
        assert_eq!(r1.id, "r1");
        assert_eq!(r1.desc.as_deref(), Some("lib=a"));
        assert_eq!(reader.line_number(), 4);
        let r2 = reader.next().unwrap().unwrap();
        assert_eq!(r2.seq, "TT");
        assert_eq!(reader.line_number(), 8);
        assert!(reader.next().is_none());
    }

    #[test]
    fn length_mismatch_cites_real_line() {
        let text = "@r1\nACGT\n+\nIII\n";
        let err = FastqReader::new(Cursor::new(text))
            .next()
            .unwrap()
            .unwrap_err();
        match err {
            EnveomicsError::Parse { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn truncated_record_is_fatal() {
        let text = "@r1\nACGT\n+\n";
        assert!(FastqReader::new(Cursor::new(text))
            .next()
            .unwrap()
            .is_err());
    }

    #[test]
    fn mean_quality_phred33() {
        let rec = FastqRecord {
            id: "r".into(),
            desc: None,
            seq: "ACGT".into(),
            qual: "IIII".into(), // 'I' = Q40
        };
        assert!((rec.mean_quality() - 40.0).abs() < 1e-9);
    }
}
