//! Streaming FastA parsing and writing
//!
//! Records stream one at a time with constant memory; wrapped sequence lines
//! are concatenated during parse and re-wrapped at a configurable width on
//! output (width 0 means a single unwrapped line).

use crate::errors::{EnveomicsError, Result};
use crate::range::SeqRange;
use std::io::{BufRead, Write};

/// One FastA record: defline identifier, optional description, residues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: String,
}

impl FastaRecord {
    pub fn new(id: impl Into<String>, seq: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: None,
            seq: seq.into(),
        }
    }

    /// Full defline as it appears after the `>`.
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
}

/// Streaming FastA reader over any buffered input.
pub struct FastaReader<R: BufRead> {
    reader: R,
    line_number: usize,
    pending: Option<(String, Option<String>, usize)>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            pending: None,
            done: false,
        }
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

    fn split_defline(line: &str) -> (String, Option<String>) {
        let body = &line[1..];
        match body.split_once(char::is_whitespace) {
            Some((id, desc)) => (id.to_string(), Some(desc.trim().to_string())),
            None => (body.to_string(), None),
        }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // Find the defline of the next record
        let (id, desc, defline_no) = match self.pending.take() {
            Some(p) => p,
            None => loop {
                match self.read_line() {
                    Ok(Some(line)) => {
                        if line.is_empty() {
                            continue;
                        }
                        if line.starts_with('>') {
                            let (id, desc) = Self::split_defline(&line);
                            break (id, desc, self.line_number);
                        }
                        self.done = true;
                        return Some(Err(EnveomicsError::parse(
                            self.line_number,
                            format!("sequence data before any '>' defline: {line}"),
                        )));
                    }
                    Ok(None) => {
                        self.done = true;
                        return None;
                    }
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
            },
        };
        // Accumulate wrapped sequence lines until the next defline or EOF
        let mut seq = String::new();
        loop {
            match self.read_line() {
                Ok(Some(line)) => {
                    if line.is_empty() {
                        continue;
                    }
                    if line.starts_with('>') {
                        let (nid, ndesc) = Self::split_defline(&line);
                        self.pending = Some((nid, ndesc, self.line_number));
                        break;
                    }
                    seq.push_str(line.trim());
                }
                Ok(None) => break,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        if seq.is_empty() {
            self.done = true;
            return Some(Err(EnveomicsError::parse(
                defline_no,
                format!("record '{id}' has no sequence"),
            )));
        }
        Some(Ok(FastaRecord { id, desc, seq }))
    }
}

/// FastA writer with fixed-width line wrapping.
pub struct FastaWriter<W: Write> {
    writer: W,
    wrap: usize,
}

impl<W: Write> FastaWriter<W> {
    /// `wrap` is the residues-per-line width; 0 writes each sequence on one line.
    pub fn new(writer: W, wrap: usize) -> Self {
        Self { writer, wrap }
    }

    pub fn write_record(&mut self, record: &FastaRecord) -> Result<()> {
        writeln!(self.writer, ">{}", record.defline())?;
        if self.wrap == 0 {
            writeln!(self.writer, "{}", record.seq)?;
        } else {
            let bytes = record.seq.as_bytes();
            for chunk in bytes.chunks(self.wrap) {
                self.writer.write_all(chunk)?;
                self.writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Replace a 1-based inclusive region of `seq` with `fill`.
///
/// Out-of-range coordinates are an option error; the range length is
/// preserved, only the residues change.
pub fn mask_region(seq: &str, from: usize, to: usize, fill: char) -> Result<String> {
    if !seq.is_ascii() {
        return Err(EnveomicsError::Option(
            "sequence contains non-ASCII characters".to_string(),
        ));
    }
    if from == 0 || to > seq.len() || from > to {
        return Err(EnveomicsError::Option(format!(
            "region {from}..{to} out of bounds for sequence of length {}",
            seq.len()
        )));
    }
    let mut out = String::with_capacity(seq.len());
    out.push_str(&seq[..from - 1]);
    out.extend(std::iter::repeat(fill).take(to - from + 1));
    out.push_str(&seq[to..]);
    Ok(out)
}

/// Extract a region of `record` described by `range`, reverse-complementing
/// when the range is marked as complement.
pub fn extract_region(record: &FastaRecord, range: &SeqRange) -> Result<FastaRecord> {
    if range.id != record.id {
        return Err(EnveomicsError::Option(format!(
            "range names '{}' but record is '{}'",
            range.id, record.id
        )));
    }
    if !record.seq.is_ascii() {
        return Err(EnveomicsError::Option(format!(
            "'{}' contains non-ASCII characters",
            record.id
        )));
    }
    if range.to > record.seq.len() {
        return Err(EnveomicsError::Option(format!(
            "range {}..{} exceeds '{}' length {}",
            range.from,
            range.to,
            record.id,
            record.seq.len()
        )));
    }
    let sub = &record.seq[range.from - 1..range.to];
    let seq = if range.complement {
        reverse_complement(sub)
    } else {
        sub.to_string()
    };
    let strand = if range.complement { "c" } else { "" };
    Ok(FastaRecord::new(
        format!("{}:{}{}..{}", record.id, strand, range.from, range.to),
        seq,
    ))
}

/// Reverse-complement a nucleotide string; IUPAC codes map to their
/// complements, anything else passes through unchanged.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'T' | 'U' => 'A',
            'G' => 'C',
            'C' => 'G',
            'R' => 'Y',
            'Y' => 'R',
            'K' => 'M',
            'M' => 'K',
            'B' => 'V',
            'V' => 'B',
            'D' => 'H',
            'H' => 'D',
            'a' => 't',
            't' | 'u' => 'a',
            'g' => 'c',
            'c' => 'g',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse_all(text: &str) -> Vec<FastaRecord> {
        FastaReader::new(Cursor::new(text))
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn parses_wrapped_records() {
        let recs = parse_all(">a first\nACGT\nACGT\n>b\nTTTT\n");
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, "a");
        assert_eq!(recs[0].desc.as_deref(), Some("first"));
        assert_eq!(recs[0].seq, "ACGTACGT");
        assert_eq!(recs[1].seq, "TTTT");
    }

    #[test]
    fn blank_lines_are_ignored() {
        let recs = parse_all("\n>a\nAC\n\nGT\n\n>b\nAA\n");
        assert_eq!(recs[0].seq, "ACGT");
        assert_eq!(recs[1].seq, "AA");
    }

    #[test]
    fn data_before_defline_is_a_parse_error() {
        let err = FastaReader::new(Cursor::new("ACGT\n>a\nAC\n"))
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, EnveomicsError::Parse { line: 1, .. }));
    }

    #[test]
    fn empty_record_is_a_parse_error() {
        let results: Vec<_> = FastaReader::new(Cursor::new(">a\n>b\nAC\n")).collect();
        assert!(results[0].is_err());
    }

    #[test]
    fn wrap_zero_is_single_line() {
        let rec = FastaRecord::new("s", "ACGTACGTAC");
        let mut w = FastaWriter::new(Vec::new(), 0);
        w.write_record(&rec).unwrap();
        assert_eq!(String::from_utf8(w.into_inner()).unwrap(), ">s\nACGTACGTAC\n");
    }

    #[test]
    fn wrap_width_splits_lines() {
        let rec = FastaRecord::new("s", "ACGTACGTAC");
        let mut w = FastaWriter::new(Vec::new(), 4);
        w.write_record(&rec).unwrap();
        assert_eq!(
            String::from_utf8(w.into_inner()).unwrap(),
            ">s\nACGT\nACGT\nAC\n"
        );
    }

    #[test]
    fn mask_region_scenario() {
        // 1-based inclusive positions 3..6 replaced by direct index substitution
        let masked = mask_region("ACGTACGT", 3, 6, 'N').unwrap();
        let mut expect: Vec<u8> = b"ACGTACGT".to_vec();
        for b in &mut expect[2..6] {
            *b = b'N';
        }
        assert_eq!(masked.as_bytes(), &expect[..]);
        assert_eq!(masked, "ACNNNNGT");
    }

    #[test]
    fn mask_region_out_of_bounds() {
        assert!(mask_region("ACGT", 0, 2, 'N').is_err());
        assert!(mask_region("ACGT", 2, 9, 'N').is_err());
        assert!(mask_region("ACGT", 3, 2, 'N').is_err());
    }

    #[test]
    fn non_ascii_sequences_are_rejected() {
        assert!(mask_region("AéG", 1, 2, 'N').is_err());
        let record = FastaRecord::new("s1", "AéGT");
        let range: SeqRange = "s1:1..2".parse().unwrap();
        assert!(extract_region(&record, &range).is_err());
    }

    #[test]
    fn extract_complement_region() {
        let rec = FastaRecord::new("s1", "AACCGGTT");
        let range: SeqRange = "s1:complement(3..6)".parse().unwrap();
        let sub = extract_region(&rec, &range).unwrap();
        assert_eq!(sub.seq, reverse_complement("CCGG"));
        assert_eq!(sub.id, "s1:c3..6");
    }

    #[test]
    fn revcomp_handles_iupac() {
        assert_eq!(reverse_complement("ACGTRY"), "RYACGT");
        assert_eq!(reverse_complement(&reverse_complement("GATTACA")), "GATTACA");
    }
}
