//! Tabular BLAST (outfmt 6) rows and row-level filters
//!
//! A `BlastMatch` is immutable once parsed: the 12 standard columns with
//! named accessors, plus the optional trailing qlen/slen pair some searches
//! append. Filters here are line-oriented and keep per-query state only.

use crate::errors::{EnveomicsError, Result};
use std::collections::HashMap;
use std::io::BufRead;
use std::str::FromStr;

/// One tabular BLAST hit (outfmt 6, optionally extended with qlen/slen).
#[derive(Debug, Clone, PartialEq)]
pub struct BlastMatch {
    pub qry: String,
    pub sbj: String,
    pub identity: f64,
    pub aln_len: usize,
    pub mismatches: usize,
    pub gaps: usize,
    pub q_from: usize,
    pub q_to: usize,
    pub s_from: usize,
    pub s_to: usize,
    pub evalue: f64,
    pub bitscore: f64,
    pub qlen: Option<usize>,
    pub slen: Option<usize>,
    /// The raw input row, kept so filters can re-emit it untouched.
    pub raw: String,
}

impl BlastMatch {
    /// Parse a tab-delimited row; `line` is only used for diagnostics.
    pub fn parse(row: &str, line: usize) -> Result<Self> {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            return Err(EnveomicsError::parse(
                line,
                format!("expected >= 12 tab-delimited columns, found {}", fields.len()),
            ));
        }
        fn num<T: FromStr>(fields: &[&str], idx: usize, line: usize, name: &str) -> Result<T> {
            fields[idx].trim().parse().map_err(|_| {
                EnveomicsError::parse(
                    line,
                    format!("column {} ({name}) is not numeric: '{}'", idx + 1, fields[idx]),
                )
            })
        }
        Ok(Self {
            qry: fields[0].to_string(),
            sbj: fields[1].to_string(),
            identity: num(&fields, 2, line, "identity")?,
            aln_len: num(&fields, 3, line, "alignment length")?,
            mismatches: num(&fields, 4, line, "mismatches")?,
            gaps: num(&fields, 5, line, "gap openings")?,
            q_from: num(&fields, 6, line, "query start")?,
            q_to: num(&fields, 7, line, "query end")?,
            s_from: num(&fields, 8, line, "subject start")?,
            s_to: num(&fields, 9, line, "subject end")?,
            evalue: num(&fields, 10, line, "e-value")?,
            bitscore: num(&fields, 11, line, "bit score")?,
            qlen: if fields.len() > 12 {
                Some(num(&fields, 12, line, "query length")?)
            } else {
                None
            },
            slen: if fields.len() > 13 {
                Some(num(&fields, 13, line, "subject length")?)
            } else {
                None
            },
            raw: row.to_string(),
        })
    }

    /// Midpoint of the subject span (1-based), orientation-independent.
    pub fn s_midpoint(&self) -> usize {
        (self.s_from + self.s_to) / 2
    }

    /// Fraction of the query covered by the alignment, when qlen is present.
    pub fn q_fraction(&self) -> Option<f64> {
        self.qlen.map(|l| self.aln_len as f64 / l as f64)
    }
}

/// Sort key for per-query hit ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Bitscore,
    Identity,
    Length,
}

impl FromStr for SortKey {
    type Err = EnveomicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bitscore" => Ok(SortKey::Bitscore),
            "identity" => Ok(SortKey::Identity),
            "length" => Ok(SortKey::Length),
            other => Err(EnveomicsError::Option(format!(
                "unsupported sort key '{other}' (use bitscore, identity, or length)"
            ))),
        }
    }
}

impl SortKey {
    fn of(&self, m: &BlastMatch) -> f64 {
        match self {
            SortKey::Bitscore => m.bitscore,
            SortKey::Identity => m.identity,
            SortKey::Length => m.aln_len as f64,
        }
    }
}

/// Retain the best `n` hits per query, ranked by `key`.
///
/// Ties keep input order, and queries are emitted in order of first
/// appearance. The whole input is buffered per query (hits for one query
/// need not be contiguous).
pub fn top_hits<R: BufRead>(reader: R, n: usize, key: SortKey) -> Result<Vec<BlastMatch>> {
    if n == 0 {
        return Err(EnveomicsError::Option("-n must be at least 1".into()));
    }
    let mut order: Vec<String> = Vec::new();
    let mut per_query: HashMap<String, Vec<BlastMatch>> = HashMap::new();
    for (idx, row) in reader.lines().enumerate() {
        let row = row?;
        if row.is_empty() || row.starts_with('#') {
            continue;
        }
        let m = BlastMatch::parse(&row, idx + 1)?;
        if !per_query.contains_key(&m.qry) {
            order.push(m.qry.clone());
        }
        per_query.entry(m.qry.clone()).or_default().push(m);
    }
    let mut out = Vec::new();
    for qry in &order {
        let mut hits = per_query.remove(qry).expect("query recorded in order");
        // Stable sort keeps input order among equal scores
        hits.sort_by(|a, b| key.of(b).total_cmp(&key.of(a)));
        hits.truncate(n);
        out.extend(hits);
    }
    Ok(out)
}

/// Configuration for sister-hit detection, passed explicitly instead of
/// living in mutable module state.
#[derive(Debug, Clone)]
pub struct PairedHitsConfig {
    /// Separator between the template name and the mate suffix (e.g. `/` in
    /// `read_1/1`). A name without the separator is its own template.
    pub mate_separator: char,
    /// Hits scoring below this are ignored.
    pub min_score: f64,
    /// Maximum distance on the subject between sister hit midpoints.
    pub max_distance: usize,
}

impl Default for PairedHitsConfig {
    fn default() -> Self {
        Self {
            mate_separator: '/',
            min_score: 0.0,
            max_distance: 10_000,
        }
    }
}

/// A pair of sister hits: both mates of one template on the same subject.
#[derive(Debug, Clone)]
pub struct PairedHit {
    pub template: String,
    pub forward: BlastMatch,
    pub reverse: BlastMatch,
}

impl PairedHit {
    /// Distance between the two subject midpoints.
    pub fn distance(&self) -> usize {
        self.forward.s_midpoint().abs_diff(self.reverse.s_midpoint())
    }
}

/// Detect templates whose two mates hit the same subject within the
/// configured distance. Only the best-scoring hit per (mate, subject) is
/// considered.
pub fn paired_hits<R: BufRead>(reader: R, config: &PairedHitsConfig) -> Result<Vec<PairedHit>> {
    // (template, subject) -> per-mate best hit
    let mut best: HashMap<(String, String), [Option<BlastMatch>; 2]> = HashMap::new();
    let mut order: Vec<(String, String)> = Vec::new();
    for (idx, row) in reader.lines().enumerate() {
        let row = row?;
        if row.is_empty() || row.starts_with('#') {
            continue;
        }
        let m = BlastMatch::parse(&row, idx + 1)?;
        if m.bitscore < config.min_score {
            continue;
        }
        let (template, mate) = split_mate(&m.qry, config.mate_separator);
        let mate = match mate {
            Some(mate) => mate,
            None => continue, // unpaired read name, nothing to pair
        };
        let key = (template.to_string(), m.sbj.clone());
        if !best.contains_key(&key) {
            order.push(key.clone());
        }
        let slot = best.entry(key).or_insert([None, None]);
        let keep = match &slot[mate] {
            Some(prev) => m.bitscore > prev.bitscore,
            None => true,
        };
        if keep {
            slot[mate] = Some(m);
        }
    }
    let mut pairs = Vec::new();
    for key in &order {
        let slot = best.remove(key).expect("key recorded in order");
        if let [Some(forward), Some(reverse)] = slot {
            let pair = PairedHit {
                template: key.0.clone(),
                forward,
                reverse,
            };
            if pair.distance() <= config.max_distance {
                pairs.push(pair);
            }
        }
    }
    Ok(pairs)
}

/// Split a read name into (template, mate index). Recognizes `1`/`2` and
/// `f`/`r` suffixes after the separator; anything else is unpaired.
fn split_mate(name: &str, separator: char) -> (&str, Option<usize>) {
    match name.rsplit_once(separator) {
        Some((template, suffix)) => match suffix {
            "1" | "f" | "F" => (template, Some(0)),
            "2" | "r" | "R" => (template, Some(1)),
            _ => (name, None),
        },
        None => (name, None),
    }
}
