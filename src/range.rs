//! GenBank-style sequence ranges
//!
//! `seq1:3..6` selects positions 3 through 6 (1-based, inclusive) of `seq1`;
//! `seq1:complement(3..6)` selects the reverse strand of the same span.

use crate::errors::{EnveomicsError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRange {
    pub id: String,
    pub from: usize,
    pub to: usize,
    pub complement: bool,
}

impl SeqRange {
    pub fn new(id: impl Into<String>, from: usize, to: usize, complement: bool) -> Result<Self> {
        if from == 0 {
            return Err(EnveomicsError::Option(
                "range coordinates are 1-based, got 0".into(),
            ));
        }
        if from > to {
            return Err(EnveomicsError::Option(format!(
                "range start {from} is after end {to}"
            )));
        }
        Ok(Self {
            id: id.into(),
            from,
            to,
            complement,
        })
    }

    pub fn len(&self) -> usize {
        self.to - self.from + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl FromStr for SeqRange {
    type Err = EnveomicsError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || EnveomicsError::Option(format!("cannot parse range '{s}', expected id:from..to or id:complement(from..to)"));
        let (id, span) = s.rsplit_once(':').ok_or_else(bad)?;
        if id.is_empty() {
            return Err(bad());
        }
        let (span, complement) = match span.strip_prefix("complement(") {
            Some(inner) => (inner.strip_suffix(')').ok_or_else(bad)?, true),
            None => (span, false),
        };
        let (from, to) = span.split_once("..").ok_or_else(bad)?;
        let from: usize = from.trim().parse().map_err(|_| bad())?;
        let to: usize = to.trim().parse().map_err(|_| bad())?;
        SeqRange::new(id, from, to, complement)
    }
}

impl fmt::Display for SeqRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.complement {
            write!(f, "{}:complement({}..{})", self.id, self.from, self.to)
        } else {
            write!(f, "{}:{}..{}", self.id, self.from, self.to)
        }
    }
}
