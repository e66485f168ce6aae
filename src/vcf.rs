//! VCF variant rows
//!
//! Tab-delimited variant records with an INFO sub-map. Derived quantities
//! (allele depths, Shannon information of the ref/alt split) are computed
//! when the row is parsed, so a `VcfVariant` is immutable and carries no
//! hidden cache.

use crate::errors::{EnveomicsError, Result};
use std::collections::HashMap;
use std::io::BufRead;

#[derive(Debug, Clone)]
pub struct VcfVariant {
    pub chrom: String,
    pub pos: usize,
    pub id: Option<String>,
    pub reference: String,
    pub alternative: String,
    pub quality: Option<f64>,
    pub filter: Option<String>,
    pub info: HashMap<String, Option<String>>,
    /// Reads supporting the reference allele, from DP4 or AD when present.
    pub ref_depth: Option<u64>,
    /// Reads supporting the alternative allele.
    pub alt_depth: Option<u64>,
    /// Shannon information of the ref/alt depth split, in bits.
    pub shannon: Option<f64>,
}

impl VcfVariant {
    pub fn parse(row: &str, line: usize) -> Result<Self> {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 8 {
            return Err(EnveomicsError::parse(
                line,
                format!("expected >= 8 VCF columns, found {}", fields.len()),
            ));
        }
        let pos: usize = fields[1].parse().map_err(|_| {
            EnveomicsError::parse(line, format!("POS is not an integer: '{}'", fields[1]))
        })?;
        let info = parse_info(fields[7]);
        let (ref_depth, alt_depth) = allele_depths(&info, line)?;
        let shannon = match (ref_depth, alt_depth) {
            (Some(r), Some(a)) if r > 0 && a > 0 => Some(shannon_bits(r, a)),
            _ => None,
        };
        let opt = |s: &str| {
            if s == "." {
                None
            } else {
                Some(s.to_string())
            }
        };
        Ok(Self {
            chrom: fields[0].to_string(),
            pos,
            id: opt(fields[2]),
            reference: fields[3].to_string(),
            alternative: fields[4].to_string(),
            quality: opt(fields[5]).and_then(|q| q.parse().ok()),
            filter: opt(fields[6]),
            info,
            ref_depth,
            alt_depth,
            shannon,
        })
    }

    pub fn is_indel(&self) -> bool {
        self.info.contains_key("INDEL")
            || self.reference.len() != 1
            || self.alternative.split(',').any(|a| a.len() != 1)
    }

    /// Total depth: DP when present, otherwise the allele-depth sum.
    pub fn depth(&self) -> Option<u64> {
        if let Some(Some(dp)) = self.info.get("DP") {
            if let Ok(dp) = dp.parse() {
                return Some(dp);
            }
        }
        match (self.ref_depth, self.alt_depth) {
            (Some(r), Some(a)) => Some(r + a),
            _ => None,
        }
    }

    /// Verify REF against the genome sequence; mismatches are fatal because
    /// every downstream statistic assumes the coordinates line up.
    pub fn check_reference(&self, genome: &HashMap<String, String>, line: usize) -> Result<()> {
        let seq = genome.get(&self.chrom).ok_or_else(|| {
            EnveomicsError::parse(line, format!("unknown sequence '{}'", self.chrom))
        })?;
        if self.pos == 0 || self.reference.is_empty() {
            return Err(EnveomicsError::parse(
                line,
                format!("invalid POS/REF at {}:{}", self.chrom, self.pos),
            ));
        }
        let end = self.pos + self.reference.len() - 1;
        if end > seq.len() {
            return Err(EnveomicsError::parse(
                line,
                format!("position {} out of range for '{}'", self.pos, self.chrom),
            ));
        }
        // Byte indexing: genome sequences may carry stray non-ASCII characters
        let expect = &seq.as_bytes()[self.pos - 1..end];
        if !expect.eq_ignore_ascii_case(self.reference.as_bytes()) {
            return Err(EnveomicsError::parse(
                line,
                format!(
                    "REF mismatch at {}:{}: VCF says '{}', genome has '{}'",
                    self.chrom,
                    self.pos,
                    self.reference,
                    String::from_utf8_lossy(expect)
                ),
            ));
        }
        Ok(())
    }
}

fn parse_info(field: &str) -> HashMap<String, Option<String>> {
    let mut map = HashMap::new();
    if field == "." {
        return map;
    }
    for item in field.split(';') {
        match item.split_once('=') {
            Some((k, v)) => map.insert(k.to_string(), Some(v.to_string())),
            None => map.insert(item.to_string(), None),
        };
    }
    map
}

/// Ref/alt depths from DP4 (preferred) or AD.
fn allele_depths(
    info: &HashMap<String, Option<String>>,
    line: usize,
) -> Result<(Option<u64>, Option<u64>)> {
    if let Some(Some(dp4)) = info.get("DP4") {
        let parts: Vec<u64> = dp4
            .split(',')
            .map(|p| p.parse())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| EnveomicsError::parse(line, format!("malformed DP4 '{dp4}'")))?;
        if parts.len() != 4 {
            return Err(EnveomicsError::parse(
                line,
                format!("DP4 must have 4 values, found {}", parts.len()),
            ));
        }
        return Ok((Some(parts[0] + parts[1]), Some(parts[2] + parts[3])));
    }
    if let Some(Some(ad)) = info.get("AD") {
        let parts: Vec<u64> = ad
            .split(',')
            .map(|p| p.parse())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| EnveomicsError::parse(line, format!("malformed AD '{ad}'")))?;
        if parts.len() >= 2 {
            return Ok((Some(parts[0]), Some(parts[1..].iter().sum())));
        }
    }
    Ok((None, None))
}

/// Shannon entropy of a two-way split, in bits. In (0, 1] for two positive
/// depths, approaching 0 as one allele dominates.
fn shannon_bits(ref_depth: u64, alt_depth: u64) -> f64 {
    let total = (ref_depth + alt_depth) as f64;
    let p = ref_depth as f64 / total;
    let q = alt_depth as f64 / total;
    -(p * p.log2() + q * q.log2())
}

/// Read every variant row from a VCF stream, skipping `#` headers.
pub fn read_variants<R: BufRead>(reader: R) -> Result<Vec<VcfVariant>> {
    let mut variants = Vec::new();
    for (idx, row) in reader.lines().enumerate() {
        let row = row?;
        if row.is_empty() || row.starts_with('#') {
            continue;
        }
        variants.push(VcfVariant::parse(&row, idx + 1)?);
    }
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ROW: &str = "chr1\t5\t.\tA\tG\t60.0\tPASS\tDP=20;DP4=8,4,5,3";

    #[test]
    fn parses_info_and_depths() {
        let v = VcfVariant::parse(ROW, 1).unwrap();
        assert_eq!(v.chrom, "chr1");
        assert_eq!(v.pos, 5);
        assert_eq!(v.ref_depth, Some(12));
        assert_eq!(v.alt_depth, Some(8));
        assert_eq!(v.depth(), Some(20));
        assert!(!v.is_indel());
    }

    #[test]
    fn shannon_is_bounded() {
        for (r, a) in [(1u64, 1u64), (1, 99), (50, 50), (1000, 1), (7, 13)] {
            let h = shannon_bits(r, a);
            assert!(h > 0.0 && h <= 1.0, "H({r},{a}) = {h}");
        }
        assert!((shannon_bits(50, 50) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ad_fallback_and_indel_flag() {
        let v = VcfVariant::parse("c\t2\t.\tAT\tA\t.\t.\tINDEL;AD=3,9", 1).unwrap();
        assert!(v.is_indel());
        assert_eq!(v.ref_depth, Some(3));
        assert_eq!(v.alt_depth, Some(9));
        assert_eq!(v.depth(), Some(12));
    }

    #[test]
    fn reference_check() {
        let mut genome = HashMap::new();
        genome.insert("chr1".to_string(), "CCCCAGGG".to_string());
        let v = VcfVariant::parse(ROW, 1).unwrap();
        v.check_reference(&genome, 1).unwrap();
        genome.insert("chr1".to_string(), "CCCCTGGG".to_string());
        assert!(v.check_reference(&genome, 1).is_err());
    }

    #[test]
    fn zero_pos_or_empty_ref_is_a_parse_error() {
        let mut genome = HashMap::new();
        genome.insert("chr1".to_string(), "CCCCAGGG".to_string());
        let v = VcfVariant::parse("chr1\t0\t.\t\tG\t.\t.\tDP=5", 1).unwrap();
        assert!(v.check_reference(&genome, 1).is_err());
        let v = VcfVariant::parse("chr1\t0\t.\tA\tG\t.\t.\tDP=5", 1).unwrap();
        assert!(v.check_reference(&genome, 1).is_err());
    }

    #[test]
    fn non_ascii_genome_is_a_mismatch_not_a_panic() {
        let mut genome = HashMap::new();
        genome.insert("chr1".to_string(), "AéGT".to_string());
        let v = VcfVariant::parse("chr1\t2\t.\tA\tG\t.\t.\tDP=5", 1).unwrap();
        assert!(v.check_reference(&genome, 1).is_err());
    }

    #[test]
    fn malformed_rows_are_fatal() {
        assert!(VcfVariant::parse("chr1\t5\t.\tA", 3).is_err());
        assert!(VcfVariant::parse("chr1\tx\t.\tA\tG\t.\t.\t.", 3).is_err());
        assert!(VcfVariant::parse("chr1\t5\t.\tA\tG\t.\t.\tDP4=1,2,3", 3).is_err());
    }

    #[test]
    fn header_lines_are_skipped() {
        let text = format!("##fileformat=VCFv4.2\n#CHROM\tPOS\n{ROW}\n");
        let vars = read_variants(Cursor::new(text)).unwrap();
        assert_eq!(vars.len(), 1);
    }
}
