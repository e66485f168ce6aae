//! Reciprocal best matches between two sequence sets
//!
//! The search itself is delegated to an external aligner (BLAST+, DIAMOND,
//! or BLAT) invoked with an explicit argument list; this module builds the
//! databases, runs both directions, retains the single best hit per query,
//! and intersects the two directions into reciprocal pairs.

use crate::blast::BlastMatch;
use crate::errors::{EnveomicsError, Result};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use tempfile::TempDir;

/// Supported external search engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    BlastPlus,
    Diamond,
    Blat,
}

impl FromStr for SearchEngine {
    type Err = EnveomicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "blast" | "blast+" => Ok(SearchEngine::BlastPlus),
            "diamond" => Ok(SearchEngine::Diamond),
            "blat" => Ok(SearchEngine::Blat),
            other => Err(EnveomicsError::Option(format!(
                "unsupported search engine '{other}' (use blast+, diamond, or blat)"
            ))),
        }
    }
}

impl SearchEngine {
    /// Programs that must be on PATH for this engine.
    fn requirements(&self, nucl: bool) -> Vec<&'static str> {
        match self {
            SearchEngine::BlastPlus => {
                if nucl {
                    vec!["makeblastdb", "blastn"]
                } else {
                    vec!["makeblastdb", "blastp"]
                }
            }
            SearchEngine::Diamond => vec!["diamond"],
            SearchEngine::Blat => vec!["blat"],
        }
    }
}

/// Hit thresholds and engine choice for one RBM run.
#[derive(Debug, Clone)]
pub struct RbmConfig {
    pub engine: SearchEngine,
    /// Nucleotide sequences (blastn) rather than proteins (blastp).
    pub nucl: bool,
    pub threads: usize,
    pub min_length: usize,
    pub min_identity: f64,
    pub min_score: f64,
    /// Minimum aligned fraction of the query; only enforced when the engine
    /// reports query lengths (BLAT's tabular output does not).
    pub min_fraction: f64,
}

impl Default for RbmConfig {
    fn default() -> Self {
        Self {
            engine: SearchEngine::BlastPlus,
            nucl: false,
            threads: 1,
            min_length: 0,
            min_identity: 0.0,
            min_score: 40.0,
            min_fraction: 0.0,
        }
    }
}

impl RbmConfig {
    fn passes(&self, m: &BlastMatch) -> bool {
        if m.aln_len < self.min_length
            || m.identity < self.min_identity
            || m.bitscore < self.min_score
        {
            return false;
        }
        match m.q_fraction() {
            Some(f) => f >= self.min_fraction,
            None => true,
        }
    }
}

/// One reciprocal pair: the hit of A's sequence against B, and B's hit back.
#[derive(Debug, Clone)]
pub struct RbmPair {
    pub forward: BlastMatch,
    pub reverse: BlastMatch,
}

/// Compute reciprocal best matches between two FastA files.
pub fn reciprocal_best_matches(
    seqs_a: &Path,
    seqs_b: &Path,
    config: &RbmConfig,
) -> Result<Vec<RbmPair>> {
    for program in config.engine.requirements(config.nucl) {
        if which::which(program).is_err() {
            return Err(EnveomicsError::Option(format!(
                "required program '{program}' not found in PATH"
            )));
        }
    }
    let work = TempDir::new()?;
    let forward = best_hit_search(seqs_a, seqs_b, work.path(), "fwd", config)?;
    let reverse = best_hit_search(seqs_b, seqs_a, work.path(), "rev", config)?;
    Ok(intersect_best_hits(forward, reverse))
}

/// Run one direction: queries vs a database of subjects, returning the best
/// retained hit per query.
fn best_hit_search(
    queries: &Path,
    subjects: &Path,
    work: &Path,
    label: &str,
    config: &RbmConfig,
) -> Result<HashMap<String, BlastMatch>> {
    let tab = work.join(format!("{label}.tab"));
    match config.engine {
        SearchEngine::BlastPlus => {
            let db = work.join(format!("{label}.db"));
            let dbtype = if config.nucl { "nucl" } else { "prot" };
            run_command(
                "makeblastdb",
                &[
                    "-in".as_ref(),
                    subjects.as_os_str(),
                    "-dbtype".as_ref(),
                    dbtype.as_ref(),
                    "-out".as_ref(),
                    db.as_os_str(),
                ],
            )?;
            let program = if config.nucl { "blastn" } else { "blastp" };
            run_command(
                program,
                &[
                    "-query".as_ref(),
                    queries.as_os_str(),
                    "-db".as_ref(),
                    db.as_os_str(),
                    "-out".as_ref(),
                    tab.as_os_str(),
                    "-outfmt".as_ref(),
                    "6 std qlen slen".as_ref(),
                    "-num_threads".as_ref(),
                    config.threads.to_string().as_ref(),
                ],
            )?;
        }
        SearchEngine::Diamond => {
            let db = work.join(format!("{label}.dmnd"));
            run_command(
                "diamond",
                &[
                    "makedb".as_ref(),
                    "--in".as_ref(),
                    subjects.as_os_str(),
                    "--db".as_ref(),
                    db.as_os_str(),
                    "--quiet".as_ref(),
                ],
            )?;
            let task = if config.nucl { "blastx" } else { "blastp" };
            run_command(
                "diamond",
                &[
                    task.as_ref(),
                    "--query".as_ref(),
                    queries.as_os_str(),
                    "--db".as_ref(),
                    db.as_os_str(),
                    "--out".as_ref(),
                    tab.as_os_str(),
                    "--outfmt".as_ref(),
                    "6".as_ref(),
                    "qseqid".as_ref(),
                    "sseqid".as_ref(),
                    "pident".as_ref(),
                    "length".as_ref(),
                    "mismatch".as_ref(),
                    "gapopen".as_ref(),
                    "qstart".as_ref(),
                    "qend".as_ref(),
                    "sstart".as_ref(),
                    "send".as_ref(),
                    "evalue".as_ref(),
                    "bitscore".as_ref(),
                    "qlen".as_ref(),
                    "slen".as_ref(),
                    "--threads".as_ref(),
                    config.threads.to_string().as_ref(),
                    "--quiet".as_ref(),
                ],
            )?;
        }
        SearchEngine::Blat => {
            let seqtype = if config.nucl { "dna" } else { "prot" };
            run_command(
                "blat",
                &[
                    format!("-t={seqtype}").as_ref(),
                    format!("-q={seqtype}").as_ref(),
                    "-out=blast8".as_ref(),
                    subjects.as_os_str(),
                    queries.as_os_str(),
                    tab.as_os_str(),
                ],
            )?;
        }
    }
    let reader = BufReader::new(std::fs::File::open(&tab)?);
    best_hits(reader, config)
}

/// Retain the best hit per query: the first hit clearing the thresholds
/// wins, and is only replaced by a strictly higher score.
pub fn best_hits<R: BufRead>(reader: R, config: &RbmConfig) -> Result<HashMap<String, BlastMatch>> {
    let mut best: HashMap<String, BlastMatch> = HashMap::new();
    for (idx, row) in reader.lines().enumerate() {
        let row = row?;
        if row.is_empty() || row.starts_with('#') {
            continue;
        }
        let m = BlastMatch::parse(&row, idx + 1)?;
        if !config.passes(&m) {
            continue;
        }
        match best.get(&m.qry) {
            Some(prev) if m.bitscore <= prev.bitscore => {}
            _ => {
                best.insert(m.qry.clone(), m);
            }
        }
    }
    Ok(best)
}

/// Keep pairs where A's best hit is B and B's best hit is back to A.
pub fn intersect_best_hits(
    forward: HashMap<String, BlastMatch>,
    mut reverse: HashMap<String, BlastMatch>,
) -> Vec<RbmPair> {
    let mut queries: Vec<&String> = forward.keys().collect();
    queries.sort();
    let mut pairs = Vec::new();
    for qry in queries {
        let fwd = &forward[qry];
        let reciprocal = match reverse.get(&fwd.sbj) {
            Some(rev) => &rev.sbj == qry,
            None => false,
        };
        if reciprocal {
            let rev = reverse.remove(&fwd.sbj).expect("checked above");
            pairs.push(RbmPair {
                forward: fwd.clone(),
                reverse: rev,
            });
        }
    }
    pairs
}

/// Run an external program with explicit arguments, capturing stderr.
pub fn run_command(program: &str, args: &[&std::ffi::OsStr]) -> Result<()> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            EnveomicsError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot execute '{program}': {e}"),
            ))
        })?;
    if !output.status.success() {
        return Err(EnveomicsError::Command {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn row(qry: &str, sbj: &str, identity: f64, len: usize, bits: f64) -> String {
        format!("{qry}\t{sbj}\t{identity}\t{len}\t1\t0\t1\t{len}\t1\t{len}\t1e-30\t{bits}")
    }

    fn config() -> RbmConfig {
        RbmConfig {
            min_score: 20.0,
            min_identity: 30.0,
            min_length: 10,
            ..RbmConfig::default()
        }
    }

    #[test]
    fn first_passing_hit_wins_until_strictly_beaten() {
        let input = format!(
            "{}\n{}\n{}\n{}\n",
            row("q1", "s1", 90.0, 100, 50.0),
            row("q1", "s2", 90.0, 100, 50.0), // equal score: does not override
            row("q1", "s3", 90.0, 100, 60.0), // strictly higher: overrides
            row("q1", "s4", 90.0, 100, 60.0)  // equal again: does not override
        );
        let best = best_hits(Cursor::new(input), &config()).unwrap();
        assert_eq!(best["q1"].sbj, "s3");
    }

    #[test]
    fn thresholds_filter_before_retention() {
        let input = format!(
            "{}\n{}\n{}\n",
            row("q1", "low", 20.0, 100, 99.0),  // identity below cutoff
            row("q1", "short", 90.0, 5, 99.0),  // too short
            row("q1", "ok", 90.0, 100, 30.0)
        );
        let best = best_hits(Cursor::new(input), &config()).unwrap();
        assert_eq!(best["q1"].sbj, "ok");
    }

    #[test]
    fn reciprocal_intersection_and_symmetry() {
        let fwd_in = format!(
            "{}\n{}\n",
            row("a1", "b1", 90.0, 100, 80.0),
            row("a2", "b2", 90.0, 100, 70.0)
        );
        let rev_in = format!(
            "{}\n{}\n",
            row("b1", "a1", 90.0, 100, 80.0),
            row("b2", "a9", 90.0, 100, 70.0) // b2 prefers a different query
        );
        let fwd = best_hits(Cursor::new(fwd_in.clone()), &config()).unwrap();
        let rev = best_hits(Cursor::new(rev_in.clone()), &config()).unwrap();
        let pairs = intersect_best_hits(fwd, rev);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].forward.qry, "a1");
        assert_eq!(pairs[0].reverse.qry, "b1");

        // Swapping search directions reports the same pair with the same score
        let fwd = best_hits(Cursor::new(rev_in), &config()).unwrap();
        let rev = best_hits(Cursor::new(fwd_in), &config()).unwrap();
        let swapped = intersect_best_hits(fwd, rev);
        assert_eq!(swapped.len(), 1);
        assert_eq!(swapped[0].forward.qry, "b1");
        assert_eq!(swapped[0].reverse.qry, "a1");
        assert!((swapped[0].forward.bitscore - pairs[0].reverse.bitscore).abs() < 1e-9);
    }

    #[test]
    fn engine_names_parse() {
        assert_eq!("blast+".parse::<SearchEngine>().unwrap(), SearchEngine::BlastPlus);
        assert_eq!("DIAMOND".parse::<SearchEngine>().unwrap(), SearchEngine::Diamond);
        assert!("usearch".parse::<SearchEngine>().is_err());
    }

    #[test]
    fn failing_command_captures_stderr() {
        // `false` exits 1 with no stderr; the error still carries the status
        match run_command("false", &[]) {
            Err(EnveomicsError::Command { program, .. }) => assert_eq!(program, "false"),
            other => panic!("expected command error, got {other:?}"),
        }
    }

    #[test]
    fn unexecutable_program_is_an_io_error() {
        match run_command("no-such-aligner-on-any-path", &[]) {
            Err(EnveomicsError::Io(e)) => {
                assert!(e.to_string().contains("no-such-aligner-on-any-path"))
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
