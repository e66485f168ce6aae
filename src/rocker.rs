//! ROC-based bit-score thresholds over alignment windows
//!
//! A reference multiple alignment is tiled into column windows; simulated
//! reads searched against the references land in the window containing
//! their subject midpoint, and each window gets the bit-score threshold
//! that maximizes Youden's J on its true/false hits. The ROC fit itself is
//! delegated to R's pROC package through a `ThresholdSolver`, so the
//! windowing and refinement logic stays testable without R installed.

use crate::blast::BlastMatch;
use crate::errors::{EnveomicsError, Result};
use crate::fasta::FastaRecord;
use std::collections::HashMap;
use std::io::{BufRead, Write as _};
use std::process::{Command, Stdio};

/// A gapped reference alignment with per-sequence coordinate maps.
#[derive(Debug, Clone)]
pub struct RockerAlignment {
    ids: Vec<String>,
    rows: Vec<String>,
    cols: usize,
    index: HashMap<String, usize>,
}

impl RockerAlignment {
    pub fn from_records(records: Vec<FastaRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(EnveomicsError::Option("empty reference alignment".into()));
        }
        let cols = records[0].seq.len();
        for rec in &records {
            if rec.seq.len() != cols {
                return Err(EnveomicsError::Option(format!(
                    "alignment rows differ in length: '{}' has {} columns, expected {}",
                    rec.id,
                    rec.seq.len(),
                    cols
                )));
            }
        }
        let mut ids = Vec::with_capacity(records.len());
        let mut rows = Vec::with_capacity(records.len());
        let mut index = HashMap::new();
        for (i, rec) in records.into_iter().enumerate() {
            index.insert(rec.id.clone(), i);
            ids.push(rec.id);
            rows.push(rec.seq);
        }
        Ok(Self {
            ids,
            rows,
            cols,
            index,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Alignment column (1-based) of the `pos`-th residue (1-based,
    /// gap-free) of sequence `id`.
    pub fn column_of(&self, id: &str, pos: usize) -> Option<usize> {
        let row = &self.rows[*self.index.get(id)?];
        let mut residue = 0;
        for (col, c) in row.chars().enumerate() {
            if c != '-' && c != '.' {
                residue += 1;
                if residue == pos {
                    return Some(col + 1);
                }
            }
        }
        None
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Embedded-alignment lines for the `.rocker` file.
    pub fn to_embedded_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (id, row) in self.ids.iter().zip(&self.rows) {
            lines.push(format!("#:>{id}"));
            lines.push(format!("#:{row}"));
        }
        lines
    }

    pub fn from_embedded_lines(lines: &[String]) -> Result<Self> {
        let mut records = Vec::new();
        let mut pending: Option<String> = None;
        for line in lines {
            let body = line.strip_prefix("#:").ok_or_else(|| {
                EnveomicsError::parse(0, format!("embedded alignment line without '#:': {line}"))
            })?;
            if let Some(id) = body.strip_prefix('>') {
                pending = Some(id.to_string());
            } else {
                let id = pending.take().ok_or_else(|| {
                    EnveomicsError::parse(0, "alignment row before any '#:>' defline")
                })?;
                records.push(FastaRecord::new(id, body));
            }
        }
        Self::from_records(records)
    }
}

/// One hit projected onto the alignment: subject-midpoint column, score,
/// and whether the read is a tagged true positive.
#[derive(Debug, Clone, Copy)]
pub struct HitOnAlignment {
    pub column: usize,
    pub bitscore: f64,
    pub true_positive: bool,
}

/// Project tabular hits onto alignment columns. Reads whose id contains
/// `tp_tag` count as true positives; a hit against a subject absent from
/// the alignment is fatal.
pub fn map_hits<R: BufRead>(
    reader: R,
    alignment: &RockerAlignment,
    tp_tag: &str,
) -> Result<Vec<HitOnAlignment>> {
    let mut hits = Vec::new();
    for (idx, row) in reader.lines().enumerate() {
        let row = row?;
        if row.is_empty() || row.starts_with('#') {
            continue;
        }
        let m = BlastMatch::parse(&row, idx + 1)?;
        if !alignment.contains(&m.sbj) {
            return Err(EnveomicsError::parse(
                idx + 1,
                format!("subject '{}' is not in the reference alignment", m.sbj),
            ));
        }
        let midpoint = m.s_midpoint();
        let column = alignment.column_of(&m.sbj, midpoint).ok_or_else(|| {
            EnveomicsError::parse(
                idx + 1,
                format!("position {midpoint} beyond the residues of '{}'", m.sbj),
            )
        })?;
        hits.push(HitOnAlignment {
            column,
            bitscore: m.bitscore,
            true_positive: m.qry.contains(tp_tag),
        });
    }
    hits.sort_by_key(|h| h.column);
    Ok(hits)
}

/// A span of alignment columns with its hit tallies and threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RockerWindow {
    /// First column, 1-based inclusive.
    pub from: usize,
    /// Last column, inclusive.
    pub to: usize,
    pub hits: usize,
    pub tps: usize,
    /// Directly fitted threshold; `None` for almost-empty windows.
    pub threshold: Option<f64>,
}

impl RockerWindow {
    pub fn len(&self) -> usize {
        self.to - self.from + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    fn midpoint(&self) -> f64 {
        (self.from + self.to) as f64 / 2.0
    }
}

/// Source of per-window score thresholds (Youden-optimal bit score).
pub trait ThresholdSolver {
    /// `tps`/`fps` are the bit scores of true and false hits in one window;
    /// both have at least 3 entries when called.
    fn threshold(&self, tps: &[f64], fps: &[f64]) -> Result<f64>;
}

/// Threshold solver backed by `Rscript` and the pROC package.
pub struct ProcSolver;

const PROC_SCRIPT: &str = r#"
suppressPackageStartupMessages(library(pROC))
d <- read.table(file('stdin'), sep='\t', header=FALSE, col.names=c('score','tp'))
r <- roc(d$tp, d$score, quiet=TRUE)
w <- c(1, sum(d$tp == 1) / sum(d$tp == 0))
co <- coords(r, 'best', ret='threshold', best.method='youden', best.weights=w, transpose=TRUE)
cat(co[[1]])
"#;

impl ProcSolver {
    /// Verify Rscript and pROC are available; called once before compiling.
    pub fn check() -> Result<Self> {
        if which::which("Rscript").is_err() {
            return Err(EnveomicsError::Option(
                "required program 'Rscript' not found in PATH".into(),
            ));
        }
        let output = Command::new("Rscript")
            .args(["-e", "library(pROC)"])
            .stdin(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(EnveomicsError::Command {
                program: "Rscript".into(),
                status: output.status,
                stderr: format!(
                    "the pROC package is not installed; run install.packages('pROC') in R first ({})",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(Self)
    }
}

impl ThresholdSolver for ProcSolver {
    fn threshold(&self, tps: &[f64], fps: &[f64]) -> Result<f64> {
        let mut child = Command::new("Rscript")
            .args(["-e", PROC_SCRIPT])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        {
            let stdin = child.stdin.as_mut().expect("stdin was piped");
            for score in tps {
                writeln!(stdin, "{score}\t1")?;
            }
            for score in fps {
                writeln!(stdin, "{score}\t0")?;
            }
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(EnveomicsError::Command {
                program: "Rscript".into(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let text = String::from_utf8_lossy(&output.stdout);
        text.trim().parse().map_err(|_| {
            EnveomicsError::parse(0, format!("pROC returned a non-numeric threshold: '{text}'"))
        })
    }
}

/// Windowing and refinement parameters.
#[derive(Debug, Clone)]
pub struct RockerCompiler {
    /// Initial window width in alignment columns.
    pub window_size: usize,
    /// Minimum true and false hits for a direct threshold fit.
    pub min_class_hits: usize,
    /// Windows below this accuracy are candidates for bisection.
    pub refine_accuracy: f64,
    /// Windows this short or shorter are never bisected.
    pub min_refine_len: usize,
}

impl Default for RockerCompiler {
    fn default() -> Self {
        Self {
            window_size: 20,
            min_class_hits: 3,
            refine_accuracy: 0.95,
            min_refine_len: 5,
        }
    }
}

impl RockerCompiler {
    /// Compile windows for the whole alignment: tile, fit, refine,
    /// interpolate. The returned windows exactly tile `[1, cols]`.
    pub fn compile(
        &self,
        alignment: &RockerAlignment,
        hits: &[HitOnAlignment],
        solver: &dyn ThresholdSolver,
    ) -> Result<Vec<RockerWindow>> {
        if self.window_size == 0 {
            return Err(EnveomicsError::Option("window size must be positive".into()));
        }
        let cols = alignment.cols();
        let mut windows = Vec::new();
        let mut from = 1;
        while from <= cols {
            // The final window absorbs the remainder
            let to = if from + 2 * self.window_size - 1 > cols {
                cols
            } else {
                from + self.window_size - 1
            };
            self.refine_into(from, to, hits, solver, &mut windows)?;
            from = to + 1;
        }
        interpolate_thresholds(&mut windows);
        Ok(windows)
    }

    /// Fit one span, bisecting recursively while accuracy is poor.
    fn refine_into(
        &self,
        from: usize,
        to: usize,
        hits: &[HitOnAlignment],
        solver: &dyn ThresholdSolver,
        out: &mut Vec<RockerWindow>,
    ) -> Result<()> {
        let window = self.fit(from, to, hits, solver)?;
        let refinable = window.len() > self.min_refine_len
            && window.threshold.is_some()
            && accuracy(&window, hits) < self.refine_accuracy;
        if refinable {
            let mid = from + (to - from) / 2;
            let (left_ok, right_ok) = (
                self.fittable(from, mid, hits),
                self.fittable(mid + 1, to, hits),
            );
            // Bisection stops rather than create an almost-empty half
            if left_ok && right_ok {
                self.refine_into(from, mid, hits, solver, out)?;
                self.refine_into(mid + 1, to, hits, solver, out)?;
                return Ok(());
            }
        }
        out.push(window);
        Ok(())
    }

    fn fit(
        &self,
        from: usize,
        to: usize,
        hits: &[HitOnAlignment],
        solver: &dyn ThresholdSolver,
    ) -> Result<RockerWindow> {
        let (tps, fps) = window_scores(from, to, hits);
        let threshold = if tps.len() >= self.min_class_hits && fps.len() >= self.min_class_hits {
            Some(solver.threshold(&tps, &fps)?)
        } else {
            None
        };
        Ok(RockerWindow {
            from,
            to,
            hits: tps.len() + fps.len(),
            tps: tps.len(),
            threshold,
        })
    }

    fn fittable(&self, from: usize, to: usize, hits: &[HitOnAlignment]) -> bool {
        let (tps, fps) = window_scores(from, to, hits);
        tps.len() >= self.min_class_hits && fps.len() >= self.min_class_hits
    }
}

fn window_scores(from: usize, to: usize, hits: &[HitOnAlignment]) -> (Vec<f64>, Vec<f64>) {
    let mut tps = Vec::new();
    let mut fps = Vec::new();
    for hit in hits {
        if hit.column >= from && hit.column <= to {
            if hit.true_positive {
                tps.push(hit.bitscore);
            } else {
                fps.push(hit.bitscore);
            }
        }
    }
    (tps, fps)
}

/// Fraction of the window's hits classified correctly by its threshold.
fn accuracy(window: &RockerWindow, hits: &[HitOnAlignment]) -> f64 {
    let threshold = match window.threshold {
        Some(t) => t,
        None => return 1.0,
    };
    let (tps, fps) = window_scores(window.from, window.to, hits);
    let total = tps.len() + fps.len();
    if total == 0 {
        return 1.0;
    }
    let correct = tps.iter().filter(|&&s| s >= threshold).count()
        + fps.iter().filter(|&&s| s < threshold).count();
    correct as f64 / total as f64
}

/// Fill almost-empty windows by linear interpolation between the nearest
/// thresholded neighbours; one-sided neighbours extrapolate flat. Windows
/// with no thresholded neighbour at all stay `None`; the count of those is
/// returned so callers can warn.
pub fn interpolate_thresholds(windows: &mut [RockerWindow]) -> usize {
    let known: Vec<(usize, f64, f64)> = windows
        .iter()
        .enumerate()
        .filter_map(|(i, w)| w.threshold.map(|t| (i, w.midpoint(), t)))
        .collect();
    let mut unresolved = 0;
    for i in 0..windows.len() {
        if windows[i].threshold.is_some() {
            continue;
        }
        let mid = windows[i].midpoint();
        let before = known.iter().rev().find(|(k, _, _)| *k < i);
        let after = known.iter().find(|(k, _, _)| *k > i);
        windows[i].threshold = match (before, after) {
            (Some((_, m0, t0)), Some((_, m1, t1))) => {
                let frac = (mid - m0) / (m1 - m0);
                Some(t0 + frac * (t1 - t0))
            }
            (Some((_, _, t)), None) | (None, Some((_, _, t))) => Some(*t),
            (None, None) => {
                unresolved += 1;
                None
            }
        };
    }
    unresolved
}

/// A compiled model: the windows plus the alignment they were fitted on.
#[derive(Debug)]
pub struct RockerModel {
    pub alignment: RockerAlignment,
    pub windows: Vec<RockerWindow>,
}

impl RockerModel {
    /// Threshold of the window containing an alignment column.
    pub fn threshold_at(&self, column: usize) -> Option<f64> {
        self.windows
            .iter()
            .find(|w| w.from <= column && column <= w.to)
            .and_then(|w| w.threshold)
    }

    /// Write the `.rocker` format: window rows (tab-delimited) plus the
    /// `#:`-prefixed embedded alignment.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> Result<()> {
        for line in self.alignment.to_embedded_lines() {
            writeln!(writer, "{line}")?;
        }
        for w in &self.windows {
            let threshold = match w.threshold {
                Some(t) => format!("{t:.4}"),
                None => "NA".to_string(),
            };
            writeln!(writer, "{}\t{}\t{}\t{}\t{}", w.from, w.to, w.hits, w.tps, threshold)?;
        }
        Ok(())
    }

    pub fn read<R: BufRead>(reader: R) -> Result<Self> {
        let mut embedded = Vec::new();
        let mut windows = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            if line.starts_with("#:") {
                embedded.push(line);
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 5 {
                return Err(EnveomicsError::parse(
                    idx + 1,
                    format!("expected 5 window columns, found {}", fields.len()),
                ));
            }
            let num = |i: usize| -> Result<usize> {
                fields[i].parse().map_err(|_| {
                    EnveomicsError::parse(idx + 1, format!("non-numeric window field '{}'", fields[i]))
                })
            };
            let threshold = if fields[4] == "NA" {
                None
            } else {
                Some(fields[4].parse().map_err(|_| {
                    EnveomicsError::parse(idx + 1, format!("bad threshold '{}'", fields[4]))
                })?)
            };
            windows.push(RockerWindow {
                from: num(0)?,
                to: num(1)?,
                hits: num(2)?,
                tps: num(3)?,
                threshold,
            });
        }
        let alignment = RockerAlignment::from_embedded_lines(&embedded)?;
        Ok(Self { alignment, windows })
    }

    /// Stream tabular hits, keeping rows whose bit score clears the
    /// threshold of the window under their subject midpoint. Hits on
    /// subjects outside the alignment, and hits over threshold-less
    /// windows, are dropped.
    pub fn filter<R: BufRead, W: std::io::Write>(
        &self,
        reader: R,
        writer: &mut W,
    ) -> Result<(usize, usize)> {
        let mut seen = 0;
        let mut kept = 0;
        for (idx, row) in reader.lines().enumerate() {
            let row = row?;
            if row.is_empty() || row.starts_with('#') {
                continue;
            }
            let m = BlastMatch::parse(&row, idx + 1)?;
            seen += 1;
            let column = match self.alignment.column_of(&m.sbj, m.s_midpoint()) {
                Some(c) => c,
                None => continue,
            };
            if let Some(threshold) = self.threshold_at(column) {
                if m.bitscore >= threshold {
                    writeln!(writer, "{}", m.raw)?;
                    kept += 1;
                }
            }
        }
        Ok((seen, kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Midpoint-of-scores stand-in for pROC, good enough for structure tests.
    struct MidpointSolver;

    impl ThresholdSolver for MidpointSolver {
        fn threshold(&self, tps: &[f64], fps: &[f64]) -> Result<f64> {
            let min_tp = tps.iter().cloned().fold(f64::INFINITY, f64::min);
            let max_fp = fps.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            Ok((min_tp + max_fp) / 2.0)
        }
    }

    fn alignment(cols: usize) -> RockerAlignment {
        RockerAlignment::from_records(vec![FastaRecord::new("ref1", "A".repeat(cols))]).unwrap()
    }

    fn hit(column: usize, bitscore: f64, tp: bool) -> HitOnAlignment {
        HitOnAlignment {
            column,
            bitscore,
            true_positive: tp,
        }
    }

    /// A window's worth of separable hits: TPs high, FPs low.
    fn separable_hits(from: usize, to: usize) -> Vec<HitOnAlignment> {
        let mut hits = Vec::new();
        for c in from..=to {
            hits.push(hit(c, 90.0, true));
            hits.push(hit(c, 30.0, false));
        }
        hits
    }

    fn assert_tiles(windows: &[RockerWindow], cols: usize) {
        assert_eq!(windows.first().unwrap().from, 1);
        assert_eq!(windows.last().unwrap().to, cols);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].to + 1, pair[1].from, "gap or overlap at {pair:?}");
        }
    }

    #[test]
    fn ragged_alignment_is_rejected() {
        let recs = vec![
            FastaRecord::new("a", "ACGT"),
            FastaRecord::new("b", "ACG"),
        ];
        assert!(RockerAlignment::from_records(recs).is_err());
    }

    #[test]
    fn embedded_row_before_defline_is_rejected() {
        let lines = vec!["#:ACGT".to_string()];
        assert!(RockerAlignment::from_embedded_lines(&lines).is_err());
    }

    #[test]
    fn column_of_skips_gaps() {
        let aln =
            RockerAlignment::from_records(vec![FastaRecord::new("r", "--AC-GT-")]).unwrap();
        assert_eq!(aln.column_of("r", 1), Some(3));
        assert_eq!(aln.column_of("r", 3), Some(6));
        assert_eq!(aln.column_of("r", 5), None);
    }

    #[test]
    fn windows_tile_the_alignment() {
        let aln = alignment(105);
        let hits = separable_hits(1, 105);
        let compiler = RockerCompiler::default();
        let windows = compiler.compile(&aln, &hits, &MidpointSolver).unwrap();
        assert_tiles(&windows, 105);
        // 105 columns at width 20: last window absorbs the 5-column tail
        assert_eq!(windows.last().unwrap().from, 81);
        assert!(windows.iter().all(|w| w.threshold.is_some()));
    }

    #[test]
    fn almost_empty_windows_are_interpolated() {
        let aln = alignment(60);
        // Hits only in columns 1..20 and 41..60; the middle window is empty
        let mut hits = separable_hits(1, 20);
        for h in separable_hits(41, 60) {
            hits.push(HitOnAlignment {
                bitscore: h.bitscore + 20.0,
                ..h
            });
        }
        let compiler = RockerCompiler::default();
        let windows = compiler.compile(&aln, &hits, &MidpointSolver).unwrap();
        assert_tiles(&windows, 60);
        let middle = windows.iter().find(|w| w.from == 21).unwrap();
        let t = middle.threshold.expect("interpolated");
        let left = windows[0].threshold.unwrap();
        let right = windows.last().unwrap().threshold.unwrap();
        assert!(t > left.min(right) && t < left.max(right), "{left} < {t} < {right}");
    }

    #[test]
    fn one_sided_extrapolation_is_flat() {
        let mut windows = vec![
            RockerWindow { from: 1, to: 10, hits: 20, tps: 10, threshold: Some(50.0) },
            RockerWindow { from: 11, to: 20, hits: 0, tps: 0, threshold: None },
            RockerWindow { from: 21, to: 30, hits: 1, tps: 1, threshold: None },
        ];
        let unresolved = interpolate_thresholds(&mut windows);
        assert_eq!(unresolved, 0);
        assert_eq!(windows[1].threshold, Some(50.0));
        assert_eq!(windows[2].threshold, Some(50.0));
    }

    #[test]
    fn no_neighbour_stays_unresolved() {
        let mut windows = vec![RockerWindow {
            from: 1,
            to: 10,
            hits: 0,
            tps: 0,
            threshold: None,
        }];
        assert_eq!(interpolate_thresholds(&mut windows), 1);
        assert_eq!(windows[0].threshold, None);
    }

    #[test]
    fn poor_windows_are_bisected_and_still_tile() {
        let aln = alignment(40);
        // Left half separable around 60, right half separable around 80:
        // one 40-column window cannot classify both sides well.
        let mut hits = Vec::new();
        for c in 1..=20 {
            hits.push(hit(c, 70.0, true));
            hits.push(hit(c, 50.0, false));
        }
        for c in 21..=40 {
            hits.push(hit(c, 95.0, true));
            hits.push(hit(c, 75.0, false));
        }
        let compiler = RockerCompiler {
            window_size: 40,
            ..RockerCompiler::default()
        };
        let windows = compiler.compile(&aln, &hits, &MidpointSolver).unwrap();
        assert_tiles(&windows, 40);
        assert!(windows.len() >= 2, "expected bisection, got {windows:?}");
    }

    #[test]
    fn bisection_stops_before_empty_halves() {
        let aln = alignment(40);
        // All hits in the left quarter; splitting again would empty a half
        let mut hits = Vec::new();
        for c in 1..=10 {
            hits.push(hit(c, 70.0, true));
            hits.push(hit(c, 72.0, false)); // overlapping scores: poor accuracy
        }
        let compiler = RockerCompiler {
            window_size: 40,
            ..RockerCompiler::default()
        };
        let windows = compiler.compile(&aln, &hits, &MidpointSolver).unwrap();
        assert_tiles(&windows, 40);
    }

    #[test]
    fn rocker_file_roundtrip() {
        let aln = alignment(40);
        let hits = separable_hits(1, 40);
        let compiler = RockerCompiler {
            window_size: 10,
            ..RockerCompiler::default()
        };
        let windows = compiler.compile(&aln, &hits, &MidpointSolver).unwrap();
        let model = RockerModel {
            alignment: aln,
            windows: windows.clone(),
        };
        let mut buf = Vec::new();
        model.write(&mut buf).unwrap();
        let back = RockerModel::read(Cursor::new(buf)).unwrap();
        assert_eq!(back.windows.len(), windows.len());
        assert_eq!(back.alignment.cols(), 40);
        assert_eq!(back.windows[0].from, windows[0].from);
    }

    #[test]
    fn filter_keeps_hits_over_threshold() {
        let model = RockerModel {
            alignment: RockerAlignment::from_records(vec![FastaRecord::new(
                "ref1",
                "A".repeat(20),
            )])
            .unwrap(),
            windows: vec![RockerWindow {
                from: 1,
                to: 20,
                hits: 10,
                tps: 5,
                threshold: Some(60.0),
            }],
        };
        let rows = "\
r1\tref1\t99.0\t10\t0\t0\t1\t10\t5\t14\t1e-20\t80\n\
r2\tref1\t99.0\t10\t0\t0\t1\t10\t5\t14\t1e-20\t40\n\
r3\tother\t99.0\t10\t0\t0\t1\t10\t5\t14\t1e-20\t80\n";
        let mut out = Vec::new();
        let (seen, kept) = model.filter(Cursor::new(rows), &mut out).unwrap();
        assert_eq!((seen, kept), (3, 1));
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("r1\t"));
        assert_eq!(text.lines().count(), 1);
    }
}
