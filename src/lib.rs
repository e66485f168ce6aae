//! Enveomics tools
//!
//! A collection of independent command-line utilities for genome sequence
//! wrangling, sharing this small support library:
//! - gzip/stdin/stdout-transparent I/O and streaming FastA/FastQ parsing
//! - tabular BLAST rows and per-query filters
//! - reciprocal best matches via external aligners
//! - ROC-based bit-score thresholds over alignment windows
//! - VCF variants, JPlace placements, orthology groups, sample statistics
//!
//! Every binary under `src/bin/` is a standalone pipeline: parse flags,
//! stream input, transform, write output. Nothing here holds state between
//! invocations.

pub mod blast;
pub mod errors;
pub mod fasta;
pub mod fastq;
pub mod io;
pub mod jplace;
pub mod ogs;
pub mod range;
pub mod rbm;
pub mod remote;
pub mod rocker;
pub mod stats;
pub mod vcf;

pub use errors::{EnveomicsError, Result};
