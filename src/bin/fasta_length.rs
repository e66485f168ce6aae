//! Per-sequence length table with optional summary statistics.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::fasta::FastaReader;
use enveomics::io;
use enveomics::stats::Sample;
use serde::Serialize;
use std::io::Write as _;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct LengthReport {
    sequences: usize,
    total: f64,
    mean: f64,
    sd: f64,
    min: Option<f64>,
    max: Option<f64>,
    median: Option<f64>,
}

fn main() -> Result<()> {
    let matches = Command::new("env-fasta-length")
        .version("0.1.0")
        .about("Tabulate sequence lengths from a FastA file")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FASTA")
                .help("Input FastA file ('-' for stdin, gzip supported)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("TSV")
                .help("Output table ('-' for stdout)")
                .default_value("-"),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .value_name("JSON")
                .help("Write the summary as JSON as well"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Skip the summary block on stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let input = matches.get_one::<String>("input").unwrap();
    let output = matches.get_one::<String>("output").unwrap();
    let quiet = matches.get_flag("quiet");

    let mut writer = io::writer(output)?;
    let mut lengths = Vec::new();
    for record in FastaReader::new(io::reader(input)?) {
        let record = record?;
        writeln!(writer, "{}\t{}", record.id, record.len())?;
        lengths.push(record.len() as f64);
    }
    writer.flush()?;

    let sample = Sample::new(lengths)?;
    let report = LengthReport {
        sequences: sample.n(),
        total: sample.mean() * sample.n() as f64,
        mean: sample.mean(),
        sd: sample.sd(),
        min: sample.min(),
        max: sample.max(),
        median: sample.median(),
    };

    if !quiet {
        eprintln!("sequences: {}", report.sequences);
        if report.sequences > 0 {
            eprintln!("total: {:.0}", report.total);
            eprintln!("mean: {:.1}", report.mean);
            eprintln!("sd: {:.1}", report.sd);
            eprintln!(
                "range: {:.0}..{:.0}",
                report.min.unwrap_or(0.0),
                report.max.unwrap_or(0.0)
            );
            if let Some(median) = report.median {
                eprintln!("median: {median:.1}");
            }
        }
    }
    if let Some(path) = matches.get_one::<String>("stats") {
        std::fs::write(PathBuf::from(path), serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}
