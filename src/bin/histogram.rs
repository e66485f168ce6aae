//! Histogram and descriptive statistics for a numeric column.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::io;
use enveomics::stats::Sample;
use serde::Serialize;
use std::io::{BufRead, Write as _};
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct HistogramReport {
    n: usize,
    mean: f64,
    sd: f64,
    median: Option<f64>,
    skewness: f64,
    kurtosis: f64,
    bimodality: Option<f64>,
}

fn main() -> Result<()> {
    let matches = Command::new("env-histogram")
        .version("0.1.0")
        .about("Histogram, descriptive statistics, and bimodality of a numeric column")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Input table ('-' for stdin, gzip supported)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("TSV")
                .help("Histogram table ('-' for stdout)")
                .default_value("-"),
        )
        .arg(
            Arg::new("column")
                .short('c')
                .long("column")
                .value_name("N")
                .help("1-based column holding the values")
                .default_value("1"),
        )
        .arg(
            Arg::new("bin-width")
                .short('b')
                .long("bin-width")
                .value_name("WIDTH")
                .help("Histogram bin width")
                .default_value("1"),
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
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let input = matches.get_one::<String>("input").unwrap();
    let output = matches.get_one::<String>("output").unwrap();
    let column: usize = matches.get_one::<String>("column").unwrap().parse()?;
    let bin_width: f64 = matches.get_one::<String>("bin-width").unwrap().parse()?;
    let quiet = matches.get_flag("quiet");
    if column == 0 {
        anyhow::bail!("--column is 1-based");
    }

    let mut values = Vec::new();
    for (idx, line) in io::reader(input)?.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let field = line.split('\t').nth(column - 1).ok_or_else(|| {
            enveomics::EnveomicsError::parse(idx + 1, format!("no column {column}"))
        })?;
        let value: f64 = field.trim().parse().map_err(|_| {
            enveomics::EnveomicsError::parse(idx + 1, format!("non-numeric value '{field}'"))
        })?;
        values.push(value);
    }

    let sample = Sample::new(values)?;
    let mut writer = io::writer(output)?;
    writeln!(writer, "bin_start\tcount")?;
    for (start, count) in sample.histo_counts(bin_width)? {
        writeln!(writer, "{start}\t{count}")?;
    }
    writer.flush()?;

    let report = HistogramReport {
        n: sample.n(),
        mean: sample.mean(),
        sd: sample.sd(),
        median: sample.median(),
        skewness: sample.skewness(),
        kurtosis: sample.kurtosis(),
        bimodality: sample.bimodality(),
    };
    if !quiet {
        eprintln!("n: {}", report.n);
        eprintln!("mean: {:.4}", report.mean);
        eprintln!("sd: {:.4}", report.sd);
        if let Some(median) = report.median {
            eprintln!("median: {median:.4}");
        }
        eprintln!("skewness: {:.4}", report.skewness);
        eprintln!("excess kurtosis: {:.4}", report.kurtosis);
        match report.bimodality {
            Some(b) => eprintln!("bimodality coefficient: {b:.4}"),
            None => eprintln!("bimodality coefficient: NA (n <= 3 or zero variance)"),
        }
    }
    if let Some(path) = matches.get_one::<String>("stats") {
        std::fs::write(PathBuf::from(path), serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}
