//! Detect sister forward/reverse hits of read pairs in tabular BLAST output.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::blast::{paired_hits, PairedHitsConfig};
use enveomics::errors::EnveomicsError;
use enveomics::io;
use serde::Serialize;
use std::io::Write as _;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct PairedHitsReport {
    pairs: usize,
    min_score: f64,
    max_distance: usize,
}

fn main() -> Result<()> {
    let matches = Command::new("env-blast-paired-hits")
        .version("0.1.0")
        .about("Report read templates whose two mates hit the same subject")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("TSV")
                .help("Tabular BLAST input ('-' for stdin, gzip supported)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("TSV")
                .help("Pair table ('-' for stdout)")
                .required(true),
        )
        .arg(
            Arg::new("separator")
                .short('p')
                .long("separator")
                .value_name("CHAR")
                .help("Separator between template name and mate suffix")
                .default_value("/"),
        )
        .arg(
            Arg::new("min-score")
                .short('s')
                .long("min-score")
                .value_name("BITS")
                .help("Ignore hits scoring below this")
                .default_value("0"),
        )
        .arg(
            Arg::new("max-distance")
                .short('d')
                .long("max-distance")
                .value_name("BP")
                .help("Maximum distance between sister hit midpoints")
                .default_value("10000"),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .value_name("JSON")
                .help("Write a run summary as JSON"),
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
    let quiet = matches.get_flag("quiet");
    let separator = matches.get_one::<String>("separator").unwrap();
    let config = PairedHitsConfig {
        mate_separator: separator.parse().map_err(|_| {
            EnveomicsError::Option(format!("--separator must be one character, got '{separator}'"))
        })?,
        min_score: matches.get_one::<String>("min-score").unwrap().parse()?,
        max_distance: matches.get_one::<String>("max-distance").unwrap().parse()?,
    };

    let pairs = paired_hits(io::reader(input)?, &config)?;
    let mut writer = io::writer(output)?;
    writeln!(writer, "template\tsubject\tdistance\tfwd_bitscore\trev_bitscore")?;
    for pair in &pairs {
        writeln!(
            writer,
            "{}\t{}\t{}\t{:.1}\t{:.1}",
            pair.template,
            pair.forward.sbj,
            pair.distance(),
            pair.forward.bitscore,
            pair.reverse.bitscore
        )?;
    }
    writer.flush()?;
    if !quiet {
        eprintln!("found {} paired hits", pairs.len());
    }
    if let Some(path) = matches.get_one::<String>("stats") {
        let report = PairedHitsReport {
            pairs: pairs.len(),
            min_score: config.min_score,
            max_distance: config.max_distance,
        };
        std::fs::write(PathBuf::from(path), serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}
