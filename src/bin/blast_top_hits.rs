//! Keep the best N tabular BLAST hits per query.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::blast::{top_hits, SortKey};
use enveomics::io;
use serde::Serialize;
use std::io::Write as _;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct TopHitsReport {
    hits_kept: usize,
    per_query: usize,
    sort_key: String,
}

fn main() -> Result<()> {
    let matches = Command::new("env-blast-top-hits")
        .version("0.1.0")
        .about("Keep the best N hits per query from tabular BLAST output")
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
                .help("Filtered output ('-' for stdout)")
                .required(true),
        )
        .arg(
            Arg::new("top")
                .short('n')
                .long("top")
                .value_name("N")
                .help("Hits to keep per query")
                .default_value("1"),
        )
        .arg(
            Arg::new("sort-by")
                .short('s')
                .long("sort-by")
                .value_name("KEY")
                .help("Ranking key: bitscore, identity, or length")
                .default_value("bitscore"),
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
    let n: usize = matches.get_one::<String>("top").unwrap().parse()?;
    let key: SortKey = matches.get_one::<String>("sort-by").unwrap().parse()?;
    let quiet = matches.get_flag("quiet");

    let hits = top_hits(io::reader(input)?, n, key)?;
    let mut writer = io::writer(output)?;
    for hit in &hits {
        writeln!(writer, "{}", hit.raw)?;
    }
    writer.flush()?;
    if !quiet {
        eprintln!("kept {} hits (top {n} per query)", hits.len());
    }
    if let Some(path) = matches.get_one::<String>("stats") {
        let report = TopHitsReport {
            hits_kept: hits.len(),
            per_query: n,
            sort_key: matches.get_one::<String>("sort-by").unwrap().clone(),
        };
        std::fs::write(PathBuf::from(path), serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}
