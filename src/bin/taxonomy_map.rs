//! Map sequence accessions to taxonomy via NCBI or EBI REST services.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::io;
use enveomics::remote::{TaxonomyClient, TaxonomySource};
use serde::Serialize;
use std::io::{BufRead, Write as _};
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct TaxonomyMapReport {
    accessions: u64,
    with_taxid: u64,
    source: String,
}

fn main() -> Result<()> {
    let matches = Command::new("env-taxonomy-map")
        .version("0.1.0")
        .about("Map sequence accessions to organism and lineage")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("LIST")
                .help("File with one accession per line ('-' for stdin)")
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
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("NAME")
                .help("Service to query: ncbi or ebi")
                .default_value("ncbi"),
        )
        .arg(
            Arg::new("retries")
                .short('r')
                .long("retries")
                .value_name("N")
                .help("Attempts per request before giving up")
                .default_value("5"),
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
    let source: TaxonomySource = matches.get_one::<String>("source").unwrap().parse()?;
    let retries: usize = matches.get_one::<String>("retries").unwrap().parse()?;
    let quiet = matches.get_flag("quiet");

    let client = TaxonomyClient::new(retries);
    let mut writer = io::writer(output)?;
    writeln!(writer, "accession\ttaxid\torganism\tlineage")?;
    let mut mapped = 0u64;
    let mut with_taxid = 0u64;
    for line in io::reader(input)?.lines() {
        let accession = line?.trim().to_string();
        if accession.is_empty() || accession.starts_with('#') {
            continue;
        }
        let record = client.map(source, &accession)?;
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            record.accession,
            record
                .taxid
                .map(|t| t.to_string())
                .unwrap_or_else(|| "NA".to_string()),
            record.organism,
            record.lineage
        )?;
        mapped += 1;
        if record.taxid.is_some() {
            with_taxid += 1;
        }
        if !quiet {
            eprintln!("{accession}: {}", record.organism);
        }
    }
    writer.flush()?;
    if !quiet {
        eprintln!("mapped {mapped} accessions via {source:?}");
    }
    if let Some(path) = matches.get_one::<String>("stats") {
        let report = TaxonomyMapReport {
            accessions: mapped,
            with_taxid,
            source: format!("{source:?}"),
        };
        std::fs::write(PathBuf::from(path), serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}
