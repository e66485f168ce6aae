//! Variant statistics from a VCF file.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::fasta::FastaReader;
use enveomics::io;
use enveomics::stats::Sample;
use enveomics::vcf::VcfVariant;
use serde::Serialize;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct VcfStatsReport {
    variants: u64,
    snps: u64,
    indels: u64,
    mean_depth: f64,
    mean_shannon: f64,
    depth_sd: f64,
}

fn main() -> Result<()> {
    let matches = Command::new("env-vcf-stats")
        .version("0.1.0")
        .about("Summarize variants from a VCF file")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("VCF")
                .help("Input VCF ('-' for stdin, gzip supported)")
                .required(true),
        )
        .arg(
            Arg::new("genome")
                .short('g')
                .long("genome")
                .value_name("FASTA")
                .help("Reference genome; REF alleles are checked against it"),
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
    let quiet = matches.get_flag("quiet");
    let genome: Option<HashMap<String, String>> = match matches.get_one::<String>("genome") {
        Some(path) => {
            let mut map = HashMap::new();
            for record in FastaReader::new(io::reader(path)?) {
                let record = record?;
                map.insert(record.id, record.seq);
            }
            Some(map)
        }
        None => None,
    };

    let mut variants = 0u64;
    let mut snps = 0u64;
    let mut indels = 0u64;
    let mut depths = Vec::new();
    let mut shannons = Vec::new();
    for (idx, row) in io::reader(input)?.lines().enumerate() {
        let row = row?;
        if row.is_empty() || row.starts_with('#') {
            continue;
        }
        let variant = VcfVariant::parse(&row, idx + 1)?;
        if let Some(genome) = &genome {
            variant.check_reference(genome, idx + 1)?;
        }
        variants += 1;
        if variant.is_indel() {
            indels += 1;
        } else {
            snps += 1;
        }
        if let Some(depth) = variant.depth() {
            depths.push(depth as f64);
        }
        if let Some(h) = variant.shannon {
            shannons.push(h);
        }
    }

    let depth_sample = Sample::new(depths)?;
    let shannon_sample = Sample::new(shannons)?;
    let report = VcfStatsReport {
        variants,
        snps,
        indels,
        mean_depth: depth_sample.mean(),
        depth_sd: depth_sample.sd(),
        mean_shannon: shannon_sample.mean(),
    };

    if !quiet {
        println!("variants: {}", report.variants);
        println!("snps: {}", report.snps);
        println!("indels: {}", report.indels);
        println!("mean depth: {:.1} (sd {:.1})", report.mean_depth, report.depth_sd);
        println!("mean Shannon information: {:.3} bits", report.mean_shannon);
    }
    if let Some(path) = matches.get_one::<String>("stats") {
        std::fs::write(PathBuf::from(path), serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}
