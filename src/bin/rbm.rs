//! Reciprocal best matches between two FastA sequence sets.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::io;
use enveomics::rbm::{reciprocal_best_matches, RbmConfig, SearchEngine};
use serde::Serialize;
use std::io::Write as _;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct RbmReport {
    pairs: usize,
    engine: String,
    mean_identity_ab: Option<f64>,
    mean_bitscore_ab: Option<f64>,
}

fn main() -> Result<()> {
    let matches = Command::new("env-rbm")
        .version("0.1.0")
        .about("Reciprocal best matches between two sequence sets via an external aligner")
        .arg(
            Arg::new("seqs-a")
                .short('1')
                .long("seqs-a")
                .value_name("FASTA")
                .help("First sequence set")
                .required(true),
        )
        .arg(
            Arg::new("seqs-b")
                .short('2')
                .long("seqs-b")
                .value_name("FASTA")
                .help("Second sequence set")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("TSV")
                .help("Reciprocal pairs table ('-' for stdout)")
                .default_value("-"),
        )
        .arg(
            Arg::new("engine")
                .short('e')
                .long("engine")
                .value_name("NAME")
                .help("Search engine: blast+, diamond, or blat")
                .default_value("blast+"),
        )
        .arg(
            Arg::new("nucl")
                .short('n')
                .long("nucl")
                .help("Inputs are nucleotides (default: proteins)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("INT")
                .default_value("1"),
        )
        .arg(
            Arg::new("min-length")
                .short('l')
                .long("min-length")
                .value_name("AA/BP")
                .help("Minimum alignment length")
                .default_value("0"),
        )
        .arg(
            Arg::new("min-identity")
                .short('d')
                .long("min-identity")
                .value_name("PERCENT")
                .help("Minimum percent identity")
                .default_value("0"),
        )
        .arg(
            Arg::new("min-score")
                .short('s')
                .long("min-score")
                .value_name("BITS")
                .help("Minimum bit score")
                .default_value("40"),
        )
        .arg(
            Arg::new("min-fraction")
                .short('f')
                .long("min-fraction")
                .value_name("0..1")
                .help("Minimum aligned fraction of the query")
                .default_value("0"),
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

    let seqs_a = PathBuf::from(matches.get_one::<String>("seqs-a").unwrap());
    let seqs_b = PathBuf::from(matches.get_one::<String>("seqs-b").unwrap());
    let output = matches.get_one::<String>("output").unwrap();
    let quiet = matches.get_flag("quiet");
    // Engine choice fails here, before anything touches the filesystem
    let engine: SearchEngine = matches.get_one::<String>("engine").unwrap().parse()?;
    let config = RbmConfig {
        engine,
        nucl: matches.get_flag("nucl"),
        threads: matches.get_one::<String>("threads").unwrap().parse()?,
        min_length: matches.get_one::<String>("min-length").unwrap().parse()?,
        min_identity: matches.get_one::<String>("min-identity").unwrap().parse()?,
        min_score: matches.get_one::<String>("min-score").unwrap().parse()?,
        min_fraction: matches.get_one::<String>("min-fraction").unwrap().parse()?,
    };

    if !quiet {
        eprintln!(
            "searching {} vs {} with {:?}",
            seqs_a.display(),
            seqs_b.display(),
            config.engine
        );
    }
    let pairs = reciprocal_best_matches(&seqs_a, &seqs_b, &config)?;

    let mut writer = io::writer(output)?;
    writeln!(
        writer,
        "seq_a\tseq_b\tidentity_ab\tidentity_ba\tbitscore_ab\tbitscore_ba\taln_len_ab"
    )?;
    for pair in &pairs {
        writeln!(
            writer,
            "{}\t{}\t{:.2}\t{:.2}\t{:.1}\t{:.1}\t{}",
            pair.forward.qry,
            pair.forward.sbj,
            pair.forward.identity,
            pair.reverse.identity,
            pair.forward.bitscore,
            pair.reverse.bitscore,
            pair.forward.aln_len
        )?;
    }
    writer.flush()?;
    let mean_identity = (!pairs.is_empty())
        .then(|| pairs.iter().map(|p| p.forward.identity).sum::<f64>() / pairs.len() as f64);
    if !quiet {
        eprintln!("{} reciprocal best matches", pairs.len());
        if let Some(mean_identity) = mean_identity {
            eprintln!("mean identity (A vs B): {mean_identity:.2}%");
        }
    }
    if let Some(path) = matches.get_one::<String>("stats") {
        let report = RbmReport {
            pairs: pairs.len(),
            engine: format!("{:?}", config.engine),
            mean_identity_ab: mean_identity,
            mean_bitscore_ab: (!pairs.is_empty())
                .then(|| pairs.iter().map(|p| p.forward.bitscore).sum::<f64>() / pairs.len() as f64),
        };
        std::fs::write(PathBuf::from(path), serde_json::to_string_pretty(&report)?)?;
    }
    Ok(())
}
