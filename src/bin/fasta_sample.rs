//! Randomly subsample sequences from a FastA file.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::fasta::{FastaReader, FastaWriter};
use enveomics::io;
use std::io::Write as _;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<()> {
    let matches = Command::new("env-fasta-sample")
        .version("0.1.0")
        .about("Randomly subsample sequences by fraction")
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
                .value_name("FASTA")
                .help("Output FastA file ('-' for stdout, '.gz' for gzip)")
                .required(true),
        )
        .arg(
            Arg::new("fraction")
                .short('f')
                .long("fraction")
                .value_name("0..1")
                .help("Probability of keeping each sequence")
                .default_value("0.1"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .value_name("INT")
                .help("Random seed for reproducible sampling"),
        )
        .arg(
            Arg::new("wrap")
                .short('w')
                .long("wrap")
                .value_name("WIDTH")
                .default_value("70"),
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
    let wrap: usize = matches.get_one::<String>("wrap").unwrap().parse()?;
    let quiet = matches.get_flag("quiet");
    let fraction: f64 = matches.get_one::<String>("fraction").unwrap().parse()?;
    if !(0.0..=1.0).contains(&fraction) {
        anyhow::bail!("--fraction must be between 0 and 1, got {fraction}");
    }
    let mut rng: StdRng = match matches.get_one::<String>("seed") {
        Some(seed) => StdRng::seed_from_u64(seed.parse()?),
        None => StdRng::from_entropy(),
    };

    let mut writer = FastaWriter::new(io::writer(output)?, wrap);
    let mut seen = 0u64;
    let mut kept = 0u64;
    for record in FastaReader::new(io::reader(input)?) {
        let record = record?;
        seen += 1;
        if rng.gen::<f64>() < fraction {
            writer.write_record(&record)?;
            kept += 1;
        }
    }
    writer.into_inner().flush()?;
    if !quiet {
        eprintln!("kept {kept} of {seen} sequences (target fraction {fraction})");
    }
    Ok(())
}
