//! Re-wrap FastA sequence lines at a fixed width.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::fasta::{FastaReader, FastaWriter};
use enveomics::io;
use std::io::Write as _;

fn main() -> Result<()> {
    let matches = Command::new("env-fasta-wrap")
        .version("0.1.0")
        .about("Re-wrap FastA sequence lines at a fixed width")
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
            Arg::new("wrap")
                .short('w')
                .long("wrap")
                .value_name("WIDTH")
                .help("Residues per line; 0 writes each sequence on one line")
                .default_value("70"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress the summary line")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let input = matches.get_one::<String>("input").unwrap();
    let output = matches.get_one::<String>("output").unwrap();
    let wrap: usize = matches.get_one::<String>("wrap").unwrap().parse()?;
    let quiet = matches.get_flag("quiet");

    let reader = FastaReader::new(io::reader(input)?);
    let mut writer = FastaWriter::new(io::writer(output)?, wrap);
    let mut records = 0u64;
    let mut residues = 0u64;
    for record in reader {
        let record = record?;
        residues += record.len() as u64;
        writer.write_record(&record)?;
        records += 1;
    }
    writer.into_inner().flush()?;
    if !quiet {
        eprintln!("{records} sequences ({residues} residues) re-wrapped at width {wrap}");
    }
    Ok(())
}
