//! Convert FastQ to FastA, reporting the qualities left behind.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::fasta::{FastaRecord, FastaWriter};
use enveomics::fastq::FastqReader;
use enveomics::io;
use std::io::Write as _;

fn main() -> Result<()> {
    let matches = Command::new("env-fastq-to-fasta")
        .version("0.1.0")
        .about("Convert FastQ reads to FastA")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FASTQ")
                .help("Input FastQ file ('-' for stdin, gzip supported)")
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
                .help("Output line width; 0 for single-line")
                .default_value("0"),
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

    let mut writer = FastaWriter::new(io::writer(output)?, wrap);
    let mut reads = 0u64;
    let mut quality_sum = 0f64;
    for record in FastqReader::new(io::reader(input)?) {
        let record = record?;
        quality_sum += record.mean_quality();
        let mut fasta = FastaRecord::new(record.id.clone(), record.seq.clone());
        fasta.desc = record.desc.clone();
        writer.write_record(&fasta)?;
        reads += 1;
    }
    writer.into_inner().flush()?;
    if !quiet {
        let mean_q = if reads > 0 {
            quality_sum / reads as f64
        } else {
            0.0
        };
        eprintln!("converted {reads} reads (mean quality {mean_q:.1}, dropped)");
    }
    Ok(())
}
