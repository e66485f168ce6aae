//! Add a prefix and/or suffix to every FastQ read id.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::fastq::{FastqReader, FastqWriter};
use enveomics::io;
use std::io::Write as _;

fn main() -> Result<()> {
    let matches = Command::new("env-fastq-tag")
        .version("0.1.0")
        .about("Tag FastQ read ids with a prefix and/or suffix")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FASTQ")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FASTQ")
                .required(true),
        )
        .arg(
            Arg::new("prefix")
                .short('p')
                .long("prefix")
                .value_name("STR"),
        )
        .arg(
            Arg::new("suffix")
                .short('s')
                .long("suffix")
                .value_name("STR"),
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
    let prefix = matches.get_one::<String>("prefix").cloned().unwrap_or_default();
    let suffix = matches.get_one::<String>("suffix").cloned().unwrap_or_default();
    let quiet = matches.get_flag("quiet");
    if prefix.is_empty() && suffix.is_empty() {
        anyhow::bail!("nothing to do: give --prefix and/or --suffix");
    }

    let mut reader = FastqReader::new(io::reader(input)?);
    let mut writer = FastqWriter::new(io::writer(output)?);
    let mut tagged = 0u64;
    while let Some(record) = reader.next() {
        let mut record = record?;
        record.id = format!("{prefix}{}{suffix}", record.id);
        writer.write_record(&record)?;
        tagged += 1;
    }
    writer.into_inner().flush()?;
    if !quiet {
        eprintln!(
            "tagged {tagged} reads ({} input lines)",
            reader.line_number()
        );
    }
    Ok(())
}
