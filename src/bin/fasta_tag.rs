//! Add a prefix and/or suffix to every FastA defline.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::fasta::{FastaReader, FastaWriter};
use enveomics::io;
use std::io::Write as _;

fn main() -> Result<()> {
    let matches = Command::new("env-fasta-tag")
        .version("0.1.0")
        .about("Tag FastA deflines with a prefix and/or suffix")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FASTA")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FASTA")
                .required(true),
        )
        .arg(
            Arg::new("prefix")
                .short('p')
                .long("prefix")
                .value_name("STR")
                .help("String prepended to each sequence id"),
        )
        .arg(
            Arg::new("suffix")
                .short('s')
                .long("suffix")
                .value_name("STR")
                .help("String appended to each sequence id"),
        )
        .arg(
            Arg::new("strip-desc")
                .short('d')
                .long("strip-desc")
                .help("Drop defline descriptions, keep only the id")
                .action(ArgAction::SetTrue),
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
    let prefix = matches.get_one::<String>("prefix").cloned().unwrap_or_default();
    let suffix = matches.get_one::<String>("suffix").cloned().unwrap_or_default();
    let strip_desc = matches.get_flag("strip-desc");
    let quiet = matches.get_flag("quiet");
    if prefix.is_empty() && suffix.is_empty() && !strip_desc {
        anyhow::bail!("nothing to do: give --prefix, --suffix, or --strip-desc");
    }

    let mut writer = FastaWriter::new(io::writer(output)?, wrap);
    let mut tagged = 0u64;
    for record in FastaReader::new(io::reader(input)?) {
        let mut record = record?;
        record.id = format!("{prefix}{}{suffix}", record.id);
        if strip_desc {
            record.desc = None;
        }
        writer.write_record(&record)?;
        tagged += 1;
    }
    writer.into_inner().flush()?;
    if !quiet {
        eprintln!("tagged {tagged} deflines");
    }
    Ok(())
}
