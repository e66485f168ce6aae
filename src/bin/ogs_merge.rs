//! Merge orthology-group tables, unioning groups that share a gene.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::io;
use enveomics::ogs::OgCollection;

fn main() -> Result<()> {
    let matches = Command::new("env-ogs-merge")
        .version("0.1.0")
        .about("Merge orthology group tables; groups sharing a gene are unioned")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("TSV")
                .help("Orthology table (repeatable; genome names in the header)")
                .action(ArgAction::Append)
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("TSV")
                .help("Merged table ('-' for stdout)")
                .required(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let inputs: Vec<&String> = matches.get_many::<String>("input").unwrap().collect();
    let output = matches.get_one::<String>("output").unwrap();
    let quiet = matches.get_flag("quiet");

    let mut collection = OgCollection::new();
    for input in &inputs {
        let added = collection.read_table(io::reader(input)?)?;
        if !quiet {
            eprintln!("{input}: {added} groups read");
        }
    }

    let mut writer = io::writer(output)?;
    collection.write_table(&mut writer)?;
    writer.flush()?;
    if !quiet {
        eprintln!(
            "merged into {} groups over {} genomes ({} core)",
            collection.groups.len(),
            collection.genomes.len(),
            collection.core_count()
        );
    }
    Ok(())
}
