//! Collapse JPlace read placements into a per-edge table.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use enveomics::io;
use enveomics::jplace::JplaceTree;
use std::io::Write as _;

fn main() -> Result<()> {
    let matches = Command::new("env-jplace-collapse")
        .version("0.1.0")
        .about("Collapse phylogenetic read placements into one row per tree edge")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("JPLACE")
                .help("Input .jplace file ('-' for stdin, gzip supported)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("TSV")
                .help("Per-edge table ('-' for stdout)")
                .default_value("-"),
        )
        .arg(
            Arg::new("leaves")
                .short('l')
                .long("leaves")
                .help("Add a column with the reference leaves under each edge")
                .action(ArgAction::SetTrue),
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
    let with_leaves = matches.get_flag("leaves");
    let quiet = matches.get_flag("quiet");

    let tree = JplaceTree::from_reader(io::reader(input)?)?;
    let per_edge = tree.reads_per_edge();

    let mut writer = io::writer(output)?;
    if with_leaves {
        writeln!(writer, "edge\treads\tread_names\tleaves")?;
    } else {
        writeln!(writer, "edge\treads\tread_names")?;
    }
    for (edge, names) in &per_edge {
        if with_leaves {
            let leaves = tree.leaves_under_edge(*edge)?;
            writeln!(
                writer,
                "{edge}\t{}\t{}\t{}",
                names.len(),
                names.join(","),
                leaves.join(",")
            )?;
        } else {
            writeln!(writer, "{edge}\t{}\t{}", names.len(), names.join(","))?;
        }
    }
    writer.flush()?;
    if !quiet {
        eprintln!(
            "{} placements over {} edges",
            tree.placements.len(),
            per_edge.len()
        );
    }
    Ok(())
}
