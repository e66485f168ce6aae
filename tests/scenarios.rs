//! End-to-end flows over small fixtures: the kinds of files the command
//! line tools consume, driven through the library layer.

use enveomics::blast::{paired_hits, top_hits, PairedHitsConfig, SortKey};
use enveomics::fasta::{mask_region, FastaReader, FastaRecord};
use enveomics::ogs::{OgCollection, OrthologyGroup};
use enveomics::rocker::{RockerAlignment, RockerModel, RockerWindow};
use enveomics::{io, Result};
use std::io::Write;

#[test]
fn top_hits_keeps_best_scores_in_order() {
    // Three hits for one query arriving unsorted by score.
    let table = "\
q1\ts1\t99.0\t100\t1\t0\t1\t100\t5\t104\t1e-30\t50.0
q1\ts2\t98.0\t100\t1\t0\t1\t100\t9\t108\t1e-40\t80.0
q1\ts3\t97.0\t100\t1\t0\t1\t100\t13\t112\t1e-10\t30.0
";
    let hits = top_hits(table.as_bytes(), 2, SortKey::Bitscore).unwrap();
    let scores: Vec<f64> = hits.iter().map(|h| h.bitscore).collect();
    assert_eq!(scores, vec![80.0, 50.0]);
}

#[test]
fn top_hits_preserves_query_first_appearance_order() {
    let table = "\
qB\ts1\t99.0\t100\t1\t0\t1\t100\t1\t100\t1e-30\t50.0
qA\ts1\t99.0\t100\t1\t0\t1\t100\t1\t100\t1e-30\t70.0
qB\ts2\t99.0\t100\t1\t0\t1\t100\t1\t100\t1e-30\t60.0
";
    let hits = top_hits(table.as_bytes(), 1, SortKey::Bitscore).unwrap();
    let queries: Vec<&str> = hits.iter().map(|h| h.qry.as_str()).collect();
    assert_eq!(queries, vec!["qB", "qA"]);
    assert_eq!(hits[0].bitscore, 60.0);
}

#[test]
fn mask_scenario_replaces_inner_range_only() {
    let masked = mask_region("ACGTACGT", 3, 6, 'N').unwrap();
    assert_eq!(masked, "ACNNNNGT");
}

#[test]
fn paired_hits_pairs_mates_on_one_subject() {
    let table = "\
read7/1\tctg1\t99.0\t100\t1\t0\t1\t100\t200\t299\t1e-30\t180.0
read7/2\tctg1\t99.0\t100\t1\t0\t1\t100\t450\t351\t1e-30\t175.0
read8/1\tctg1\t99.0\t100\t1\t0\t1\t100\t900\t999\t1e-30\t120.0
";
    let pairs = paired_hits(table.as_bytes(), &PairedHitsConfig::default()).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].template, "read7");
    assert_eq!(pairs[0].forward.bitscore, 180.0);
    assert_eq!(pairs[0].reverse.bitscore, 175.0);
}

#[test]
fn gzip_fasta_survives_a_disk_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("seqs.fa.gz");

    let record = FastaRecord::new("contig_1", "ACGTACGTACGTNNNNACGT");
    {
        let mut writer = io::writer(&path)?;
        writeln!(writer, ">{}", record.id)?;
        writeln!(writer, "{}", record.seq)?;
        writer.flush()?;
    }

    let parsed: Vec<FastaRecord> = FastaReader::new(io::reader(&path)?).collect::<Result<_>>()?;
    assert_eq!(parsed, vec![record]);
    Ok(())
}

#[test]
fn record_writer_over_gzip_flushes_a_complete_file() -> Result<()> {
    use enveomics::fasta::FastaWriter;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.fa.gz");

    let record = FastaRecord::new("s1", "ACGTACGTACGT");
    let mut writer = FastaWriter::new(io::writer(&path)?, 4);
    writer.write_record(&record)?;
    writer.into_inner().flush()?;

    let parsed: Vec<FastaRecord> = FastaReader::new(io::reader(&path)?).collect::<Result<_>>()?;
    assert_eq!(parsed, vec![record]);
    Ok(())
}

#[test]
fn rocker_model_round_trips_and_filters() -> Result<()> {
    let alignment = RockerAlignment::from_records(vec![
        FastaRecord::new("refA", "ACGT--ACGTACGTACGTAC"),
        FastaRecord::new("refB", "ACGTTTACGT--GTACGTAC"),
    ])?;
    let windows = vec![
        RockerWindow {
            from: 1,
            to: 10,
            hits: 12,
            tps: 9,
            threshold: Some(55.0),
        },
        RockerWindow {
            from: 11,
            to: 20,
            hits: 3,
            tps: 0,
            threshold: None,
        },
    ];
    let model = RockerModel { alignment, windows };

    let mut buf = Vec::new();
    model.write(&mut buf)?;
    let reread = RockerModel::read(buf.as_slice())?;
    assert_eq!(reread.windows, model.windows);
    assert_eq!(reread.alignment.cols(), 20);

    // refA residue 5 sits past the two gap columns, in the first window.
    let strong = "read1\trefA\t99.0\t50\t1\t0\t1\t50\t3\t7\t1e-20\t80.0\n";
    let weak = "read2\trefA\t99.0\t50\t1\t0\t1\t50\t3\t7\t1e-5\t20.0\n";
    let mut kept_out = Vec::new();
    let (seen, kept) =
        reread.filter(format!("{strong}{weak}").as_bytes(), &mut kept_out)?;
    assert_eq!((seen, kept), (2, 1));
    let kept_text = String::from_utf8(kept_out).unwrap();
    assert!(kept_text.contains("read1"));
    assert!(!kept_text.contains("read2"));
    Ok(())
}

#[test]
fn og_tables_merge_across_runs() -> Result<()> {
    let table_one = "\
genomeA\tgenomeB\tgenomeC
a1\tb1\tc1
a2\tb2\t-
";
    let table_two = "\
genomeA\tgenomeB\tgenomeC
a1\t-\tc9
a3\t-\tc3
";
    let mut collection = OgCollection::new();
    collection.read_table(table_one.as_bytes())?;

    // Second table shares gene a1, so its first group folds into an
    // existing one instead of adding a new row.
    let mut incoming = OgCollection::new();
    incoming.read_table(table_two.as_bytes())?;
    let genomes: Vec<String> = incoming.genomes.names().to_vec();
    for group in incoming.groups.drain(..) {
        let mut remapped = OrthologyGroup::new();
        for gene in group.genes() {
            let name = &genomes[gene.genome];
            let idx = collection.genomes.intern(name);
            remapped.insert(enveomics::ogs::Gene {
                genome: idx,
                id: gene.id.clone(),
            });
        }
        collection.add_merging(remapped);
    }

    assert_eq!(collection.groups.len(), 3);
    // a1's group gained c9 alongside b1 and c1.
    let merged = collection
        .groups
        .iter()
        .find(|g| g.genes().any(|gene| gene.id == "a1"))
        .unwrap();
    assert_eq!(merged.len(), 4);
    assert_eq!(collection.core_count(), 1);

    let mut out = Vec::new();
    collection.write_table(&mut out)?;
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("genomeA\tgenomeB\tgenomeC\n"));
    assert_eq!(text.lines().count(), 4);
    Ok(())
}
