//! ROC-based read classification thresholds: build training data, compile
//! window thresholds, then filter or plot against the compiled model.
//!
//! Each task is an independent invocation; the only state between them is
//! the files on disk (simulated reads, the tabular search, the `.rocker`
//! model).

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use enveomics::fasta::FastaReader;
use enveomics::io;
use enveomics::rbm::run_command;
use enveomics::rocker::{
    map_hits, ProcSolver, RockerAlignment, RockerCompiler, RockerModel,
};
use serde::Serialize;
use std::io::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct CompileReport {
    columns: usize,
    hits: usize,
    true_positives: usize,
    windows: usize,
    unresolved_windows: usize,
}

#[derive(Debug, Serialize)]
struct FilterReport {
    seen: usize,
    kept: usize,
}

fn main() -> Result<()> {
    let app = Command::new("env-rocker")
        .version("0.1.0")
        .about("Window-based bit-score thresholds for targeted read classification")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(build_subcommand())
        .subcommand(compile_subcommand())
        .subcommand(filter_subcommand())
        .subcommand(plot_subcommand());

    match app.get_matches().subcommand() {
        Some(("build", sub)) => build(sub),
        Some(("compile", sub)) => compile(sub),
        Some(("filter", sub)) => filter(sub),
        Some(("plot", sub)) => plot(sub),
        _ => unreachable!(),
    }
}

fn quiet_arg() -> Arg {
    Arg::new("quiet")
        .short('q')
        .long("quiet")
        .action(ArgAction::SetTrue)
}

fn stats_arg() -> Arg {
    Arg::new("stats")
        .long("stats")
        .value_name("JSON")
        .help("Write a run summary as JSON")
}

fn write_stats<T: Serialize>(matches: &ArgMatches, report: &T) -> Result<()> {
    if let Some(path) = matches.get_one::<String>("stats") {
        std::fs::write(PathBuf::from(path), serde_json::to_string_pretty(report)?)?;
    }
    Ok(())
}

fn build_subcommand() -> Command {
    Command::new("build")
        .about("Align references and simulate training reads (muscle + grinder)")
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .value_name("FASTA")
                .help("Target (positive) reference sequences")
                .required(true),
        )
        .arg(
            Arg::new("nontarget")
                .short('n')
                .long("nontarget")
                .value_name("FASTA")
                .help("Non-target sequences mixed into the simulated metagenome")
                .required(true),
        )
        .arg(
            Arg::new("out-prefix")
                .short('o')
                .long("out-prefix")
                .value_name("PREFIX")
                .help("Prefix for <prefix>.aln, <prefix>.reads.fa, <prefix>.blast.tsv")
                .required(true),
        )
        .arg(
            Arg::new("coverage")
                .short('c')
                .long("coverage")
                .value_name("X")
                .help("Simulated fold coverage")
                .default_value("20"),
        )
        .arg(
            Arg::new("read-length")
                .short('l')
                .long("read-length")
                .value_name("BP")
                .default_value("100"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .value_name("INT")
                .default_value("1"),
        )
        .arg(quiet_arg())
}

fn compile_subcommand() -> Command {
    Command::new("compile")
        .about("Fit per-window bit-score thresholds with Rscript/pROC")
        .arg(
            Arg::new("alignment")
                .short('a')
                .long("alignment")
                .value_name("FASTA")
                .help("Reference multiple alignment")
                .required(true),
        )
        .arg(
            Arg::new("blast")
                .short('b')
                .long("blast")
                .value_name("TSV")
                .help("Tabular search of simulated reads against the references")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("ROCKER")
                .help("Compiled model file")
                .required(true),
        )
        .arg(
            Arg::new("window")
                .short('w')
                .long("window")
                .value_name("COLS")
                .help("Initial window width in alignment columns")
                .default_value("20"),
        )
        .arg(
            Arg::new("tp-tag")
                .long("tp-tag")
                .value_name("STR")
                .help("Substring marking true-positive read ids")
                .default_value("_tp"),
        )
        .arg(stats_arg())
        .arg(quiet_arg())
}

fn filter_subcommand() -> Command {
    Command::new("filter")
        .about("Keep hits clearing the window threshold of a compiled model")
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("ROCKER")
                .required(true),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("TSV")
                .help("Tabular search to filter ('-' for stdin)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("TSV")
                .required(true),
        )
        .arg(stats_arg())
        .arg(quiet_arg())
}

fn plot_subcommand() -> Command {
    Command::new("plot")
        .about("Plot window thresholds over the alignment (Rscript)")
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("ROCKER")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PDF")
                .required(true),
        )
        .arg(quiet_arg())
}

fn check_requirements(programs: &[&str]) -> Result<()> {
    for program in programs {
        if which::which(program).is_err() {
            anyhow::bail!("required program '{program}' not found in PATH");
        }
    }
    Ok(())
}

fn build(matches: &ArgMatches) -> Result<()> {
    let target = PathBuf::from(matches.get_one::<String>("target").unwrap());
    let nontarget = PathBuf::from(matches.get_one::<String>("nontarget").unwrap());
    let prefix = matches.get_one::<String>("out-prefix").unwrap();
    let coverage = matches.get_one::<String>("coverage").unwrap();
    let read_length = matches.get_one::<String>("read-length").unwrap();
    let threads = matches.get_one::<String>("threads").unwrap();
    let quiet = matches.get_flag("quiet");
    check_requirements(&["muscle", "grinder", "makeblastdb", "blastn"])?;

    let aln = PathBuf::from(format!("{prefix}.aln"));
    let reads = PathBuf::from(format!("{prefix}.reads"));
    let blast = PathBuf::from(format!("{prefix}.blast.tsv"));
    let work = tempfile::TempDir::new()?;

    if !quiet {
        eprintln!("aligning targets with muscle");
    }
    run_command(
        "muscle",
        &[
            "-align".as_ref(),
            target.as_os_str(),
            "-output".as_ref(),
            aln.as_os_str(),
        ],
    )?;

    if !quiet {
        eprintln!("simulating reads with grinder");
    }
    // Targets and non-targets are simulated together so abundances compete
    let pool = work.path().join("pool.fa");
    concat_fasta(&[&target, &nontarget], &pool)?;
    run_command(
        "grinder",
        &[
            "-reference_file".as_ref(),
            pool.as_os_str(),
            "-coverage_fold".as_ref(),
            coverage.as_ref(),
            "-read_dist".as_ref(),
            read_length.as_ref(),
            "-base_name".as_ref(),
            reads.as_os_str(),
        ],
    )?;
    let reads_fa = PathBuf::from(format!("{}-reads.fa", reads.display()));

    if !quiet {
        eprintln!("searching simulated reads against the targets");
    }
    let db = work.path().join("targets.db");
    run_command(
        "makeblastdb",
        &[
            "-in".as_ref(),
            target.as_os_str(),
            "-dbtype".as_ref(),
            "nucl".as_ref(),
            "-out".as_ref(),
            db.as_os_str(),
        ],
    )?;
    run_command(
        "blastn",
        &[
            "-query".as_ref(),
            reads_fa.as_os_str(),
            "-db".as_ref(),
            db.as_os_str(),
            "-out".as_ref(),
            blast.as_os_str(),
            "-outfmt".as_ref(),
            "6".as_ref(),
            "-num_threads".as_ref(),
            threads.as_ref(),
        ],
    )?;
    if !quiet {
        eprintln!("wrote {} and {}", aln.display(), blast.display());
        eprintln!("next: env-rocker compile -a {} -b {}", aln.display(), blast.display());
    }
    Ok(())
}

fn concat_fasta(inputs: &[&Path], out: &Path) -> Result<()> {
    let mut writer = std::io::BufWriter::new(std::fs::File::create(out)?);
    for input in inputs {
        let mut reader = io::reader(input)?;
        std::io::copy(&mut reader, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn compile(matches: &ArgMatches) -> Result<()> {
    let alignment_path = matches.get_one::<String>("alignment").unwrap();
    let blast = matches.get_one::<String>("blast").unwrap();
    let output = matches.get_one::<String>("output").unwrap();
    let window: usize = matches.get_one::<String>("window").unwrap().parse()?;
    let tp_tag = matches.get_one::<String>("tp-tag").unwrap();
    let quiet = matches.get_flag("quiet");

    // pROC availability is checked once, before any window is fitted
    let solver = ProcSolver::check()?;

    let records = FastaReader::new(io::reader(alignment_path)?)
        .collect::<enveomics::Result<Vec<_>>>()?;
    let alignment = RockerAlignment::from_records(records)?;
    let hits = map_hits(io::reader(blast)?, &alignment, tp_tag)?;
    let tps = hits.iter().filter(|h| h.true_positive).count();
    if !quiet {
        eprintln!(
            "{} columns, {} hits ({} true positives)",
            alignment.cols(),
            hits.len(),
            tps
        );
    }

    let compiler = RockerCompiler {
        window_size: window,
        ..RockerCompiler::default()
    };
    let windows = compiler.compile(&alignment, &hits, &solver)?;
    let unresolved = windows.iter().filter(|w| w.threshold.is_none()).count();
    for w in windows.iter().filter(|w| w.threshold.is_none()) {
        eprintln!(
            "warning: window {}..{} has no resolvable threshold",
            w.from, w.to
        );
    }

    let report = CompileReport {
        columns: alignment.cols(),
        hits: hits.len(),
        true_positives: tps,
        windows: windows.len(),
        unresolved_windows: unresolved,
    };
    let model = RockerModel { alignment, windows };
    let mut writer = io::writer(output)?;
    model.write(&mut writer)?;
    writer.flush()?;
    if !quiet {
        eprintln!("compiled {} windows into {output}", model.windows.len());
    }
    write_stats(matches, &report)?;
    Ok(())
}

fn filter(matches: &ArgMatches) -> Result<()> {
    let model_path = matches.get_one::<String>("model").unwrap();
    let input = matches.get_one::<String>("input").unwrap();
    let output = matches.get_one::<String>("output").unwrap();
    let quiet = matches.get_flag("quiet");

    let model = RockerModel::read(io::reader(model_path)?)?;
    let mut writer = io::writer(output)?;
    let (seen, kept) = model.filter(io::reader(input)?, &mut writer)?;
    writer.flush()?;
    if !quiet {
        eprintln!("kept {kept} of {seen} hits");
    }
    write_stats(matches, &FilterReport { seen, kept })?;
    Ok(())
}

const PLOT_SCRIPT: &str = r#"
a <- commandArgs(trailingOnly=TRUE)
d <- read.table(a[1], sep='\t', header=FALSE, col.names=c('from','to','hits','tps','threshold'))
pdf(a[2])
plot(NA, xlim=c(1, max(d$to)), ylim=c(0, max(d$threshold, na.rm=TRUE) * 1.1),
     xlab='Alignment column', ylab='Bit score threshold')
segments(d$from, d$threshold, d$to, d$threshold, lwd=2)
dev.off()
"#;

fn plot(matches: &ArgMatches) -> Result<()> {
    let model_path = matches.get_one::<String>("model").unwrap();
    let output = matches.get_one::<String>("output").unwrap();
    let quiet = matches.get_flag("quiet");
    check_requirements(&["Rscript"])?;

    // Re-emit just the window rows for R
    let model = RockerModel::read(io::reader(model_path)?)?;
    let work = tempfile::TempDir::new()?;
    let windows_tsv = work.path().join("windows.tsv");
    {
        let mut writer = std::io::BufWriter::new(std::fs::File::create(&windows_tsv)?);
        for w in &model.windows {
            let threshold = match w.threshold {
                Some(t) => format!("{t:.4}"),
                None => "NA".to_string(),
            };
            writeln!(writer, "{}\t{}\t{}\t{}\t{}", w.from, w.to, w.hits, w.tps, threshold)?;
        }
    }
    run_command(
        "Rscript",
        &[
            "-e".as_ref(),
            PLOT_SCRIPT.as_ref(),
            windows_tsv.as_os_str(),
            output.as_ref(),
        ],
    )?;
    if !quiet {
        eprintln!("plotted {} windows into {output}", model.windows.len());
    }
    Ok(())
}
