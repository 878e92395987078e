use clap::*;
use log::{debug, warn};
use std::io::Write;
use std::path::Path;

use balign::{service_for, AlignFiles, AlignOptions, FileFormat, TempFileManager};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("plan")
        .about("Synthesize the blasr command line for an alignment run")
        .after_help(
            r###"
Typed options given here are merged with whatever is inside
--algorithm-options. Flags that mean the same thing must agree:

* --max-hits        vs blasr -bestn
* --min-anchor-size vs blasr -minMatch
* --useccs          vs blasr -useccs/-useccsall/-useccsdenovo

Disagreement on any of these aborts the run. Thread counts, seeds, sa
files and region tables are not critical; the last value wins. Raw
flags this tool does not recognize are passed through untouched.

The output container is chosen by the extension of <outfile>:
*.bam gets blasr -bam, anything else -sam.

Examples:
    # Plan a run, 10 hits per query, 8 threads
    balign plan reads.fasta ref.fasta out.bam --max-hits 10 --nproc 8

    # Mix typed and raw options
    balign plan reads.fasta ref.fasta out.sam \
        --concordant --algorithm-options '-bestn 10 -advanceExactMatches 10'

"###,
        )
        .arg(
            Arg::new("query")
                .required(true)
                .index(1)
                .help("Query reads, FASTA/FASTQ or a FOFN of them"),
        )
        .arg(
            Arg::new("target")
                .required(true)
                .index(2)
                .help("Reference FASTA file"),
        )
        .arg(
            Arg::new("outfile")
                .required(true)
                .index(3)
                .help("Alignment output, SAM or BAM"),
        )
        .arg(
            Arg::new("max_hits")
                .long("max-hits")
                .num_args(1)
                .value_parser(value_parser!(i32))
                .help("Maximum number of reported alignments per query"),
        )
        .arg(
            Arg::new("min_anchor_size")
                .long("min-anchor-size")
                .num_args(1)
                .value_parser(value_parser!(i32))
                .help("Minimum anchor length to seed an alignment"),
        )
        .arg(
            Arg::new("nproc")
                .long("nproc")
                .num_args(1)
                .value_parser(value_parser!(i32))
                .help("Number of worker threads"),
        )
        .arg(
            Arg::new("min_length")
                .long("min-length")
                .num_args(1)
                .value_parser(value_parser!(i32))
                .help("Minimum subread/read length to align"),
        )
        .arg(
            Arg::new("no_split_subreads")
                .long("no-split-subreads")
                .action(ArgAction::SetTrue)
                .help("Do not split reads into subreads"),
        )
        .arg(
            Arg::new("concordant")
                .long("concordant")
                .action(ArgAction::SetTrue)
                .help("Map subreads of a ZMW to where the longest full pass aligned"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .num_args(1)
                .value_parser(value_parser!(i32))
                .help("Random seed for stochastic tie-breaking, 0 keeps the default"),
        )
        .arg(
            Arg::new("hit_policy")
                .long("hit-policy")
                .num_args(1)
                .value_parser(["random", "all", "allbest", "randombest", "leftmost"])
                .default_value("allbest")
                .help("How to treat multiple hits of a query"),
        )
        .arg(
            Arg::new("useccs")
                .long("useccs")
                .num_args(1)
                .value_parser(["useccs", "useccsall", "useccsdenovo"])
                .help("How circular consensus reads are aligned"),
        )
        .arg(
            Arg::new("sa")
                .long("sa")
                .num_args(1)
                .help("Precomputed suffix array index of the reference"),
        )
        .arg(
            Arg::new("region_table")
                .long("region-table")
                .num_args(1)
                .help("Region table for filtering reads"),
        )
        .arg(
            Arg::new("algorithm_options")
                .long("algorithm-options")
                .num_args(1)
                .allow_hyphen_values(true)
                .help("Additional arguments passed directly to blasr"),
        )
        .arg(
            Arg::new("tmp_dir")
                .long("tmp-dir")
                .num_args(1)
                .help("Root directory for staged temporary files"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Write the command line here instead of stdout"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let query_file = args.get_one::<String>("query").unwrap();
    let target_file = args.get_one::<String>("target").unwrap();
    let outfile = args.get_one::<String>("outfile").unwrap();

    if !Path::new(query_file).exists() {
        anyhow::bail!("Query file {} does not exist", query_file);
    }
    if !Path::new(target_file).exists() {
        anyhow::bail!("Target file {} does not exist", target_file);
    }

    let svc = service_for("blasr").unwrap();

    if which::which(svc.prog_name()).is_err() {
        warn!(
            "{} not found in PATH, the planned command will not run on this host",
            svc.prog_name()
        );
    }

    let opts = AlignOptions {
        max_hits: args.get_one::<i32>("max_hits").copied(),
        min_anchor_size: args.get_one::<i32>("min_anchor_size").copied(),
        nproc: args.get_one::<i32>("nproc").copied(),
        min_length: args.get_one::<i32>("min_length").copied(),
        no_split_subreads: args.get_flag("no_split_subreads"),
        concordant: args.get_flag("concordant"),
        seed: args.get_one::<i32>("seed").copied(),
        hit_policy: args
            .get_one::<String>("hit_policy")
            .unwrap()
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        useccs: match args.get_one::<String>("useccs") {
            Some(mode) => Some(mode.parse().map_err(|e: String| anyhow::anyhow!(e))?),
            None => None,
        },
        algorithm_options: args.get_one::<String>("algorithm_options").cloned(),
    };

    let mut files = AlignFiles::new(query_file, target_file, outfile);
    files.sa_file = args.get_one::<String>("sa").cloned();
    files.region_table = args.get_one::<String>("region_table").cloned();

    //----------------------------
    // Operating
    //----------------------------
    let mut tmp_mgr = TempFileManager::new();
    if let Some(tmp_dir) = args.get_one::<String>("tmp_dir") {
        tmp_mgr.set_root_dir(Path::new(tmp_dir))?;
    }
    debug!("Temp root is {}", tmp_mgr.root_dir().display());

    let staged = svc.pre_process(
        &files.query_file,
        Some(&files.target_file),
        files.region_table.as_deref(),
        opts.no_split_subreads,
        &mut tmp_mgr,
    )?;
    if staged != files.query_file {
        debug!("{}: Staged query as {}", svc.name(), staged);
        files.input_format = FileFormat::resolve(&staged);
        files.query_file = staged;
    }

    let (opts, files) = svc.resolve_options(&opts, &files)?;
    debug!(
        "{}: Score sign is {}, residual options '{}'",
        svc.name(),
        svc.score_sign(),
        opts.algorithm_options.as_deref().unwrap_or("")
    );

    let cmd = svc.to_cmd(&opts, &files);

    //----------------------------
    // Output
    //----------------------------
    let mut writer = balign::writer(args.get_one::<String>("output").unwrap())?;
    writeln!(writer, "{}", cmd)?;

    Ok(())
}
