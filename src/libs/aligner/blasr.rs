use itertools::Itertools;
use log::{debug, error, info};

use super::AlignService;
use crate::libs::error::AlignError;
use crate::libs::files::{AlignFiles, FileFormat};
use crate::libs::option::{tokenize, AlignOptions, CcsMode, HitPolicy};
use crate::libs::tmp::TempFileManager;

/// blasr flags that carry a value and are dropped without effect
const IGNORED_BINARY: [&str; 3] = ["-m", "-out", "-V"];
/// blasr flags without a value that are dropped without effect
const IGNORED_UNITARY: [&str; 7] = ["-h", "--help", "--version", "-v", "-vv", "-sam", "-bam"];

/// Calls blasr to align reads.
pub struct BlasrService;

// Absolutize a user-supplied path; one that cannot be resolved is kept
// verbatim.
fn real_path(path: &str) -> String {
    intspan::absolute_path(path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.to_string())
}

// Re-escape internal spaces so a reassembled path survives the shell.
fn shell_token(s: &str) -> String {
    s.replace(' ', "\\ ")
}

fn value_token<'a>(items: &'a [String], i: usize, raw: &str) -> Result<&'a str, AlignError> {
    match items.get(i + 1) {
        Some(val) => Ok(val.as_str()),
        None => {
            let e = AlignError::MalformedOption {
                options: raw.to_string(),
                message: format!("option {} expects a value", items[i]),
            };
            error!("{}", e);
            Err(e)
        }
    }
}

fn int_token(items: &[String], i: usize, raw: &str) -> Result<i32, AlignError> {
    let val = value_token(items, i, raw)?;
    match val.parse::<i32>() {
        Ok(n) => Ok(n),
        Err(_) => {
            let e = AlignError::MalformedOption {
                options: raw.to_string(),
                message: format!("invalid integer '{}' for option {}", val, items[i]),
            };
            error!("{}", e);
            Err(e)
        }
    }
}

impl AlignService for BlasrService {
    fn name(&self) -> &'static str {
        "BlasrService"
    }

    fn prog_name(&self) -> &'static str {
        "blasr"
    }

    fn score_sign(&self) -> i32 {
        // blasr scores are penalties, the lower the better
        -1
    }

    fn pre_process(
        &self,
        input_file: &str,
        _reference_file: Option<&str>,
        _region_table: Option<&str>,
        _no_split_subreads: bool,
        _tmp_mgr: &mut TempFileManager,
    ) -> Result<String, AlignError> {
        // blasr reads the input as-is, nothing to stage
        Ok(input_file.to_string())
    }

    fn resolve_options(
        &self,
        opts: &AlignOptions,
        files: &AlignFiles,
    ) -> Result<(AlignOptions, AlignFiles), AlignError> {
        let Some(raw) = opts.algorithm_options.clone() else {
            return Ok((opts.clone(), files.clone()));
        };

        let mut opts = opts.clone();
        let mut files = files.clone();

        let mut items = tokenize(&raw);
        let mut i = 0;
        while i < items.len() {
            let item = items[i].clone();
            let mut info_msg = String::new();

            match item.as_str() {
                "-sa" => {
                    let val = real_path(value_token(&items, i, &raw)?);
                    if files.sa_file.as_deref() != Some(val.as_str()) {
                        if files.sa_file.is_some() {
                            info_msg = format!("Over write sa file with {}.", val);
                        }
                        files.sa_file = Some(val);
                    }
                    items.drain(i..i + 2);
                }
                "-regionTable" => {
                    let val = real_path(value_token(&items, i, &raw)?);
                    if files.region_table.as_deref() != Some(val.as_str()) {
                        if files.region_table.is_some() {
                            info_msg = format!("Over write region table with {}.", val);
                        }
                        files.region_table = Some(val);
                    }
                    items.drain(i..i + 2);
                }
                "-bestn" => {
                    let val = int_token(&items, i, &raw)?;
                    if let Some(cur) = opts.max_hits {
                        if cur != val {
                            let err_msg = format!(
                                "blasr -bestn specified within --algorithm-options is \
                                 equivalent to --max-hits, and their values conflict: \
                                 -bestn {} vs --max-hits {}",
                                val, cur
                            );
                            error!("{}", err_msg);
                            return Err(AlignError::Conflict(err_msg));
                        }
                    }
                    opts.max_hits = Some(val);
                    items.drain(i..i + 2);
                }
                "-minMatch" => {
                    let val = int_token(&items, i, &raw)?;
                    if let Some(cur) = opts.min_anchor_size {
                        if cur != val {
                            let err_msg = format!(
                                "blasr -minMatch specified within --algorithm-options is \
                                 equivalent to --min-anchor-size, and their values conflict: \
                                 -minMatch {} vs --min-anchor-size {}",
                                val, cur
                            );
                            error!("{}", err_msg);
                            return Err(AlignError::Conflict(err_msg));
                        }
                    }
                    opts.min_anchor_size = Some(val);
                    items.drain(i..i + 2);
                }
                "-nproc" => {
                    // The number of threads is not critical
                    let val = int_token(&items, i, &raw)?;
                    if opts.nproc != Some(val) {
                        info_msg = format!("Over write nproc with {}.", val);
                        opts.nproc = Some(val);
                    }
                    items.drain(i..i + 2);
                }
                "-noSplitSubreads" => {
                    if !opts.no_split_subreads {
                        info_msg = "Over write noSplitSubreads with true.".to_string();
                        opts.no_split_subreads = true;
                    }
                    items.remove(i);
                }
                "-concordant" => {
                    if !opts.concordant {
                        info_msg = "Over write concordant with true.".to_string();
                        opts.concordant = true;
                    }
                    items.remove(i);
                }
                "-useccs" | "-useccsall" | "-useccsdenovo" => {
                    let val = match item.as_str() {
                        "-useccs" => CcsMode::Useccs,
                        "-useccsall" => CcsMode::Useccsall,
                        _ => CcsMode::Useccsdenovo,
                    };
                    if let Some(cur) = opts.useccs {
                        if cur != val {
                            let err_msg = format!(
                                "Found conflicting options in --algorithm-options '{}' \
                                 and --useccs={}",
                                item,
                                cur.as_str()
                            );
                            error!("{}", err_msg);
                            return Err(AlignError::Conflict(err_msg));
                        }
                    }
                    opts.useccs = Some(val);
                    items.remove(i);
                }
                "-seed" | "-randomSeed" => {
                    let val = int_token(&items, i, &raw)?;
                    if opts.seed != Some(val) {
                        info_msg = format!("Overwrite random seed with {}.", val);
                        opts.seed = Some(val);
                    }
                    items.drain(i..i + 2);
                }
                _ if IGNORED_BINARY.contains(&item.as_str()) => {
                    value_token(&items, i, &raw)?;
                    items.drain(i..i + 2);
                }
                _ if IGNORED_UNITARY.contains(&item.as_str()) => {
                    items.remove(i);
                }
                _ => {
                    i += 1;
                    continue;
                }
            }

            if !info_msg.is_empty() {
                info!("{}: Resolve algorithmOptions. {}", self.name(), info_msg);
            }
        }

        // Only unrecognized tokens remain; spaces inside reassembled
        // paths go back escaped so the string stays shell-safe.
        opts.algorithm_options = Some(items.iter().map(|t| shell_token(t)).join(" "));

        Ok((opts, files))
    }

    fn to_cmd(&self, opts: &AlignOptions, files: &AlignFiles) -> String {
        let mut args: Vec<String> = vec![
            self.prog_name().to_string(),
            shell_token(&files.query_file),
            shell_token(&files.target_file),
            "-out".to_string(),
            shell_token(&files.aligner_out_file),
        ];

        if files.output_format == FileFormat::Bam {
            args.push("-bam".to_string());
        } else {
            args.push("-sam".to_string());
        }

        if let Some(sa) = &files.sa_file {
            if !sa.is_empty() {
                args.push("-sa".to_string());
                args.push(shell_token(sa));
            }
        }

        if let Some(region_table) = &files.region_table {
            if !region_table.is_empty() {
                args.push("-regionTable".to_string());
                args.push(shell_token(region_table));
            }
        }

        if let Some(n) = opts.max_hits {
            args.push("-bestn".to_string());
            args.push(n.to_string());
        }

        if let Some(n) = opts.min_anchor_size {
            args.push("-minMatch".to_string());
            args.push(n.to_string());
        }

        if let Some(n) = opts.nproc {
            args.push("-nproc".to_string());
            args.push(n.to_string());
        }

        if let Some(n) = opts.min_length {
            args.push("-minSubreadLength".to_string());
            args.push(n.to_string());
            args.push("-minReadLength".to_string());
            args.push(n.to_string());
        }

        if opts.no_split_subreads {
            args.push("-noSplitSubreads".to_string());
        }

        if opts.concordant {
            args.push("-concordant".to_string());
        }

        // Seed 0 means "use the aligner default"
        if let Some(seed) = opts.seed {
            if seed != 0 {
                args.push("-randomSeed".to_string());
                args.push(seed.to_string());
            }
        }

        if opts.hit_policy == HitPolicy::Randombest {
            args.push("-placeRepeatsRandomly".to_string());
        }

        if let Some(mode) = opts.useccs {
            args.push(format!("-{}", mode.as_str()));
        }

        // Plain sequence input carries no quality values, clip softly
        if files.input_format == FileFormat::Fasta {
            args.push("-clipping".to_string());
            args.push("soft".to_string());
        }

        if let Some(residual) = &opts.algorithm_options {
            if !residual.is_empty() {
                args.push(residual.clone());
            }
        }

        args.iter().join(" ")
    }

    fn post_process(&self) -> Result<(), AlignError> {
        debug!("{}: Postprocess after alignment is done.", self.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_opts() -> AlignOptions {
        AlignOptions {
            max_hits: Some(10),
            min_anchor_size: Some(12),
            nproc: Some(4),
            ..Default::default()
        }
    }

    fn base_files() -> AlignFiles {
        AlignFiles::new("reads.fasta", "ref.fasta", "out.sam")
    }

    #[test]
    fn test_resolve_without_raw_options() {
        let svc = BlasrService;
        let opts = base_opts();
        let files = base_files();

        let (new_opts, new_files) = svc.resolve_options(&opts, &files).unwrap();
        assert_eq!(new_opts, opts);
        assert_eq!(new_files, files);
    }

    #[test]
    fn test_resolve_bestn_conflict() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.max_hits = Some(5);
        opts.algorithm_options = Some("-bestn 10".to_string());

        let err = svc.resolve_options(&opts, &base_files()).unwrap_err();
        assert!(matches!(err, AlignError::Conflict(_)));
        assert!(err.to_string().contains("-bestn 10"));
        assert!(err.to_string().contains("--max-hits 5"));

        // Agreeing values are not a conflict
        opts.algorithm_options = Some("-bestn 5".to_string());
        let (new_opts, _) = svc.resolve_options(&opts, &base_files()).unwrap();
        assert_eq!(new_opts.max_hits, Some(5));
        assert_eq!(new_opts.algorithm_options.as_deref(), Some(""));
    }

    #[test]
    fn test_resolve_min_match_conflict() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.algorithm_options = Some("-minMatch 8".to_string());

        let err = svc.resolve_options(&opts, &base_files()).unwrap_err();
        assert!(matches!(err, AlignError::Conflict(_)));
    }

    #[test]
    fn test_resolve_nproc_last_writer_wins() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.algorithm_options = Some("-nproc 8".to_string());

        let (new_opts, _) = svc.resolve_options(&opts, &base_files()).unwrap();
        assert_eq!(new_opts.nproc, Some(8));
    }

    #[test]
    fn test_resolve_unitary_flags() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.algorithm_options =
            Some("-noSplitSubreads -concordant -useccsall -advanceExactMatches 10".to_string());

        let (new_opts, _) = svc.resolve_options(&opts, &base_files()).unwrap();
        assert!(new_opts.no_split_subreads);
        assert!(new_opts.concordant);
        assert_eq!(new_opts.useccs, Some(CcsMode::Useccsall));
        assert_eq!(
            new_opts.algorithm_options.as_deref(),
            Some("-advanceExactMatches 10")
        );
    }

    #[test]
    fn test_resolve_useccs_conflict() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.useccs = Some(CcsMode::Useccs);
        opts.algorithm_options = Some("-useccsdenovo".to_string());

        let err = svc.resolve_options(&opts, &base_files()).unwrap_err();
        assert!(matches!(err, AlignError::Conflict(_)));

        // The same family member is fine
        opts.algorithm_options = Some("-useccs".to_string());
        let (new_opts, _) = svc.resolve_options(&opts, &base_files()).unwrap();
        assert_eq!(new_opts.useccs, Some(CcsMode::Useccs));
    }

    #[test]
    fn test_resolve_seed_both_spellings() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.seed = Some(1);
        opts.algorithm_options = Some("-randomSeed 42".to_string());

        let (new_opts, _) = svc.resolve_options(&opts, &base_files()).unwrap();
        assert_eq!(new_opts.seed, Some(42));

        opts.algorithm_options = Some("-seed 7".to_string());
        let (new_opts, _) = svc.resolve_options(&opts, &base_files()).unwrap();
        assert_eq!(new_opts.seed, Some(7));
    }

    #[test]
    fn test_resolve_sa_and_region_table() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.algorithm_options = Some("-sa refdir/ref.sa -regionTable run.rgn".to_string());

        let mut files = base_files();
        files.sa_file = Some("old.sa".to_string());

        let (new_opts, new_files) = svc.resolve_options(&opts, &files).unwrap();
        assert!(new_files.sa_file.unwrap().ends_with("ref.sa"));
        assert!(new_files.region_table.unwrap().ends_with("run.rgn"));
        assert_eq!(new_opts.algorithm_options.as_deref(), Some(""));
    }

    #[test]
    fn test_resolve_escaped_path() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.algorithm_options = Some(r"-sa my\ dir/ref.sa".to_string());

        let (_, new_files) = svc.resolve_options(&opts, &base_files()).unwrap();
        assert!(new_files.sa_file.unwrap().contains("my dir/ref.sa"));
    }

    #[test]
    fn test_resolve_ignored_flags() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.algorithm_options = Some("-m 4 -out tmp.sam -V 2 -v -sam".to_string());

        let (new_opts, _) = svc.resolve_options(&opts, &base_files()).unwrap();
        assert_eq!(new_opts.algorithm_options.as_deref(), Some(""));
    }

    #[test]
    fn test_resolve_keeps_unknown_tokens() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.algorithm_options = Some("-holeNumbers 1--100 -fastSDP".to_string());

        let (new_opts, _) = svc.resolve_options(&opts, &base_files()).unwrap();
        assert_eq!(
            new_opts.algorithm_options.as_deref(),
            Some("-holeNumbers 1--100 -fastSDP")
        );
    }

    #[test]
    fn test_resolve_malformed() {
        let svc = BlasrService;
        let mut opts = base_opts();

        opts.algorithm_options = Some("-bestn ten".to_string());
        let err = svc.resolve_options(&opts, &base_files()).unwrap_err();
        assert!(matches!(err, AlignError::MalformedOption { .. }));
        assert!(err.to_string().contains("-bestn ten"));

        opts.algorithm_options = Some("-v -nproc".to_string());
        let err = svc.resolve_options(&opts, &base_files()).unwrap_err();
        assert!(matches!(err, AlignError::MalformedOption { .. }));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let svc = BlasrService;
        let mut opts = base_opts();
        opts.algorithm_options = Some("-bestn 10 -holeNumbers 1--100".to_string());

        let (once_opts, once_files) = svc.resolve_options(&opts, &base_files()).unwrap();
        let (twice_opts, twice_files) = svc.resolve_options(&once_opts, &once_files).unwrap();
        assert_eq!(once_opts, twice_opts);
        assert_eq!(once_files, twice_files);
    }

    #[test]
    fn test_to_cmd_full_order() {
        let svc = BlasrService;
        let opts = AlignOptions {
            max_hits: Some(10),
            min_anchor_size: Some(12),
            nproc: Some(8),
            min_length: Some(50),
            no_split_subreads: true,
            concordant: true,
            seed: Some(42),
            hit_policy: HitPolicy::Randombest,
            useccs: Some(CcsMode::Useccsall),
            algorithm_options: Some("-advanceExactMatches 10".to_string()),
        };
        let mut files = AlignFiles::new("reads.fasta", "ref.fasta", "out.bam");
        files.sa_file = Some("ref.sa".to_string());
        files.region_table = Some("run.rgn".to_string());

        let cmd = svc.to_cmd(&opts, &files);
        assert_eq!(
            cmd,
            "blasr reads.fasta ref.fasta -out out.bam -bam -sa ref.sa \
             -regionTable run.rgn -bestn 10 -minMatch 12 -nproc 8 \
             -minSubreadLength 50 -minReadLength 50 -noSplitSubreads -concordant \
             -randomSeed 42 -placeRepeatsRandomly -useccsall -clipping soft \
             -advanceExactMatches 10"
        );

        // Byte-identical on a second rendering
        assert_eq!(svc.to_cmd(&opts, &files), cmd);
    }

    #[test]
    fn test_to_cmd_output_container() {
        let svc = BlasrService;
        let opts = AlignOptions::default();

        let sam = svc.to_cmd(&opts, &AlignFiles::new("in.fastq", "ref.fasta", "out.sam"));
        assert!(sam.contains(" -sam"));
        assert!(!sam.contains(" -bam"));

        let bam = svc.to_cmd(&opts, &AlignFiles::new("in.fastq", "ref.fasta", "out.bam"));
        assert!(bam.contains(" -bam"));
        assert!(!bam.contains(" -sam"));
    }

    #[test]
    fn test_to_cmd_clipping_only_for_fasta() {
        let svc = BlasrService;
        let opts = AlignOptions::default();

        let fasta = svc.to_cmd(&opts, &AlignFiles::new("in.fasta", "ref.fasta", "out.sam"));
        assert!(fasta.ends_with("-clipping soft"));

        let fastq = svc.to_cmd(&opts, &AlignFiles::new("in.fastq", "ref.fasta", "out.sam"));
        assert!(!fastq.contains("-clipping"));
    }

    #[test]
    fn test_to_cmd_zero_seed_is_unset() {
        let svc = BlasrService;
        let opts = AlignOptions {
            seed: Some(0),
            ..Default::default()
        };

        let cmd = svc.to_cmd(&opts, &base_files());
        assert!(!cmd.contains("-randomSeed"));
    }

    #[test]
    fn test_to_cmd_escapes_spaces() {
        let svc = BlasrService;
        let opts = AlignOptions::default();
        let files = AlignFiles::new("my reads.fasta", "ref.fasta", "out.sam");

        let cmd = svc.to_cmd(&opts, &files);
        assert!(cmd.starts_with(r"blasr my\ reads.fasta ref.fasta"));
    }

    #[test]
    fn test_service_identity() {
        let svc = super::super::service_for("blasr").unwrap();
        assert_eq!(svc.name(), "BlasrService");
        assert_eq!(svc.prog_name(), "blasr");
        assert_eq!(svc.score_sign(), -1);
        assert!(super::super::service_for("bowtie").is_none());

        let mut tmp_mgr = TempFileManager::new();
        let staged = svc
            .pre_process("reads.fasta", Some("ref.fasta"), None, false, &mut tmp_mgr)
            .unwrap();
        assert_eq!(staged, "reads.fasta");
        svc.post_process().unwrap();
    }
}
