pub mod blasr;

pub use blasr::BlasrService;

use crate::libs::error::AlignError;
use crate::libs::files::AlignFiles;
use crate::libs::option::AlignOptions;
use crate::libs::tmp::TempFileManager;

/// One external aligner: its identity, how it orders scores, and how
/// its options and command line are put together. Variants form a
/// closed set dispatched through `service_for`.
pub trait AlignService {
    /// Service name, used as the logging prefix
    fn name(&self) -> &'static str;

    /// Program to call
    fn prog_name(&self) -> &'static str;

    /// Sign of the score ordering: -1 when lower scores are better
    fn score_sign(&self) -> i32;

    /// Stage the input so the aligner can read it. May materialize an
    /// intermediate file through the temp manager; never touches the
    /// original input.
    fn pre_process(
        &self,
        input_file: &str,
        reference_file: Option<&str>,
        region_table: Option<&str>,
        no_split_subreads: bool,
        tmp_mgr: &mut TempFileManager,
    ) -> Result<String, AlignError>;

    /// Merge flags found in `algorithm_options` into the typed options
    /// and file locations. Pure: the inputs are left untouched and new
    /// values are returned, so nothing is half-merged after an error.
    fn resolve_options(
        &self,
        opts: &AlignOptions,
        files: &AlignFiles,
    ) -> Result<(AlignOptions, AlignFiles), AlignError>;

    /// Render the aligner command line. Deterministic and free of side
    /// effects.
    fn to_cmd(&self, opts: &AlignOptions, files: &AlignFiles) -> String;

    /// Hook run after the alignment finished
    fn post_process(&self) -> Result<(), AlignError>;
}

/// Look up the service variant for an aligner program name.
pub fn service_for(prog: &str) -> Option<Box<dyn AlignService>> {
    match prog {
        "blasr" => Some(Box::new(BlasrService)),
        _ => None,
    }
}
