mod libs;

pub use crate::libs::aligner::{service_for, AlignService, BlasrService};
pub use crate::libs::error::AlignError;
pub use crate::libs::files::{AlignFiles, FileFormat};
pub use crate::libs::io::{reader, writer};
pub use crate::libs::option::{tokenize, AlignOptions, CcsMode, HitPolicy};
pub use crate::libs::tmp::TempFileManager;
