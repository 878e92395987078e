use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// Two option sources disagree on a value that must be singular
    /// (e.g. --max-hits vs blasr -bestn). The message names both
    /// sources and values.
    Conflict(String),
    /// A recognized flag inside the raw option string is missing its
    /// value token, or the value fails to parse.
    MalformedOption {
        /// The full raw option string that failed
        options: String,
        /// What went wrong
        message: String,
    },
    /// Filesystem failure while creating or registering a temporary
    /// resource.
    Resource {
        /// The path involved
        path: PathBuf,
        /// The underlying failure
        message: String,
    },
    /// A path registered as existing was not found on disk.
    NotFound(PathBuf),
    /// Manager misconfiguration, e.g. reassigning the root directory
    /// after resources were registered.
    Config(String),
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignError::Conflict(msg) => write!(f, "{}", msg),
            AlignError::MalformedOption { options, message } => {
                write!(
                    f,
                    "An error occurred during parsing algorithmOptions '{}': {}",
                    options, message
                )
            }
            AlignError::Resource { path, message } => {
                write!(
                    f,
                    "Failed to create temporary resource {}: {}",
                    path.display(),
                    message
                )
            }
            AlignError::NotFound(path) => {
                write!(f, "Path {} does not exist", path.display())
            }
            AlignError::Config(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AlignError {}
