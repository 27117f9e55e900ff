use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Result alias used throughout the queue engine
pub type Result<T> = std::result::Result<T, QueueError>;

/// Failures that abort a queue-generation run
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Input not found: {} (you can pipe text through stdin too)", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Output directory {} does not exist, please create it before using it", path.display())]
    OutputRootMissing { path: PathBuf },

    #[error("No files found to be encoded in {}", root.display())]
    NothingToEncode { root: PathBuf },

    #[error("Invalid resolution '{0}': expected WIDTHxHEIGHT with positive integers, auto or auto-half")]
    InvalidResolutionFormat(String),

    #[error("{} is not accessible", path.display())]
    SourceUnreadable { path: PathBuf },

    #[error("ffprobe failed for {}: {reason}", path.display())]
    ProbeFailed { path: PathBuf, reason: String },

    #[error("{} has no valid video stream", path.display())]
    NoVideoStream { path: PathBuf },

    #[error("'{program}' not found, is it installed and in PATH?")]
    ProcessNotFound { program: String },

    #[error("'{program}' exited with {status}: {output}")]
    ProcessFailed {
        program: String,
        status: ExitStatus,
        output: String,
    },

    #[error("'{program}' did not finish within {seconds}s")]
    ProcessTimeout { program: String, seconds: u64 },

    #[error("Template references unknown placeholder {{{0}}}")]
    MissingPlaceholder(String),

    #[error("Built-in template is corrupt: {0}")]
    TemplateCorrupt(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl QueueError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QueueError::Io {
            path: path.into(),
            source,
        }
    }
}
