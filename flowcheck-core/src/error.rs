use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    /// Bad selector, bad block size, missing mode, empty manifest.
    #[error("usage error: {0}")]
    Usage(String),

    #[error("unable to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input file '{}' is empty", .0.display())]
    EmptyInput(PathBuf),

    #[error("unable to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Resource context could not be initialised or released.
    #[error("resource context error: {0}")]
    Context(String),

    #[error("worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlowError {
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlowError::Open {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlowError::Write {
            path: path.into(),
            source,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, FlowError::Usage(_))
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_names_the_path() {
        let err = FlowError::open(
            "/data/missing.bin",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/data/missing.bin"));
        assert!(msg.contains("no such file"));
        assert!(!err.is_usage());
    }

    #[test]
    fn usage_is_classified() {
        assert!(FlowError::Usage("bad flow".into()).is_usage());
    }
}
