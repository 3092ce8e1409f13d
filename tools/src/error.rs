use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ToolError {
    /// IO error on a specific file or directory
    FileError(PathBuf, io::Error),

    /// The external build tool could not be started
    SpawnError(String, io::Error),

    /// Couldn't parse the configuration file
    ConfigError(PathBuf, serde_json::Error),

    /// Unrecognized path style name
    InvalidPathStyle(String),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::FileError(path, e) => write!(f, "{}: {}", path.display(), e),
            ToolError::SpawnError(program, e) => write!(f, "unable to run {}: {}", program, e),
            ToolError::ConfigError(path, e) => {
                write!(f, "unable to parse config file {}: {}", path.display(), e)
            }
            ToolError::InvalidPathStyle(s) => {
                write!(f, "unknown path style \"{}\" (expected windows, posix or host)", s)
            }
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolError::FileError(_, e) | ToolError::SpawnError(_, e) => Some(e),
            ToolError::ConfigError(_, e) => Some(e),
            ToolError::InvalidPathStyle(_) => None,
        }
    }
}

/// Attach the offending path to an IO error.
pub(crate) trait PathContext<T> {
    fn with_path<P: Into<PathBuf>>(self, path: P) -> Result<T, ToolError>;
}

impl<T> PathContext<T> for io::Result<T> {
    fn with_path<P: Into<PathBuf>>(self, path: P) -> Result<T, ToolError> {
        self.map_err(|e| ToolError::FileError(path.into(), e))
    }
}
