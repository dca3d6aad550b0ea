use thiserror::Error;

#[derive(Error, Debug)]
pub enum MdiffError {
    #[error("IO Error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Ignore file error: {0}")]
    IgnoreFileError(String),

    #[error("Malformed pattern '{pattern}': {message}")]
    PatternError { pattern: String, message: String },

    #[error("Change set parse error: {0}")]
    ChangeSetParseError(String),

    #[error("File operation error: {0}")]
    FileError(String),
}

impl From<std::io::Error> for MdiffError {
    fn from(err: std::io::Error) -> Self {
        MdiffError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for MdiffError {
    fn from(err: serde_json::Error) -> Self {
        MdiffError::ChangeSetParseError(err.to_string())
    }
}
