use thiserror::Error;

/// The main error type for subgrunt operations
#[derive(Debug, Error)]
pub enum SubgruntError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("The \"{pattern}\" directory is not valid, or does not contain a Gruntfile.")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Target error: {0}")]
    Target(String),
}

/// Result type alias for subgrunt operations
pub type SubgruntResult<T> = Result<T, SubgruntError>;
