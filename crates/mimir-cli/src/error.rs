use thiserror::Error;

/// Errors that end the `mimir` binary
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Mimir(#[from] mimir::MimirError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
