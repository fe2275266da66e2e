use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("counting line {0:?} is missing from the lane configuration")]
    MissingCountLine(String),

    #[error("counting line {0:?} is degenerate")]
    DegenerateCountLine(String),

    #[error("innovation covariance is singular")]
    SingularCovariance,

    #[error("Io Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lane Config Error: {0}")]
    ConfigError(#[from] serde_json::Error),
}
