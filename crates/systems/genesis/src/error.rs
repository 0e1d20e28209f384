use thiserror::Error;

/// Genesis helper errors
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("Unknown plane: {0}")]
    UnknownPlane(String),

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    #[error("Invalid plane size {width}x{height}")]
    InvalidPlaneSize { width: u16, height: u16 },

    #[error("Invalid image asset: {0}")]
    InvalidAsset(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
