//! Error types
//!
//! The simulation itself never fails; only the edges that touch files and
//! user-supplied arguments do.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VennDropError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument {name}: {value:?}")]
    InvalidArgument { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, VennDropError>;
