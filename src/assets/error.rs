use thiserror::Error;

use crate::math::MeshError;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),
    #[error("malformed fbx: {0}")]
    Fbx(String),
    #[error("model contains no faces")]
    Empty,
    #[error("model loader panicked")]
    LoaderPanicked,
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] MeshError),
}

pub type AssetResult<T> = Result<T, AssetError>;
