/// Error types for the launcher image format

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageError>;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decoding error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("not a launcher image (bad magic)")]
    BadMagic,

    #[error("unsupported image format version {0}")]
    UnsupportedVersion(u16),
}
