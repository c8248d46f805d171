use thiserror::Error;

/// Errors that can occur during CSV parsing, image generation, or image
/// parsing.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid entry type: {0}")]
    InvalidType(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: i32 },

    #[error("too many {0} entries")]
    TooManyEntries(&'static str),

    #[error("invalid image size {0}: must be a non-zero multiple of 16 bytes")]
    InvalidImageSize(usize),

    #[error("image size {0} is too small")]
    ImageTooSmall(usize),

    #[error("settings error: {0}")]
    Settings(#[from] nvm_settings::error::Error),
}
