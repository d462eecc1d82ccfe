//! Error definitions for dataset loading
use linfa_preprocessing::error::PreprocessingError;
use ndarray_csv::ReadError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] ReadError),
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
    #[error("expected {expected} colour channels per pixel, found {found}")]
    Channels { expected: usize, found: usize },
    #[error("pixel value {0} is outside of the 8-bit range")]
    PixelRange(f64),
    #[error("requested {requested} samples but only {available} are available")]
    TooManySamples { requested: usize, available: usize },
    #[error("empty dataset: {0}")]
    Empty(String),
}
