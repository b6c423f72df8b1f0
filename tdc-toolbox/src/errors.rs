use std::io;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("File {0} does not exist.")]
    FileNotAvailable(String),
    #[error("IO error.")]
    IOError(#[from] io::Error),
    #[error("Histogram needs at least one bin.")]
    InvalidBins,
    #[error("Bin width must be positive, got {0} ns.")]
    InvalidBinWidth(f64),
    #[error("Coincidence window must be positive, got {0} ns.")]
    InvalidCoincidenceWindow(f64),
    #[error("Sample resolution must be positive, got {0} ns.")]
    InvalidResolution(f64),
    #[error("Buffer length must be between 1 and 30, got {0}.")]
    InvalidBufferLength(u32),
    #[error("At most {max} channels are supported, got {got}.")]
    TooManyChannels { got: usize, max: usize },
    #[error("Truncated record at the end of the file.")]
    TruncatedRecord,
    #[error("Invalid hex record: {0}")]
    InvalidHexRecord(String),
}
