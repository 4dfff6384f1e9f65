//! The sample source seam and collector errors.

use crate::collector::types::AccelSample;

/// Anything that can produce acceleration samples in g.
pub trait SampleSource {
    /// Read the next sample. `Ok(None)` means the source is exhausted.
    fn next_sample(&mut self) -> Result<Option<AccelSample>, CollectorError>;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn next_sample(&mut self) -> Result<Option<AccelSample>, CollectorError> {
        (**self).next_sample()
    }
}

/// Errors that can occur while collecting samples.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
    /// The source was lost because the sampling thread panicked
    SourceLost,
    /// Bus or file I/O failed
    Io(String),
    /// WHO_AM_I did not match the expected device
    UnexpectedDevice(u8),
    /// A replayed line could not be parsed
    Parse { line: usize, message: String },
    /// No I2C backend on this platform
    Unsupported,
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
            CollectorError::SourceLost => write!(f, "Sampling thread panicked; source lost"),
            CollectorError::Io(e) => write!(f, "IO error: {e}"),
            CollectorError::UnexpectedDevice(id) => {
                write!(f, "Unexpected device: WHO_AM_I = 0x{id:02X}")
            }
            CollectorError::Parse { line, message } => {
                write!(f, "Parse error on line {line}: {message}")
            }
            CollectorError::Unsupported => {
                write!(f, "I2C access is not supported on this platform")
            }
        }
    }
}

impl std::error::Error for CollectorError {}

impl From<std::io::Error> for CollectorError {
    fn from(e: std::io::Error) -> Self {
        CollectorError::Io(e.to_string())
    }
}
