use std::io;

#[derive(Debug)]
pub enum PresetError {
    /// Slot index past the end of the table
    OutOfRange { slot: usize, capacity: usize },
    /// Record type does not match the size the store was laid out for
    RecordSize { expected: usize, actual: usize },
    /// Bytes could not be decoded (truncated record, unknown enum value)
    Corrupt(String),
    /// Backing file could not be read or written
    Io(io::Error),
}

impl std::fmt::Display for PresetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresetError::OutOfRange { slot, capacity } => {
                write!(f, "preset slot {} out of range (capacity {})", slot, capacity)
            }
            PresetError::RecordSize { expected, actual } => {
                write!(f, "preset record is {} bytes, store expects {}", actual, expected)
            }
            PresetError::Corrupt(reason) => write!(f, "corrupt preset data: {}", reason),
            PresetError::Io(err) => write!(f, "preset file I/O failed: {}", err),
        }
    }
}

impl std::error::Error for PresetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PresetError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PresetError {
    fn from(err: io::Error) -> Self {
        PresetError::Io(err)
    }
}
