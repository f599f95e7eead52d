use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElementSetError {
    #[error("malformed element set, line {line}: {message}")]
    Malformed { line: u8, message: String },
    #[error("expected a 2 or 3 line element set, got {0} lines")]
    LineCount(usize),
    #[error("element set file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("no element set for catalog number {0}")]
    NotFound(u32),
    #[error("no element sets found")]
    Empty,
}

impl ElementSetError {
    pub(crate) fn malformed(line: u8, message: impl Into<String>) -> Self {
        ElementSetError::Malformed {
            line,
            message: message.into(),
        }
    }
}
