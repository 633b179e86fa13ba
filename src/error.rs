use thiserror::Error;

pub type DrawResult<T> = Result<T, DrawError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("Invalid range: max number must be positive")]
    InvalidRange,

    #[error("Range exhausted: all {max_number} numbers already drawn ({recorded} recorded)")]
    RangeExhausted { max_number: u32, recorded: usize },

    #[error("A draw is already in progress")]
    Busy,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Timer error: {0}")]
    Timer(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage not available")]
    NotAvailable,

    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("storage access denied")]
    AccessDenied,

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            DrawError::RangeExhausted { max_number: 1, recorded: 1 }.to_string(),
            "Range exhausted: all 1 numbers already drawn (1 recorded)"
        );
        assert_eq!(
            DrawError::from(StorageError::QuotaExceeded).to_string(),
            "Storage error: storage quota exceeded"
        );
    }
}
