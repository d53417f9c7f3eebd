//! Reference data error types.

/// Errors from loading or querying reference data.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// No description for a transport-mode code
    #[error("unknown transport mode: {0}")]
    UnknownTransportMode(String),

    /// No name for a stop code
    #[error("unknown station: {0}")]
    UnknownStation(String),

    /// Reference file could not be read
    #[error("failed to read reference data: {0}")]
    Io(#[from] std::io::Error),

    /// Reference file is not valid JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ReferenceError::UnknownTransportMode("XX".into());
        assert_eq!(err.to_string(), "unknown transport mode: XX");

        let err = ReferenceError::UnknownStation("zzz".into());
        assert_eq!(err.to_string(), "unknown station: zzz");
    }
}
