//! Message parser error types.

use crate::domain::TimeError;
use crate::reference::ReferenceError;

/// Errors inside a service description. Any one of these aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A required element is absent or empty
    #[error("missing required element: {0}")]
    MissingElement(&'static str),

    /// The service code is not a service number
    #[error("invalid service code: {0}")]
    InvalidServiceCode(String),

    /// The service has no stops to derive its date from
    #[error("service {0} has no stops")]
    EmptyStopList(String),

    /// A timestamp or delay field could not be parsed
    #[error("invalid {field}: {source}")]
    InvalidTime {
        field: &'static str,
        source: TimeError,
    },

    /// Reference data lookup failed
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParseError::MissingElement("StopCode");
        assert_eq!(err.to_string(), "missing required element: StopCode");

        let err = ParseError::EmptyStopList("1234".into());
        assert_eq!(err.to_string(), "service 1234 has no stops");

        let err = ParseError::from(ReferenceError::UnknownStation("zzz".into()));
        assert_eq!(err.to_string(), "unknown station: zzz");
    }
}
