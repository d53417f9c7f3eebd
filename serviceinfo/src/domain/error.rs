//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from parser and store errors.

/// Error returned when parsing an unknown data source name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid source '{name}'")]
pub struct InvalidSource {
    name: String,
}

impl InvalidSource {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = InvalidSource::new("live");
        assert_eq!(err.to_string(), "invalid source 'live'");
    }
}
