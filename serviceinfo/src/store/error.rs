//! Store error types.

/// Errors from the service store and its backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Redis request failed (connection, protocol or command error)
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A key holds a different structure than the operation expects
    #[error("wrong type for key {key}")]
    WrongType { key: String },

    /// A stored hash lacks a required field
    #[error("missing field {field} in {key}")]
    MissingField { key: String, field: &'static str },

    /// A stored field does not decode
    #[error("invalid value '{value}' for field {field} in {key}")]
    InvalidValue {
        key: String,
        field: &'static str,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::MissingField {
            key: "schedule:actual:2024-05-01:1234:info".into(),
            field: "cancelled",
        };
        assert_eq!(
            err.to_string(),
            "missing field cancelled in schedule:actual:2024-05-01:1234:info"
        );

        let err = StoreError::InvalidValue {
            key: "k".into(),
            field: "arrival_delay",
            value: "soon".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value 'soon' for field arrival_delay in k"
        );
    }
}
