//! Field encoding for stored hashes.
//!
//! The store has no null: an absent value is written as the empty string
//! and read back as absent. Booleans are written as `True`/`False`.

/// Stored form of an absent value.
pub const ABSENT: &str = "";

/// Encode an optional value, writing `None` as [`ABSENT`].
pub fn encode_optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| ABSENT.to_string())
}

/// Decode a stored value, reading [`ABSENT`] as `None`.
pub fn decode_optional(value: &str) -> Option<&str> {
    if value == ABSENT { None } else { Some(value) }
}

pub fn encode_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Decode a stored boolean. Anything but `True`/`False` (either case of the
/// first letter) is rejected.
pub fn decode_bool(value: &str) -> Option<bool> {
    match value {
        "True" | "true" => Some(true),
        "False" | "false" => Some(false),
        _ => None,
    }
}

/// Decode a stored integer; an absent value reads as zero.
pub fn decode_int(value: &str) -> Option<i64> {
    match decode_optional(value) {
        None => Some(0),
        Some(v) => v.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_roundtrip() {
        assert_eq!(encode_optional(Some("5b")), "5b");
        assert_eq!(encode_optional(None::<&str>), "");
        assert_eq!(decode_optional(&encode_optional(Some("5b"))), Some("5b"));
        assert_eq!(decode_optional(&encode_optional(None::<String>)), None);
    }

    #[test]
    fn bools() {
        assert_eq!(encode_bool(true), "True");
        assert_eq!(encode_bool(false), "False");
        assert_eq!(decode_bool("True"), Some(true));
        assert_eq!(decode_bool("false"), Some(false));
        assert_eq!(decode_bool("1"), None);
        assert_eq!(decode_bool(""), None);
    }

    #[test]
    fn ints() {
        assert_eq!(decode_int("12"), Some(12));
        assert_eq!(decode_int("-3"), Some(-3));
        assert_eq!(decode_int(""), Some(0));
        assert_eq!(decode_int("PT5M"), None);
    }
}
