//! Query-string parameter extraction.
//!
//! Splits `key=value` pairs on `&`, compares keys byte-for-byte and
//! percent-decodes values in [`Mode::Plain`]. Values longer than
//! [`QUERY_VALUE_MAX`] raw bytes are silently truncated before decoding -
//! a deliberately carried-over limitation of the original firmware, where
//! each parameter was copied into a fixed 64-byte buffer. Callers must
//! treat truncation as silent data loss.

use crate::decode::{decode, Mode};

/// Maximum raw length of a single query value, in bytes.
pub const QUERY_VALUE_MAX: usize = 64;

/// Look up `key` in `query` and return its percent-decoded value.
///
/// Returns `None` when the key is absent or the query string is empty.
/// Pairs without an `=` never match.
pub fn get(query: &str, key: &str) -> Option<Vec<u8>> {
    for pair in query.split('&') {
        let Some((k, v)) = pair.split_once('=') else {
            continue;
        };
        if k.as_bytes() == key.as_bytes() {
            let raw = v.as_bytes();
            let raw = &raw[..raw.len().min(QUERY_VALUE_MAX)];
            return Some(decode(raw, Mode::Plain));
        }
    }
    None
}

/// Look up `key` and parse its decoded value, falling back to `default`
/// when the key is absent or the value does not parse.
pub fn get_parsed<T>(query: &str, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    get(query, key)
        .and_then(|v| String::from_utf8(v).ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_present_key() {
        assert_eq!(get("speed=9600&tx=4", "speed"), Some(b"9600".to_vec()));
        assert_eq!(get("speed=9600&tx=4", "tx"), Some(b"4".to_vec()));
    }

    #[test]
    fn missing_key_is_none() {
        assert_eq!(get("speed=9600&tx=4", "rx"), None);
        assert_eq!(get("", "speed"), None);
        assert_eq!(get("speed", "speed"), None);
    }

    #[test]
    fn key_compare_is_exact() {
        assert_eq!(get("Speed=1", "speed"), None);
        assert_eq!(get("speedy=1&speed=2", "speed"), Some(b"2".to_vec()));
    }

    #[test]
    fn values_are_percent_decoded() {
        assert_eq!(get("name=a%20b", "name"), Some(b"a b".to_vec()));
    }

    #[test]
    fn value_splits_on_first_equals() {
        assert_eq!(get("k=a=b", "k"), Some(b"a=b".to_vec()));
    }

    #[test]
    fn long_values_truncate_silently() {
        let long = "x".repeat(QUERY_VALUE_MAX + 20);
        let query = format!("k={long}");
        let got = get(&query, "k").unwrap();
        assert_eq!(got.len(), QUERY_VALUE_MAX);
        assert_eq!(got, "x".repeat(QUERY_VALUE_MAX).into_bytes());
    }

    #[test]
    fn parsed_values_fall_back_to_default() {
        assert_eq!(get_parsed("speed=19200", "speed", 9600u32), 19200);
        assert_eq!(get_parsed("tx=17", "speed", 9600u32), 9600);
        assert_eq!(get_parsed("speed=fast", "speed", 9600u32), 9600);
        assert_eq!(get_parsed("speed=12ab", "speed", 9600u32), 9600);
    }
}
