//! Field extraction from one request line.
//!
//! Requests have a fixed, shallow shape (`cmd` plus a handful of string or
//! integer fields), so this is not a general JSON reader. A line that
//! parses as a JSON object is read through `serde_json`. Anything else
//! falls back to a minimal scanner: find `"key"`, skip whitespace, expect
//! `:`, then read either a quoted string (backslash takes the next char
//! literally) or a signed decimal integer. The scanner accepts truncated or
//! otherwise sloppy lines such as `{"cmd":"ping"` from hand-written clients.

use serde_json::{Map, Value};

/// Read-only view of the fields of one request line.
#[derive(Debug, Clone)]
pub enum Fields<'a> {
    /// The line was a well-formed JSON object.
    Object(Map<String, Value>),
    /// The line was not valid JSON; fields are scanned from the raw text.
    Raw(&'a str),
}

impl<'a> Fields<'a> {
    /// Builds a view over `line`.
    pub fn parse(line: &'a str) -> Self {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Self::Object(map),
            _ => Self::Raw(line),
        }
    }

    /// String value for `key`, if present and a string.
    pub fn string(&self, key: &str) -> Option<String> {
        match self {
            Self::Object(map) => map.get(key)?.as_str().map(str::to_owned),
            Self::Raw(line) => scan_string(line, key),
        }
    }

    /// Integer value for `key`, if present and numeric.
    ///
    /// Fractional numbers truncate toward zero; out-of-range values saturate.
    pub fn int(&self, key: &str) -> Option<i64> {
        match self {
            Self::Object(map) => {
                let value = map.get(key)?;
                value
                    .as_i64()
                    .or_else(|| value.as_u64().map(|_| i64::MAX))
                    .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            }
            Self::Raw(line) => scan_int(line, key),
        }
    }
}

/// Position just past `"key"` followed by optional whitespace and a colon,
/// then optional whitespace. Tries each occurrence of the quoted key in turn.
fn value_start(line: &str, key: &str) -> Option<usize> {
    let pattern = format!("\"{key}\"");
    let mut from = 0;
    while let Some(found) = line[from..].find(&pattern) {
        let after_key = from + found + pattern.len();
        let rest = line[after_key..].trim_start();
        if let Some(value) = rest.strip_prefix(':') {
            let value = value.trim_start();
            return Some(line.len() - value.len());
        }
        from = after_key;
    }
    None
}

fn scan_string(line: &str, key: &str) -> Option<String> {
    let start = value_start(line, key)?;
    let mut chars = line[start..].chars();
    if chars.next()? != '"' {
        return None;
    }

    let mut out = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(out),
            '\\' => out.push(chars.next()?),
            other => out.push(other),
        }
    }
    // Unterminated string.
    None
}

fn scan_int(line: &str, key: &str) -> Option<i64> {
    let start = value_start(line, key)?;
    let rest = &line[start..];
    let (negative, digits) = match rest.as_bytes().first()? {
        b'-' => (true, &rest[1..]),
        b'+' => (false, &rest[1..]),
        _ => (false, rest),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }

    let magnitude = &digits[..len];
    let parsed = if negative {
        format!("-{magnitude}").parse::<i64>()
    } else {
        magnitude.parse::<i64>()
    };
    Some(parsed.unwrap_or(if negative { i64::MIN } else { i64::MAX }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_object() {
        let fields = Fields::parse(r#"{"cmd":"send_key","key":"up","repeat":3}"#);
        assert!(matches!(fields, Fields::Object(_)));
        assert_eq!(fields.string("cmd").as_deref(), Some("send_key"));
        assert_eq!(fields.string("key").as_deref(), Some("up"));
        assert_eq!(fields.int("repeat"), Some(3));
        assert_eq!(fields.string("action"), None);
    }

    #[test]
    fn test_trailing_carriage_return_is_tolerated() {
        let fields = Fields::parse("{\"cmd\":\"ping\"}\r");
        assert_eq!(fields.string("cmd").as_deref(), Some("ping"));
    }

    #[test]
    fn test_wrong_type_counts_as_missing() {
        let fields = Fields::parse(r#"{"cmd":42,"frames":"three"}"#);
        assert_eq!(fields.string("cmd"), None);
        assert_eq!(fields.int("frames"), None);
    }

    #[test]
    fn test_object_numbers_truncate_and_saturate() {
        let fields = Fields::parse(r#"{"a":2.9,"b":-1,"c":18446744073709551615}"#);
        assert_eq!(fields.int("a"), Some(2));
        assert_eq!(fields.int("b"), Some(-1));
        assert_eq!(fields.int("c"), Some(i64::MAX));
    }

    #[test]
    fn test_scanner_on_truncated_line() {
        let fields = Fields::parse(r#"{"cmd" : "wait_frames", "frames": 12"#);
        assert!(matches!(fields, Fields::Raw(_)));
        assert_eq!(fields.string("cmd").as_deref(), Some("wait_frames"));
        assert_eq!(fields.int("frames"), Some(12));
    }

    #[test]
    fn test_scanner_escapes_and_unterminated_strings() {
        let fields = Fields::parse(r#"{"text":"say \"hi\" \\ ok","path":"/tmp/x"#);
        assert_eq!(fields.string("text").as_deref(), Some(r#"say "hi" \ ok"#));
        assert_eq!(fields.string("path"), None);
    }

    #[test]
    fn test_scanner_skips_key_text_inside_values() {
        // The first "key" is a value, not followed by a colon.
        let fields = Fields::parse(r#"{"cmd":"key", "key":"tab""#);
        assert_eq!(fields.string("key").as_deref(), Some("tab"));
    }

    #[test]
    fn test_scanner_integers() {
        assert_eq!(Fields::parse(r#""n":-7,"#).int("n"), Some(-7));
        assert_eq!(Fields::parse(r#""n":+4"#).int("n"), Some(4));
        assert_eq!(Fields::parse(r#""n":99999999999999999999"#).int("n"), Some(i64::MAX));
        assert_eq!(Fields::parse(r#""n":-"#).int("n"), None);
        assert_eq!(Fields::parse(r#""n":"5""#).int("n"), None);
    }

    #[test]
    fn test_scanner_garbage() {
        for line in ["", "   ", "cmd ping", "\"cmd\"", "\"cmd\":", "{\"cmd\" \"ping\"}", "\u{7f}\u{1}"] {
            let fields = Fields::parse(line);
            assert_eq!(fields.string("cmd"), None, "line {line:?}");
            assert_eq!(fields.int("cmd"), None, "line {line:?}");
        }
    }
}
