//! Reply lines written back to the client.

use serde_json::{Map, Value};

use crate::error::CommandError;

/// One reply object. `"ok"` is always the first key on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    body: Map<String, Value>,
}

impl Reply {
    /// `{"ok":true}`.
    pub fn ok() -> Self {
        let mut body = Map::new();
        body.insert("ok".to_string(), Value::Bool(true));
        Self { body }
    }

    /// `{"ok":false,"error":"<message>"}` with the message sanitized.
    pub fn failure(message: &str) -> Self {
        let mut body = Map::new();
        body.insert("ok".to_string(), Value::Bool(false));
        body.insert("error".to_string(), Value::String(sanitize_error(message)));
        Self { body }
    }

    /// Adds a field after the existing ones.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    #[cfg(test)]
    fn is_ok(&self) -> bool {
        self.body.get("ok") == Some(&Value::Bool(true))
    }

    /// Serialized reply without the trailing newline.
    pub fn to_line(&self) -> String {
        // Map<String, Value> always serializes.
        Value::Object(self.body.clone()).to_string()
    }
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Self::failure(&err.to_string())
    }
}

/// Replaces quote, backslash and line-break characters with spaces.
pub fn sanitize_error(message: &str) -> String {
    message
        .chars()
        .map(|c| if matches!(c, '"' | '\\' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_order_on_the_wire() {
        assert_eq!(Reply::ok().with("pong", true).to_line(), r#"{"ok":true,"pong":true}"#);
        assert_eq!(
            Reply::from(CommandError::Busy).to_line(),
            r#"{"ok":false,"error":"busy"}"#
        );
        assert_eq!(
            Reply::ok().with("frame", 9u64).with("context", "menu").to_line(),
            r#"{"ok":true,"frame":9,"context":"menu"}"#
        );
    }

    #[test]
    fn test_error_messages_are_sanitized() {
        let reply = Reply::failure("bad \"path\"\\\nhere\r");
        assert_eq!(reply.to_line(), r#"{"ok":false,"error":"bad  path   here "}"#);
        assert!(!reply.is_ok());
    }

    #[test]
    fn test_other_fields_are_escaped_not_mangled() {
        let line = Reply::ok().with("output", "say \"hi\"").to_line();
        assert_eq!(line, r#"{"ok":true,"output":"say \"hi\""}"#);
        let back: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(back["output"], "say \"hi\"");
    }
}
