//! MCP stdio bridge.
//!
//! Translates MCP JSON-RPC on stdin/stdout into remote-control requests.
//! Each `tools/call` maps onto one or more [`RemoteClient`] calls, so the
//! bridge holds no state of its own between messages.
//!
//! Launched by an MCP host as: `remotectl mcp-serve --socket /path/to/app.sock`
//!
//! Messages are newline-delimited JSON. stdout carries only protocol
//! traffic; diagnostics go through `log` to stderr.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Map, Value};

use crate::client::RemoteClient;

/// MCP protocol revision this bridge speaks.
const PROTOCOL_VERSION: &str = "2025-03-26";

/// Name reported in `serverInfo`.
const SERVER_NAME: &str = "remote-control";

/// JSON-RPC: method not found.
const METHOD_NOT_FOUND: i64 = -32601;

/// JSON-RPC: invalid params.
const INVALID_PARAMS: i64 = -32602;

/// Bridge from MCP tool calls to a remote-control socket.
#[derive(Debug, Clone)]
pub struct McpBridge {
    client: RemoteClient,
}

impl McpBridge {
    /// Bridge that forwards tool calls through `client`.
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    /// Reads messages from `input` until EOF, writing responses to `output`.
    ///
    /// Unparseable lines are logged and skipped.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<()> {
        log::info!("[mcp] Bridging to {}", self.client.socket_path().display());

        for line in input.lines() {
            let line = line.context("read MCP input")?;
            if line.trim().is_empty() {
                continue;
            }

            let message: Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("[mcp] Invalid JSON from stdin: {e}");
                    continue;
                }
            };

            if let Some(response) = self.handle_message(&message) {
                writeln!(output, "{response}").context("write MCP response")?;
                output.flush().context("flush MCP response")?;
            }
        }
        Ok(())
    }

    /// Handles one JSON-RPC message. Returns `None` for notifications.
    pub fn handle_message(&self, message: &Value) -> Option<Value> {
        let method = message.get("method").and_then(Value::as_str).unwrap_or("");
        let id = message.get("id").cloned();

        match method {
            "initialize" => Some(result(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )),

            "notifications/initialized" => None,

            "tools/list" => Some(result(id, json!({ "tools": tool_definitions() }))),

            "tools/call" => {
                let params = message.get("params").cloned().unwrap_or_else(|| json!({}));
                let name = params.get("name").and_then(Value::as_str).unwrap_or("");
                let arguments = match params.get("arguments") {
                    None | Some(Value::Null) => Map::new(),
                    Some(Value::Object(map)) => map.clone(),
                    Some(_) => {
                        return Some(error(id, INVALID_PARAMS, "arguments must be an object"));
                    }
                };

                log::debug!("[mcp] tools/call {name}");
                let content = match self.call_tool(name, &arguments) {
                    Ok(text) => tool_result(&text, false),
                    Err(e) => {
                        log::debug!("[mcp] {name} failed: {e:#}");
                        tool_result(&format!("error: {e:#}"), true)
                    }
                };
                Some(result(id, content))
            }

            _ => {
                // Requests get an error; notifications (no id) are ignored.
                id.map(|id| error(Some(id), METHOD_NOT_FOUND, &format!("Method not found: {method}")))
            }
        }
    }

    /// Runs one tool and returns its text output.
    fn call_tool(&self, name: &str, args: &Map<String, Value>) -> Result<String> {
        let client = &self.client;
        let reply = match name {
            "game_ping" => client.call(&json!({"cmd": "ping"}))?,
            "game_state" => client.state()?,
            "game_wait" => {
                let frames = required_int(args, "frames")?;
                client.call(&json!({"cmd": "wait_frames", "frames": frames}))?
            }
            "game_send_key" => {
                let key = required_str(args, "key")?;
                let action = optional_str(args, "action")?.unwrap_or("tap");
                let repeat = optional_int(args, "repeat")?.unwrap_or(1).clamp(0, i64::from(u32::MAX));
                let wait_between = optional_int(args, "wait_between")?.unwrap_or(0);
                client.send_key_sequence(key, action, repeat as u32, wait_between)?;
                json!({"ok": true})
            }
            "game_send_keys" => {
                let keys = args
                    .get("keys")
                    .and_then(Value::as_array)
                    .ok_or_else(|| anyhow!("missing argument: keys"))?
                    .iter()
                    .map(|k| k.as_str().ok_or_else(|| anyhow!("keys must be strings")))
                    .collect::<Result<Vec<_>>>()?;
                let wait_between = optional_int(args, "wait_between")?.unwrap_or(0);
                client.tap_keys(&keys, wait_between)?;
                json!({"ok": true})
            }
            "game_send_text" => {
                let text = required_str(args, "text")?;
                client.call(&json!({"cmd": "send_text", "text": text}))?
            }
            "game_console" => {
                let command = required_str(args, "command")?;
                client.call(&json!({"cmd": "console_exec", "command": command}))?
            }
            "game_screenshot" => {
                let path = required_str(args, "path")?;
                let path = std::path::absolute(Path::new(path))
                    .with_context(|| format!("resolve {path}"))?;
                client.call(&json!({"cmd": "screenshot", "path": path.display().to_string()}))?
            }
            other => return Err(anyhow!("unknown tool: {other}")),
        };
        Ok(reply.to_string())
    }
}

fn result(id: Option<Value>, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

fn error(id: Option<Value>, code: i64, message: &str) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
}

fn tool_result(text: &str, is_error: bool) -> Value {
    json!({
        "content": [{"type": "text", "text": text}],
        "isError": is_error
    })
}

fn required_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    optional_str(args, key)?.ok_or_else(|| anyhow!("missing argument: {key}"))
}

fn optional_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(anyhow!("{key} must be a string")),
    }
}

fn required_int(args: &Map<String, Value>, key: &str) -> Result<i64> {
    optional_int(args, key)?.ok_or_else(|| anyhow!("missing argument: {key}"))
}

fn optional_int(args: &Map<String, Value>, key: &str) -> Result<Option<i64>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| anyhow!("{key} must be an integer")),
    }
}

/// Tool catalogue returned by `tools/list`.
fn tool_definitions() -> Value {
    let no_args = json!({"type": "object", "properties": {}});
    json!([
        {
            "name": "game_ping",
            "description": "Ping the remote-control server.",
            "inputSchema": no_args
        },
        {
            "name": "game_state",
            "description": "Get the current remote-control state snapshot.",
            "inputSchema": no_args
        },
        {
            "name": "game_wait",
            "description": "Wait N presented frames.",
            "inputSchema": {
                "type": "object",
                "properties": {"frames": {"type": "integer", "minimum": 1}},
                "required": ["frames"]
            }
        },
        {
            "name": "game_send_key",
            "description": "Send one key, optionally repeated.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "key": {"type": "string"},
                    "action": {"type": "string", "enum": ["tap", "down", "up"], "default": "tap"},
                    "repeat": {"type": "integer", "minimum": 1, "default": 1},
                    "wait_between": {"type": "integer", "minimum": 0, "default": 0}
                },
                "required": ["key"]
            }
        },
        {
            "name": "game_send_keys",
            "description": "Send a sequence of key taps.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "keys": {"type": "array", "items": {"type": "string"}, "minItems": 1},
                    "wait_between": {"type": "integer", "minimum": 0, "default": 0}
                },
                "required": ["keys"]
            }
        },
        {
            "name": "game_send_text",
            "description": "Send committed text input.",
            "inputSchema": {
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            }
        },
        {
            "name": "game_console",
            "description": "Execute a debug-console command.",
            "inputSchema": {
                "type": "object",
                "properties": {"command": {"type": "string"}},
                "required": ["command"]
            }
        },
        {
            "name": "game_screenshot",
            "description": "Capture a screenshot to an absolute or working-directory-relative path.",
            "inputSchema": {
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"]
            }
        }
    ])
}
