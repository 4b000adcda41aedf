//! MCP (Model Context Protocol) server for the frame grabber.
//!
//! Exposes the machine as a JSON-RPC 2.0 server over stdin/stdout so
//! scripts and agents can boot, clock, observe, and capture it
//! programmatically.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use sim_core::{Observable, Tickable};

use crate::capture;
use crate::config::MachineConfig;
use crate::machine::Framegrab;

// ---------------------------------------------------------------------------
// JSON-RPC types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RpcRequest {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: JsonValue,
    id: JsonValue,
}

#[derive(Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: JsonValue,
}

#[derive(Serialize)]
struct RpcError {
    code: i32,
    message: String,
}

impl RpcResponse {
    fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0",
            result: Some(result),
            error: None,
            id,
        }
    }

    fn error(id: JsonValue, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(RpcError { code, message }),
            id,
        }
    }
}

// ---------------------------------------------------------------------------
// MCP server
// ---------------------------------------------------------------------------

/// MCP server wrapping a headless frame-grabber instance.
pub struct McpServer {
    machine: Option<Framegrab>,
    config_path: Option<PathBuf>,
}

impl McpServer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            machine: None,
            config_path: None,
        }
    }

    /// Set a default configuration path (from the CLI --config argument).
    pub fn set_config_path(&mut self, path: PathBuf) {
        self.config_path = Some(path);
    }

    /// Run the server loop: read JSON-RPC from stdin, write responses to
    /// stdout.
    pub fn run(&mut self) {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut stdout = stdout.lock();

        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            let request: RpcRequest = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(e) => {
                    Self::respond(
                        &mut stdout,
                        &RpcResponse::error(JsonValue::Null, -32700, format!("Parse error: {e}")),
                    );
                    continue;
                }
            };

            if request.jsonrpc != "2.0" {
                Self::respond(
                    &mut stdout,
                    &RpcResponse::error(request.id, -32600, "Invalid JSON-RPC version".to_string()),
                );
                continue;
            }

            let response = self.dispatch(&request.method, &request.params, request.id.clone());
            Self::respond(&mut stdout, &response);
        }
    }

    fn respond(stdout: &mut impl Write, response: &RpcResponse) {
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(response).unwrap_or_default()
        );
        let _ = stdout.flush();
    }

    fn dispatch(&mut self, method: &str, params: &JsonValue, id: JsonValue) -> RpcResponse {
        match method {
            "boot" => self.handle_boot(params, id),
            "step_ticks" => self.handle_step_ticks(params, id),
            "start_transfer" => self.handle_start_transfer(id),
            "set_swap" => self.handle_set_swap(params, id),
            "run_transfer" => self.handle_run_transfer(id),
            "query" => self.handle_query(params, id),
            "read_buffer" => self.handle_read_buffer(params, id),
            "capture" => self.handle_capture(params, id),
            "status" => self.handle_status(id),
            _ => RpcResponse::error(id, -32601, format!("Unknown method: {method}")),
        }
    }

    fn require_machine(&mut self, id: &JsonValue) -> Result<&mut Framegrab, RpcResponse> {
        if let Some(machine) = self.machine.as_mut() {
            Ok(machine)
        } else {
            Err(RpcResponse::error(
                id.clone(),
                -32000,
                "No machine instance. Call 'boot' first.".to_string(),
            ))
        }
    }

    fn selector_param(params: &JsonValue) -> bool {
        params
            .get("buffer")
            .and_then(JsonValue::as_u64)
            .is_some_and(|b| b != 0)
    }

    // === Tool handlers ===

    fn handle_boot(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let config = if let Some(inline) = params.get("config") {
            match serde_json::from_value::<MachineConfig>(inline.clone()) {
                Ok(c) => c,
                Err(e) => return RpcResponse::error(id, -32602, format!("Invalid config: {e}")),
            }
        } else if let Some(path) = params
            .get("path")
            .and_then(JsonValue::as_str)
            .map(PathBuf::from)
            .or_else(|| self.config_path.clone())
        {
            match MachineConfig::load(&path) {
                Ok(c) => c,
                Err(e) => return RpcResponse::error(id, -32000, e),
            }
        } else {
            MachineConfig::default()
        };

        match Framegrab::new(&config) {
            Ok(mut machine) => {
                machine.framebuffer_mut().fill_test_pattern();
                self.machine = Some(machine);
                RpcResponse::success(id, serde_json::json!({"status": "ok"}))
            }
            Err(e) => RpcResponse::error(id, -32000, format!("Boot failed: {e}")),
        }
    }

    fn handle_step_ticks(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        let count = params.get("count").and_then(JsonValue::as_u64).unwrap_or(1);
        for _ in 0..count {
            machine.tick();
        }

        RpcResponse::success(
            id,
            serde_json::json!({
                "master_clock": machine.master_clock(),
                "active": machine.transfer_active(),
            }),
        )
    }

    fn handle_start_transfer(&mut self, id: JsonValue) -> RpcResponse {
        match self.require_machine(&id) {
            Ok(machine) => {
                machine.start_transfer();
                RpcResponse::success(id, serde_json::json!({"status": "ok"}))
            }
            Err(e) => e,
        }
    }

    fn handle_set_swap(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let swap = params
            .get("value")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        match self.require_machine(&id) {
            Ok(machine) => {
                machine.set_swap(swap);
                RpcResponse::success(id, serde_json::json!({"swap": swap}))
            }
            Err(e) => e,
        }
    }

    fn handle_run_transfer(&mut self, id: JsonValue) -> RpcResponse {
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        match machine.run_transfer() {
            Ok(ticks) => RpcResponse::success(
                id,
                serde_json::json!({
                    "ticks": ticks,
                    "done_count": machine.done_count(),
                    "words_accepted": machine.memory().words_accepted(),
                }),
            ),
            Err(e) => RpcResponse::error(id, -32000, e),
        }
    }

    fn handle_query(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        let Some(path) = params.get("path").and_then(JsonValue::as_str) else {
            let paths: Vec<&str> = machine.query_paths().to_vec();
            return RpcResponse::success(id, serde_json::json!({"paths": paths}));
        };

        match machine.query(path) {
            Some(value) => RpcResponse::success(
                id,
                serde_json::json!({"path": path, "value": value.to_string()}),
            ),
            None => RpcResponse::error(id, -32602, format!("Unknown path: {path}")),
        }
    }

    fn handle_read_buffer(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let selector = Self::selector_param(params);
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        let bytes = machine.buffer_bytes(selector);
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        RpcResponse::success(
            id,
            serde_json::json!({
                "buffer": u8::from(selector),
                "bytes": bytes.len(),
                "data": encoded,
            }),
        )
    }

    fn handle_capture(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let selector = Self::selector_param(params);
        let Some(path) = params.get("path").and_then(JsonValue::as_str) else {
            return RpcResponse::error(id, -32602, "Provide 'path'".to_string());
        };
        let path = Path::new(path).to_path_buf();

        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        match capture::save_buffer_png(machine, selector, &path) {
            Ok(()) => RpcResponse::success(
                id,
                serde_json::json!({"path": path.display().to_string()}),
            ),
            Err(e) => RpcResponse::error(id, -32000, format!("Capture failed: {e}")),
        }
    }

    fn handle_status(&mut self, id: JsonValue) -> RpcResponse {
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        RpcResponse::success(
            id,
            serde_json::json!({
                "master_clock": machine.master_clock(),
                "active": machine.transfer_active(),
                "swap": machine.swap(),
                "done_count": machine.done_count(),
                "words_accepted": machine.memory().words_accepted(),
                "bursts_accepted": machine.memory().bursts_accepted(),
            }),
        )
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}
