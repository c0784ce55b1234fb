//! Handle to a spawned MCP server (spawn, communicate, lifecycle).

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, RequestId,
};

/// Default timeout for a single MCP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum output size (1MB).
pub const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Configuration for an MCP server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }
}

/// Handle to a running MCP server.
///
/// The child process is killed when the handle is dropped, so a session
/// never outlives its scope even if `shutdown` is not reached.
pub struct Server {
    config: ServerConfig,
    process: Mutex<Child>,
    stdin: Mutex<ChildStdin>,
    stdout: Mutex<BufReader<ChildStdout>>,
    next_id: AtomicI64,
    initialized: AtomicBool,
    request_timeout: Duration,
}

impl Server {
    /// Spawn a new MCP server process.
    pub async fn spawn(config: ServerConfig) -> Result<Self> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut process = cmd
            .spawn()
            .map_err(|e| Error::Spawn(format!("{}: {e}", config.command)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::Spawn("failed to capture stdin".into()))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::Spawn("failed to capture stdout".into()))?;

        Ok(Self {
            config,
            process: Mutex::new(process),
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(BufReader::new(stdout)),
            next_id: AtomicI64::new(1),
            initialized: AtomicBool::new(false),
            request_timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Run the initialize handshake (must be called before `call_tool`).
    pub async fn initialize(&self) -> Result<InitializeResult> {
        let result: InitializeResult = self
            .request("initialize", Some(InitializeParams::default()))
            .await?;

        self.notify("notifications/initialized", None::<()>).await?;
        self.initialized.store(true, Ordering::SeqCst);

        Ok(result)
    }

    /// Check if the server is initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Call a tool by name.
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<CallToolResult> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }

        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };

        let result: CallToolResult = self.request("tools/call", Some(params)).await?;

        if result.is_error {
            return Err(Error::ToolCallFailed(result.joined_text()));
        }

        Ok(result)
    }

    /// Check if the server process is still running.
    pub async fn is_running(&self) -> bool {
        let mut process = self.process.lock().await;
        matches!(process.try_wait(), Ok(None))
    }

    /// Shut down the server.
    pub async fn shutdown(self) -> Result<()> {
        // Closing stdin is the stdio transport's shutdown signal.
        drop(self.stdin);

        let mut process = self.process.into_inner();
        if timeout(Duration::from_millis(500), process.wait())
            .await
            .is_err()
        {
            let _ = process.kill().await;
        }

        Ok(())
    }

    // --- Internal methods ---

    fn next_request_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn request<P, R>(&self, method: &str, params: Option<P>) -> Result<R>
    where
        P: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let id = self.next_request_id();
        let mut request = JsonRpcRequest::new(id.clone(), method);
        if let Some(p) = params {
            request = request.with_params(p);
        }

        let request_json = serde_json::to_string(&request)?;
        self.write_line(&request_json).await?;

        let response = timeout(self.request_timeout, self.read_response())
            .await
            .map_err(|_| Error::Timeout)??;

        if response.id.as_ref() != Some(&id) {
            return Err(Error::InvalidResponse(format!(
                "response ID mismatch: expected {id:?}, got {:?}",
                response.id
            )));
        }

        let result_value = response.into_result()?;
        let result: R = serde_json::from_value(result_value)?;

        Ok(result)
    }

    async fn notify<P>(&self, method: &str, params: Option<P>) -> Result<()>
    where
        P: serde::Serialize,
    {
        // Notifications have no ID
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params.and_then(|p| serde_json::to_value(p).ok())
        });

        self.write_line(&serde_json::to_string(&notification)?)
            .await
    }

    async fn write_line(&self, line: &str) -> Result<()> {
        let mut stdin = self.stdin.lock().await;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn read_response(&self) -> Result<JsonRpcResponse> {
        let mut stdout = self.stdout.lock().await;

        loop {
            let mut line = String::new();
            let bytes_read = stdout.read_line(&mut line).await?;
            if bytes_read == 0 {
                return Err(Error::ServerExited);
            }

            if line.len() > MAX_OUTPUT_SIZE {
                return Err(Error::OutputTooLarge {
                    size: line.len(),
                    max: MAX_OUTPUT_SIZE,
                });
            }

            // Servers may interleave notifications (logging, progress) with
            // responses; only lines carrying an id answer a request.
            let value: Value = serde_json::from_str(&line)?;
            if value.get("id").is_none_or(Value::is_null) {
                continue;
            }

            return Ok(serde_json::from_value(value)?);
        }
    }
}
