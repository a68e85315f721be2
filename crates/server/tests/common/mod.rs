use anyhow::Context as _;
use serde_json::{Value, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

pub const BIN: &str = env!("CARGO_BIN_EXE_yapi-mcp-server");

/// Minimal line-delimited JSON-RPC client for the server's stdio transport.
pub struct StdioSession {
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl StdioSession {
    /// Spawn the server with `args` and complete the MCP initialize handshake.
    pub async fn start(args: &[String]) -> anyhow::Result<Self> {
        let mut child = Command::new(BIN)
            .args(args)
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("spawn yapi-mcp-server")?;

        let stdin = child.stdin.take().context("child stdin")?;
        let stdout = BufReader::new(child.stdout.take().context("child stdout")?).lines();
        let mut session = Self {
            _child: child,
            stdin,
            stdout,
        };

        let init = session
            .request(
                0,
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "yapi-mcp-integration-tests", "version": "0" }
                }),
            )
            .await?;
        anyhow::ensure!(
            init.pointer("/result/serverInfo/name") == Some(&json!("YApi MCP Server")),
            "unexpected initialize result: {init}"
        );
        session
            .send(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await?;
        Ok(session)
    }

    async fn send(&mut self, msg: &Value) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(msg)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    pub async fn request(&mut self, id: u64, method: &str, params: Value) -> anyhow::Result<Value> {
        self.send(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await?;

        tokio::time::timeout(Duration::from_secs(20), async {
            loop {
                let line = self
                    .stdout
                    .next_line()
                    .await?
                    .context("server closed stdout")?;
                let msg: Value = serde_json::from_str(&line)
                    .with_context(|| format!("invalid JSON-RPC line: {line}"))?;
                if msg.get("id") == Some(&json!(id)) {
                    return Ok(msg);
                }
            }
        })
        .await
        .context("timed out waiting for response")?
    }

    /// Call a tool and return the text of its single content item.
    pub async fn call_tool_text(
        &mut self,
        id: u64,
        name: &str,
        arguments: Value,
    ) -> anyhow::Result<String> {
        let msg = self
            .request(id, "tools/call", json!({"name": name, "arguments": arguments}))
            .await?;
        anyhow::ensure!(msg.get("error").is_none(), "unexpected rpc error: {msg}");
        msg.pointer("/result/content/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("tools/call missing result.content[0].text")
    }
}

pub fn yapi_args(host: &str) -> Vec<String> {
    vec![
        format!("--yapiHost={host}"),
        "--yapiToken=integration-token".to_string(),
        "--retries=1".to_string(),
    ]
}
