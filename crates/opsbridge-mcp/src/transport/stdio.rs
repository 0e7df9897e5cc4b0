//! Stdio transport — reads JSON-RPC from stdin, writes to stdout.
//!
//! Each inbound line gets its own session: a fresh registry, a fresh event
//! channel. Notification lines are written before the terminal response line.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use opsbridge::Connectors;

use crate::actions::ActionRegistry;
use crate::protocol::ProtocolHandler;
use crate::session::{Session, SessionEvent};
use crate::types::{JsonRpcError, McpError, McpResult, RequestId, JSONRPC_VERSION};

use super::framing;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    connectors: Connectors,
}

impl StdioTransport {
    pub fn new(connectors: Connectors) -> Self {
        Self { connectors }
    }

    /// Run the transport loop — reads from stdin, writes to stdout.
    pub async fn run(&self) -> McpResult<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(McpError::Io)?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match framing::parse_message(trimmed) {
                Ok(msg) => {
                    let registry = ActionRegistry::with_default_actions(self.connectors.clone());
                    let (session, mut rx) = Session::new(registry);
                    session.connect();
                    let handler = Arc::new(ProtocolHandler::new(session));

                    let task = tokio::spawn({
                        let handler = handler.clone();
                        async move { handler.process(msg).await }
                    });

                    while let Some(event) = rx.recv().await {
                        match event {
                            SessionEvent::Notification(n) => {
                                let value = serde_json::to_value(&n)
                                    .map_err(|e| McpError::InternalError(e.to_string()))?;
                                write_line(&mut stdout, &value).await?;
                            }
                            SessionEvent::Response(value) => {
                                // Null marks an inbound notification: no reply.
                                if !value.is_null() {
                                    write_line(&mut stdout, &value).await?;
                                }
                                break;
                            }
                        }
                    }

                    task.await
                        .map_err(|e| McpError::InternalError(e.to_string()))?;
                }
                Err(e) => {
                    tracing::warn!("Parse error: {e}");
                    let error_response = JsonRpcError {
                        jsonrpc: JSONRPC_VERSION.to_string(),
                        id: RequestId::Null,
                        error: crate::types::JsonRpcErrorObject {
                            code: e.code(),
                            message: e.to_string(),
                            data: None,
                        },
                    };
                    let value = serde_json::to_value(error_response)
                        .map_err(|e| McpError::InternalError(e.to_string()))?;
                    write_line(&mut stdout, &value).await?;
                }
            }
        }

        Ok(())
    }
}

async fn write_line(
    stdout: &mut tokio::io::Stdout,
    value: &serde_json::Value,
) -> McpResult<()> {
    let framed = framing::frame_message(value)?;
    stdout
        .write_all(framed.as_bytes())
        .await
        .map_err(McpError::Io)?;
    stdout.flush().await.map_err(McpError::Io)?;
    Ok(())
}
