//! Line-oriented JSON-RPC listener over stdin/stdout.
//!
//! One request per line in, one reply per line out. Notifications produce no
//! output. Stdin is read on a dedicated thread feeding a channel: a pending
//! blocking read must not pin the runtime during shutdown, so cancellation
//! only has to win a `select!` against the channel, never against the read
//! itself. The loop exits cleanly on stdin EOF or when the shared
//! cancellation token fires.

use std::io::BufRead;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::handler::RpcHandler;
use crate::router::{self, parse_request};

/// Run the stdio listener until EOF or cancellation.
///
/// # Errors
///
/// Propagates stdio I/O failures.
pub async fn run<H: RpcHandler>(handler: H, token: CancellationToken) -> Result<(), ServerError> {
    info!("stdio listener started");
    let lines = spawn_stdin_reader()?;
    let result = run_loop(handler, lines, tokio::io::stdout(), token).await;
    info!("stdio listener stopped");
    result
}

/// Read stdin line by line on a detached thread.
///
/// The thread ends on EOF, on a read error, or when the listener drops the
/// receiving end.
fn spawn_stdin_reader() -> Result<mpsc::Receiver<std::io::Result<String>>, ServerError> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            loop {
                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.blocking_send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.blocking_send(Err(e));
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

/// The transport loop, generic over the line source and writer for
/// testability. A closed channel means EOF.
pub(crate) async fn run_loop<H, W>(
    handler: H,
    mut lines: mpsc::Receiver<std::io::Result<String>>,
    mut writer: W,
    token: CancellationToken,
) -> Result<(), ServerError>
where
    H: RpcHandler,
    W: AsyncWrite + Unpin + Send,
{
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("stdio listener cancelled");
                return Ok(());
            }
            next = lines.recv() => {
                let line = match next {
                    None => {
                        debug!("stdin closed");
                        return Ok(());
                    }
                    Some(line) => line?,
                };

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let reply = match parse_request(trimmed) {
                    Ok(request) => router::route_request(&handler, request).await,
                    Err(error_reply) => Some(error_reply),
                };

                if let Some(reply) = reply {
                    let mut encoded = serde_json::to_vec(&reply)?;
                    encoded.push(b'\n');
                    writer.write_all(&encoded).await?;
                    writer.flush().await?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use taskdeck_protocol::types::{
        CallToolResult, GetPromptResult, Implementation, Prompt, Tool,
    };

    #[derive(Clone)]
    struct EchoHandler;

    #[async_trait::async_trait]
    impl RpcHandler for EchoHandler {
        fn server_info(&self) -> Implementation {
            Implementation {
                name: "echo".into(),
                version: "0".into(),
            }
        }

        async fn list_tools(&self) -> Result<Vec<Tool>, ServerError> {
            Ok(Vec::new())
        }

        async fn call_tool(
            &self,
            name: &str,
            _arguments: Option<Value>,
        ) -> Result<CallToolResult, ServerError> {
            Ok(CallToolResult::text(name.to_string()))
        }

        async fn list_prompts(&self) -> Result<Vec<Prompt>, ServerError> {
            Ok(Vec::new())
        }

        async fn get_prompt(
            &self,
            _name: &str,
            _arguments: Option<Value>,
        ) -> Result<GetPromptResult, ServerError> {
            Ok(GetPromptResult {
                description: None,
                messages: Vec::new(),
            })
        }
    }

    /// Feed fixed input lines; dropping the sender signals EOF.
    fn lines_from(input: &[&str]) -> mpsc::Receiver<std::io::Result<String>> {
        let (tx, rx) = mpsc::channel(16);
        for line in input {
            tx.try_send(Ok(line.to_string())).unwrap();
        }
        rx
    }

    #[tokio::test]
    async fn replies_line_per_request_and_exits_on_eof() {
        let lines = lines_from(&[
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        ]);
        let mut output = Vec::new();
        run_loop(EchoHandler, lines, &mut output, CancellationToken::new())
            .await
            .unwrap();

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[1]["result"]["tools"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn notifications_produce_no_output() {
        let lines = lines_from(&[r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#]);
        let mut output = Vec::new();
        run_loop(EchoHandler, lines, &mut output, CancellationToken::new())
            .await
            .unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn malformed_line_gets_parse_error_reply() {
        let lines = lines_from(&["{nope"]);
        let mut output = Vec::new();
        run_loop(EchoHandler, lines, &mut output, CancellationToken::new())
            .await
            .unwrap();
        let reply: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(reply["error"]["code"], -32700);
        assert_eq!(reply["id"], Value::Null);
    }

    #[tokio::test]
    async fn read_error_is_propagated() {
        let (tx, rx) = mpsc::channel(1);
        tx.try_send(Err(std::io::Error::other("tty went away"))).unwrap();
        let mut output = Vec::new();
        let err = run_loop(EchoHandler, rx, &mut output, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Io(_)));
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop() {
        let token = CancellationToken::new();
        token.cancel();
        // Keep the sender alive so the channel never signals EOF.
        let (_tx, rx) = mpsc::channel::<std::io::Result<String>>(1);
        let mut output = Vec::new();
        run_loop(EchoHandler, rx, &mut output, token).await.unwrap();
        assert!(output.is_empty());
    }
}
