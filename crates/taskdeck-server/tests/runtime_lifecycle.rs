//! Runtime lifecycle tests: dual listeners, cancellation, first-error
//! aggregation, and a real client talking to the real HTTP listener.

use std::net::SocketAddr;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use taskdeck_client::{Client, HttpTransport, HttpTransportConfig};
use taskdeck_server::upstream::UpstreamClient;
use taskdeck_server::{runtime, TaskdeckService, TransportMode};

fn service() -> TaskdeckService {
    // Catalog operations never touch the upstream, so a dead URL is fine.
    let upstream =
        UpstreamClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
    TaskdeckService::new(upstream)
}

/// Reserve an ephemeral port, then release it for the runtime to claim.
fn free_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

fn client_for(addr: SocketAddr) -> Client {
    let transport = HttpTransport::new(HttpTransportConfig {
        base_url: format!("http://{addr}"),
        endpoint_path: "/mcp".into(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    Client::new(transport)
}

async fn wait_until_serving(addr: SocketAddr) {
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server never started listening on {addr}");
}

#[tokio::test]
async fn http_mode_serves_a_real_client_and_mints_sessions() {
    let addr = free_port();
    let token = CancellationToken::new();
    let run = tokio::spawn(runtime::run(service(), TransportMode::Http, addr, token.clone()));
    wait_until_serving(addr).await;

    let client = client_for(addr);
    let tools = client.list_tools().await.unwrap();
    assert!(tools.tools.iter().any(|t| t.name == "list_tasks"));

    // The server minted a session on initialize and the client adopted it.
    let session = client.transport().session_token().await;
    assert!(session.is_some_and(|s| !s.is_empty()));

    let prompts = client.list_prompts().await.unwrap();
    assert_eq!(prompts.prompts.len(), 2);

    token.cancel();
    tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("runtime did not stop after cancellation")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn both_mode_serves_http_and_drains_on_cancel() {
    let addr = free_port();
    let token = CancellationToken::new();
    let run = tokio::spawn(runtime::run(service(), TransportMode::Both, addr, token.clone()));
    wait_until_serving(addr).await;

    // The HTTP listener is live alongside the stdio one.
    let client = client_for(addr);
    let tools = client.list_tools().await.unwrap();
    assert!(!tools.tools.is_empty());

    // Cancellation must drain both listeners and yield a clean exit,
    // whether stdin is still open or already at EOF.
    token.cancel();
    let result = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("runtime did not stop after cancellation")
        .unwrap();
    assert!(result.is_ok(), "runtime exited with {result:?}");
}

#[tokio::test]
async fn bind_failure_is_aggregated_as_first_error() {
    // Hold the port so the runtime's HTTP listener cannot bind it.
    let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = blocker.local_addr().unwrap();

    let token = CancellationToken::new();
    let result = runtime::run(service(), TransportMode::Http, addr, token).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn non_post_requests_get_405() {
    let addr = free_port();
    let token = CancellationToken::new();
    let run = tokio::spawn(runtime::run(service(), TransportMode::Http, addr, token.clone()));
    wait_until_serving(addr).await;

    let status = reqwest::get(format!("http://{addr}/mcp"))
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::METHOD_NOT_ALLOWED);

    token.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(10), run).await;
}

#[tokio::test]
async fn unknown_tool_surfaces_as_rpc_error() {
    let addr = free_port();
    let token = CancellationToken::new();
    let run = tokio::spawn(runtime::run(service(), TransportMode::Http, addr, token.clone()));
    wait_until_serving(addr).await;

    let client = client_for(addr);
    let err = client.call_tool("does_not_exist", None).await.unwrap_err();
    assert!(err.is_rpc(), "expected a protocol-level error, got {err}");

    token.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(10), run).await;
}
