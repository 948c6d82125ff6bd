// Server loop module
// Accepts connections until shutdown is signalled

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `shutdown` is notified.
///
/// Must run inside a `tokio::task::LocalSet`; every connection is served in
/// its own local task. In-flight connections are not awaited on shutdown.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    // Pinned once so a notification between iterations is not lost
    let shutdown_signal = shutdown.notified();
    tokio::pin!(shutdown_signal);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = &mut shutdown_signal => {
                logger::log_shutdown();
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    struct RawResponse {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl RawResponse {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    async fn get(addr: SocketAddr, path: &str) -> RawResponse {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();

        let split = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
        let head = String::from_utf8(raw[..split].to_vec()).unwrap();
        let body = raw[split + 4..].to_vec();

        let mut lines = head.split("\r\n");
        let status = lines.next().unwrap().split(' ').nth(1).unwrap().parse().unwrap();
        let headers = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        RawResponse { status, headers, body }
    }

    fn fixture() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("das-server-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("images")).unwrap();
        std::fs::create_dir_all(dir.join("js")).unwrap();
        std::fs::write(dir.join("index.html"), b"<!DOCTYPE html><title>Orbit</title>").unwrap();
        std::fs::write(dir.join("js/main.js"), b"console.log('orbit');").unwrap();
        std::fs::write(dir.join("images/jupiter.webp"), b"webp").unwrap();
        std::fs::write(dir.join("images/credits.txt"), b"nasa").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_end_to_end_requests() {
        let dir = fixture();
        let state = Arc::new(AppState::with_base(Config::default(), &dir));
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    Arc::clone(&shutdown),
                ));

                let index = get(addr, "/").await;
                assert_eq!(index.status, 200);
                assert_eq!(index.header("content-type"), Some("text/html"));
                assert_eq!(index.body, b"<!DOCTYPE html><title>Orbit</title>");

                let script = get(addr, "/js/main.js?cache=1").await;
                assert_eq!(script.status, 200);
                assert_eq!(script.header("content-type"), Some("text/javascript"));

                let listing = get(addr, "/api/images").await;
                assert_eq!(listing.status, 200);
                assert_eq!(listing.header("content-type"), Some("application/json"));
                assert_eq!(
                    listing.body,
                    br#"[{"name":"jupiter.webp","url":"/images/jupiter.webp","thumbnail":"/images/jupiter.webp"}]"#
                );

                let missing = get(addr, "/nonexistent.html").await;
                assert_eq!(missing.status, 404);
                assert_eq!(missing.body, b"File /nonexistent.html not found!");

                shutdown.notify_one();
                server.await.unwrap().unwrap();
            })
            .await;

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_slow_reader_gets_complete_body() {
        let dir = std::env::temp_dir().join(format!("das-server-slow-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let payload: Vec<u8> = (0..=250u8).cycle().take(8 * 1024 * 1024).collect();
        std::fs::write(dir.join("scene.glb"), &payload).unwrap();

        let mut config = Config::default();
        config.performance.read_timeout = 1;
        let state = Arc::new(AppState::with_base(config, &dir));
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    Arc::clone(&shutdown),
                ));

                let mut stream = TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(b"GET /scene.glb HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();

                let mut raw = vec![0u8; 4096];
                let n = stream.read(&mut raw).await.unwrap();
                raw.truncate(n);
                tokio::time::sleep(Duration::from_millis(1500)).await;
                stream.read_to_end(&mut raw).await.unwrap();

                let split = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
                assert!(raw.starts_with(b"HTTP/1.1 200"));
                assert_eq!(raw.len() - (split + 4), payload.len());
                assert!(raw[split + 4..] == payload[..]);

                shutdown.notify_one();
                server.await.unwrap().unwrap();
            })
            .await;

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_connection_limit_drops_excess() {
        let dir = std::env::temp_dir().join(format!("das-server-limit-{}", std::process::id()));
        let mut config = Config::default();
        config.performance.max_connections = Some(0);
        let state = Arc::new(AppState::with_base(config, &dir));
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    Arc::clone(&shutdown),
                ));

                let mut stream = TcpStream::connect(addr).await.unwrap();
                let _ = stream
                    .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
                    .await;
                let mut raw = Vec::new();
                let _ = stream.read_to_end(&mut raw).await;
                assert!(raw.is_empty());

                shutdown.notify_one();
                server.await.unwrap().unwrap();
            })
            .await;
    }
}
