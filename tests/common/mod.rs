//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request},
    response::Response,
    Router,
};
use mirror_proxy::{HttpServer, ProxyConfig, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What the mock upstream saw for one request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A local upstream that records every request it receives.
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock upstream on an ephemeral port, answering with `respond`.
pub async fn start_mock_upstream<F>(respond: F) -> MockUpstream
where
    F: Fn(&Recorded) -> Response + Send + Sync + 'static,
{
    let respond = Arc::new(respond);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let respond = respond.clone();
        let log = log.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX)
                .await
                .unwrap_or_default();
            let seen = Recorded {
                method: parts.method,
                uri: parts.uri.to_string(),
                headers: parts.headers,
                body,
            };
            let response = (respond.as_ref())(&seen);
            log.lock().unwrap().push(seen);
            response
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, requests }
}

/// Start an upstream that answers every connection by writing `steps` to the
/// socket verbatim, sleeping before each write.
///
/// Lets tests control exactly when headers and body chunks go out.
pub async fn start_scripted_upstream(steps: Vec<(Duration, &'static [u8])>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let steps = Arc::new(steps);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let steps = steps.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                for (delay, bytes) in steps.iter() {
                    tokio::time::sleep(*delay).await;
                    if socket.write_all(bytes).await.is_err() {
                        return;
                    }
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// A proxy instance serving on an ephemeral port.
pub struct RunningProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy in front of `upstream_base`.
pub async fn start_proxy(upstream_base: &str) -> RunningProxy {
    start_proxy_with(upstream_base, |_| {}).await
}

/// Start the proxy in front of `upstream_base`, adjusting the test defaults first.
pub async fn start_proxy_with(
    upstream_base: &str,
    configure: impl FnOnce(&mut ProxyConfig),
) -> RunningProxy {
    let mut config = ProxyConfig::default();
    config.upstream.base_url = upstream_base.to_string();
    config.timeouts.connect_secs = 2;
    config.timeouts.request_secs = 5;
    configure(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningProxy { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A client that returns redirects instead of following them.
pub fn client_without_redirects() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Gzip `data` the way a compressing upstream would.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    use std::io::Write;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
