//! End-to-end tests: boot the server on an ephemeral port and talk raw
//! HTTP/1.1 to it.

use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use flate2::read::GzDecoder;
use gzserve::config::{AppState, Config};
use gzserve::server::{self, SignalHandler};
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

    fn gunzip(&self) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(&self.body[..]).read_to_end(&mut out).unwrap();
        out
    }
}

struct TestServer {
    addr: SocketAddr,
    root: PathBuf,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(tag: &str, files: &[(&str, &[u8])]) -> Self {
        Self::start_with(tag, files, |_| {}).await
    }

    async fn start_with(
        tag: &str,
        files: &[(&str, &[u8])],
        tweak: impl FnOnce(&mut Config),
    ) -> Self {
        let root = std::env::temp_dir().join(format!("gzserve-it-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        for (rel, contents) in files {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }
        std::fs::create_dir_all(root.join("assets.js")).unwrap();

        let missing = std::env::temp_dir().join("gzserve-it-no-config");
        let mut config = Config::load_from(
            &missing.display().to_string(),
            Some("0"),
            Some(&root.display().to_string()),
        )
        .unwrap();
        config.server.host = "127.0.0.1".to_string();
        config.logging.access_log = false;
        tweak(&mut config);

        let listener = server::create_reusable_listener(config.get_socket_addr().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(config));
        let signals = Arc::new(SignalHandler::new());
        let task = tokio::spawn(server::start_server_loop(
            listener,
            Arc::clone(&state),
            Arc::clone(&signals),
        ));

        Self {
            addr,
            root,
            state,
            signals,
            task,
        }
    }

    async fn get(&self, path: &str, extra_headers: &[(&str, &str)]) -> RawResponse {
        self.request("GET", path, extra_headers).await
    }

    async fn request(&self, method: &str, path: &str, extra_headers: &[(&str, &str)]) -> RawResponse {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        let mut request =
            format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
        for (name, value) in extra_headers {
            request.push_str(&format!("{name}: {value}\r\n"));
        }
        request.push_str("\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
            .await
            .expect("response timed out")
            .unwrap();
        parse_response(&raw)
    }

    /// Wait until the server counts `n` open connections
    async fn wait_for_connections(&self, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.state.active_connections.load(Ordering::SeqCst) != n {
            assert!(Instant::now() < deadline, "server never reached {n} connections");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    async fn stop(self) {
        self.signals.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("server loop did not stop")
            .unwrap();
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn parse_response(raw: &[u8]) -> RawResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header terminator");
    let head = std::str::from_utf8(&raw[..split]).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap();
    let status = status_line.split(' ').nth(1).unwrap().parse().unwrap();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    RawResponse {
        status,
        headers,
        body: raw[split + 4..].to_vec(),
    }
}

#[tokio::test]
async fn serves_gzip_files_over_http() {
    let index = b"<!doctype html><div id=app></div>".repeat(40);
    let wasm = vec![0u8, 0x61, 0x73, 0x6d, 1, 0, 0, 0];
    let server = TestServer::start(
        "files",
        &[
            ("index.html", &index[..]),
            ("pkg/app.wasm", &wasm[..]),
            ("robots.txt", &b"User-agent: *"[..]),
        ],
    )
    .await;

    let res = server.get("/pkg/app.wasm", &[]).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("content-encoding"), Some("gzip"));
    assert_eq!(res.header("content-type"), Some("application/wasm"));
    assert_eq!(res.header("content-length"), Some(res.body.len().to_string().as_str()));
    assert_eq!(res.gunzip(), wasm);

    let res = server.get("/robots.txt", &[]).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("content-type"), None);
    assert_eq!(res.gunzip(), b"User-agent: *");

    let res = server
        .get("/settings/profile", &[("Accept", "text/html,application/xhtml+xml")])
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(res.gunzip(), index);

    server.stop().await;
}

#[tokio::test]
async fn returns_not_found_over_http() {
    let server = TestServer::start("missing", &[("index.html", &b"<p>hi</p>"[..])]).await;

    for (path, headers) in [
        ("/nope.css", &[][..]),
        ("/assets.js", &[][..]),
        ("/api/data", &[("Accept", "application/json")][..]),
        ("/", &[][..]),
    ] {
        let res = server.get(path, headers).await;
        assert_eq!(res.status, 404, "{path}");
        assert_eq!(res.body, b"Not Found", "{path}");
        assert_eq!(res.header("content-encoding"), None);
    }

    server.stop().await;
}

async fn read_all(stream: &mut TcpStream) -> Vec<u8> {
    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("response timed out")
        .unwrap();
    raw
}

#[tokio::test]
async fn head_request_gets_gzip_headers_without_body() {
    let script = b"let x = 1;\n".repeat(20);
    let server = TestServer::start("head", &[("app.js", &script[..])]).await;

    let get = server.get("/app.js", &[]).await;
    let head = server.request("HEAD", "/app.js", &[]).await;

    assert_eq!(head.status, 200);
    assert_eq!(head.header("content-encoding"), Some("gzip"));
    assert_eq!(
        head.header("content-type"),
        Some("application/javascript; charset=utf-8")
    );
    assert_eq!(head.header("content-length"), get.header("content-length"));
    assert!(head.body.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn excess_connections_are_dropped() {
    let server = TestServer::start_with("limit", &[("a.css", &b"a{}"[..])], |config| {
        config.performance.max_connections = Some(1);
    })
    .await;

    // hold the only slot with an unfinished request
    let mut first = TcpStream::connect(server.addr).await.unwrap();
    first.write_all(b"GET /a.css HTTP/1.1\r\nHost: localhost\r\n").await.unwrap();
    server.wait_for_connections(1).await;

    let mut second = TcpStream::connect(server.addr).await.unwrap();
    let _ = second
        .write_all(b"GET /a.css HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await;
    let mut raw = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), second.read_to_end(&mut raw))
        .await
        .expect("rejected connection should be closed");
    assert!(read.is_err() || raw.is_empty(), "got a response: {raw:?}");
    assert_eq!(server.state.active_connections.load(Ordering::SeqCst), 1);

    // the held connection is still served
    first.write_all(b"Connection: close\r\n\r\n").await.unwrap();
    let res = parse_response(&read_all(&mut first).await);
    assert_eq!(res.status, 200);

    server.stop().await;
}

#[tokio::test]
async fn idle_connection_is_closed_after_timeout() {
    let server = TestServer::start_with("timeout", &[], |config| {
        config.performance.read_timeout = 1;
        config.performance.write_timeout = 1;
    })
    .await;

    let started = Instant::now();
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    server.wait_for_connections(1).await;

    let mut raw = Vec::new();
    let _ = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("idle connection was never closed");
    assert!(raw.is_empty());
    assert!(started.elapsed() >= Duration::from_millis(900));
    server.wait_for_connections(0).await;

    server.stop().await;
}

#[tokio::test]
async fn shutdown_lets_in_flight_request_finish() {
    let page = b"<p>still here</p>".repeat(10);
    let server = TestServer::start("drain", &[("page.html", &page[..])]).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /page.html HTTP/1.1\r\nHost: localhost\r\n")
        .await
        .unwrap();
    server.wait_for_connections(1).await;

    server.signals.trigger();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(
        !server.task.is_finished(),
        "server loop returned while a request was in flight"
    );

    // new connections are refused once the listener is gone
    assert!(TcpStream::connect(server.addr).await.is_err());

    stream.write_all(b"Connection: close\r\n\r\n").await.unwrap();
    let res = parse_response(&read_all(&mut stream).await);
    assert_eq!(res.status, 200);
    assert_eq!(res.gunzip(), page);

    tokio::time::timeout(Duration::from_secs(5), server.task)
        .await
        .expect("server loop did not finish after draining")
        .unwrap();
    let _ = std::fs::remove_dir_all(&server.root);
}
