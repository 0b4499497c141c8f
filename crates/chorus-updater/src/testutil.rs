//! Minimal HTTP/1.1 server for exercising network edge cases in tests.
//!
//! Serves a scripted sequence of canned responses on a loopback listener,
//! one connection at a time, counting requests. No mock-HTTP crate is
//! needed for the handful of shapes the updater cares about.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One scripted response.
#[derive(Debug, Clone)]
pub enum Canned {
    /// 200 with a correct `Content-Length`.
    Ok(Vec<u8>),
    /// Arbitrary status with an empty body.
    Status(u16),
    /// 302 to the given path on the same server.
    Redirect(String),
    /// 200 advertising `advertised` bytes but closing after `sent`.
    Truncated {
        /// Advertised `Content-Length`.
        advertised: usize,
        /// Bytes actually written before the connection closes.
        sent: Vec<u8>,
    },
    /// 200 with no `Content-Length`; body delimited by connection close.
    NoLength(Vec<u8>),
    /// Accept the connection, then never respond.
    Hang,
}

/// A scripted loopback HTTP server.
pub struct TestServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Start a server answering requests with `script`, in order. Requests
    /// beyond the script get a 500.
    pub async fn start(script: Vec<Canned>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let hit_counter = Arc::clone(&hits);
        tokio::spawn(async move {
            let mut script = script.into_iter();
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };

                // Read until the end of the request headers.
                let mut buf = Vec::new();
                let mut byte = [0u8; 1];
                while !buf.ends_with(b"\r\n\r\n") {
                    match stream.read(&mut byte).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => buf.push(byte[0]),
                    }
                }
                hit_counter.fetch_add(1, Ordering::SeqCst);

                let response = script.next().unwrap_or(Canned::Status(500));
                match response {
                    Canned::Ok(body) => {
                        let head = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            body.len()
                        );
                        let _ = stream.write_all(head.as_bytes()).await;
                        let _ = stream.write_all(&body).await;
                    }
                    Canned::Status(code) => {
                        let head = format!(
                            "HTTP/1.1 {code} X\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        );
                        let _ = stream.write_all(head.as_bytes()).await;
                    }
                    Canned::Redirect(path) => {
                        let head = format!(
                            "HTTP/1.1 302 Found\r\nLocation: http://{addr}{path}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        );
                        let _ = stream.write_all(head.as_bytes()).await;
                    }
                    Canned::Truncated { advertised, sent } => {
                        let head = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {advertised}\r\nConnection: close\r\n\r\n"
                        );
                        let _ = stream.write_all(head.as_bytes()).await;
                        let _ = stream.write_all(&sent).await;
                        let _ = stream.flush().await;
                        // Drop closes the socket mid-body.
                    }
                    Canned::NoLength(body) => {
                        let head = "HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n";
                        let _ = stream.write_all(head.as_bytes()).await;
                        let _ = stream.write_all(&body).await;
                    }
                    Canned::Hang => {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    }
                }
                let _ = stream.shutdown().await;
            }
        });

        Self { addr, hits }
    }

    /// URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
