//! Request Log Module
//!
//! Append-only access log file, written by a middleware after every request
//! and served back by `GET /log`.

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header::USER_AGENT,
    middleware::Next,
    response::Response,
};
use chrono::Local;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// Prefix of every line in the log file.
const LINE_PREFIX: &str = "http:";

// == Request Log ==
/// Handle to the request log file.
///
/// Writes are serialized through an async mutex so lines never interleave.
#[derive(Debug)]
pub struct RequestLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl RequestLog {
    // == Open ==
    /// Opens `path` for appending, creating it if needed.
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Append ==
    /// Writes one timestamped line.
    pub async fn append(&self, message: &str) -> io::Result<()> {
        let line = format_line(&Local::now().format("%Y/%m/%d %H:%M:%S").to_string(), message);
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    // == Read All ==
    /// Returns the whole file as text.
    pub async fn read_all(&self) -> io::Result<String> {
        fs::read_to_string(&self.path).await
    }
}

fn format_line(timestamp: &str, message: &str) -> String {
    format!("{} {} {}\n", LINE_PREFIX, timestamp, message)
}

// == Middleware ==
/// Records `METHOD PATH REMOTE_ADDR USER_AGENT` once the inner handler has
/// produced its response.
///
/// The remote address comes from `ConnectInfo` and is `-` when the router is
/// served without it.
pub async fn log_requests(
    State(log): State<Arc<RequestLog>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(request).await;

    let message = format!("{} {} {} {}", method, path, remote, user_agent);
    if let Err(err) = log.append(&message).await {
        warn!(%err, path = %log.path().display(), "failed to write request log");
    }

    response
}
