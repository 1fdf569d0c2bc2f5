//! ServerLease: a temp page served over loopback HTTP for a fixed lifetime.
//!
//! The listening socket is bound before `start` returns, so bind failures
//! reach the caller. Everything after that belongs to a detached worker
//! thread running a current-thread tokio runtime with an axum router. When
//! the lifetime elapses (or `cancel` is called) the worker drops the server,
//! whether or not a browser is still connected, and deletes the file.
//!
//! Dropping the lease does not stop the worker.

use std::future::IntoFuture;
use std::net::{Ipv4Addr, TcpListener};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use axum::extract::{Path as UrlPath, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use p5magic_core::{MagicError, Result};
use tokio::sync::oneshot;

/// Longest lifetime a lease accepts; longer requests are clamped.
pub const MAX_LEASE_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug)]
struct ServedFile {
    path: PathBuf,
    name: String,
}

#[derive(Debug)]
pub struct ServerLease {
    file_path: PathBuf,
    file_name: String,
    port: u16,
    expires_at: Instant,
    expires_at_utc: DateTime<Utc>,
    cancel: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ServerLease {
    /// Bind `127.0.0.1:port` and serve `file_path` at `/<file name>` until
    /// `lifetime` elapses (at most [`MAX_LEASE_LIFETIME`]).
    pub fn start(file_path: PathBuf, port: u16, lifetime: Duration) -> Result<Self> {
        if lifetime > MAX_LEASE_LIFETIME {
            tracing::warn!(
                requested_secs = lifetime.as_secs(),
                max_secs = MAX_LEASE_LIFETIME.as_secs(),
                "Clamping lease lifetime"
            );
        }
        let lifetime = lifetime.min(MAX_LEASE_LIFETIME);
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                MagicError::invalid("file", format!("{} has no file name", file_path.display()))
            })?;

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))?;
        listener.set_nonblocking(true)?;

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let served = ServedFile {
            path: file_path.clone(),
            name: file_name.clone(),
        };
        let worker = std::thread::Builder::new()
            .name(format!("p5magic-lease-{}", port))
            .spawn(move || run_worker(listener, served, lifetime, cancel_rx))?;

        let expires_at_utc = Utc::now()
            + chrono::Duration::from_std(lifetime).unwrap_or_else(|_| chrono::Duration::zero());
        tracing::info!(
            port,
            file = %file_path.display(),
            expires_at = %expires_at_utc.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "Serving sketch"
        );

        Ok(Self {
            file_path,
            file_name,
            port,
            expires_at: Instant::now() + lifetime,
            expires_at_utc,
            cancel: Some(cancel_tx),
            worker: Some(worker),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at_utc
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Stop serving now; the worker still deletes the file.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }

    /// Block until the worker has stopped and cleaned up.
    pub fn wait(mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!(port = self.port, "Lease worker panicked");
            }
        }
    }
}

fn run_worker(
    listener: TcpListener,
    served: ServedFile,
    lifetime: Duration,
    cancel_rx: oneshot::Receiver<()>,
) {
    let path = served.path.clone();
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt.block_on(serve_until(listener, served, lifetime, cancel_rx)),
        Err(e) => tracing::error!(error = %e, "Failed to create lease runtime"),
    }
    remove_served_file(&path);
}

async fn serve_until(
    listener: TcpListener,
    served: ServedFile,
    lifetime: Duration,
    cancel_rx: oneshot::Receiver<()>,
) {
    let listener = match tokio::net::TcpListener::from_std(listener) {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, "Failed to adopt lease listener");
            return;
        }
    };
    let port = listener.local_addr().map(|a| a.port()).unwrap_or_default();
    let server = axum::serve(listener, router(Arc::new(served))).into_future();

    // A dropped sender means the lease was let go, not cancelled.
    let cancelled = async {
        if cancel_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        res = server => {
            if let Err(e) = res {
                tracing::warn!(port, error = %e, "Lease server stopped");
            }
        }
        _ = tokio::time::sleep(lifetime) => {
            tracing::info!(port, "Lease expired");
        }
        _ = cancelled => {
            tracing::info!(port, "Lease cancelled");
        }
    }
}

fn router(served: Arc<ServedFile>) -> Router {
    Router::new()
        .route("/", get(redirect_to_file))
        .route("/:name", get(serve_file))
        .with_state(served)
}

async fn redirect_to_file(State(served): State<Arc<ServedFile>>) -> Redirect {
    Redirect::temporary(&format!("/{}", served.name))
}

async fn serve_file(
    State(served): State<Arc<ServedFile>>,
    UrlPath(name): UrlPath<String>,
) -> Response {
    if name != served.name {
        return (StatusCode::NOT_FOUND, "404 Not Found").into_response();
    }
    match tokio::fs::read(&served.path).await {
        Ok(content) => (
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                (
                    header::CACHE_CONTROL,
                    "no-store, no-cache, must-revalidate, max-age=0",
                ),
            ],
            content,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(file = %served.path.display(), error = %e, "Failed to read served file");
            (StatusCode::NOT_FOUND, "404 Not Found").into_response()
        }
    }
}

fn remove_served_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(file = %path.display(), "Removed served file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(file = %path.display(), error = %e, "Failed to remove served file"),
    }
}
