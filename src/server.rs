//! HTTP server and graceful shutdown.
//!
//! On shutdown the server:
//! 1. stops calling `listener.accept()`, so no new connections are made;
//! 2. tells every open connection to close after its current request, idle
//!    keep-alive connections included, and waits for them;
//! 3. returns from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::{ApiError, Error};
use crate::middleware::Next;
use crate::request::Request;
use crate::response::IntoResponse;
use crate::router::Router;

// ── App ───────────────────────────────────────────────────────────────────────

/// A finished [`Router`], shareable across connections.
///
/// [`App::handle`] runs one request through the whole chain without a socket,
/// which is also how the integration tests drive the service.
#[derive(Clone)]
pub struct App(Arc<Router>);

impl App {
    pub fn new(router: Router) -> Self {
        Self(Arc::new(router))
    }

    /// Reads the body, attaches router state, and runs every stage then the
    /// matched handler.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body,
        B::Error: fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(path = %parts.uri.path(), "unreadable request body: {e}");
                return ApiError::validation("unreadable request body")
                    .into_response()
                    .into_inner();
            }
        };

        let mut req = Request::new(parts, body);
        req.extensions.extend(self.0.state.clone());

        Next::new(Arc::clone(&self.0)).run(req).await.into_inner()
    }
}

// ── Server ────────────────────────────────────────────────────────────────────

enum Bind {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// The HTTP server.
pub struct Server {
    bind: Bind,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { bind: Bind::Addr(addr) }
    }

    /// Serves on an already-bound listener, e.g. one on port 0.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { bind: Bind::Listener(listener) }
    }

    /// Serves until SIGTERM or Ctrl-C, then drains in-flight connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves until `signal` resolves, then drains in-flight connections.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()> + Send,
    ) -> Result<(), Error> {
        let listener = match self.bind {
            Bind::Addr(addr) => TcpListener::bind(addr).await?,
            Bind::Listener(listener) => listener,
        };
        let app = App::new(router);

        info!(addr = %listener.local_addr()?, "user-api listening");

        let mut tasks = tokio::task::JoinSet::new();
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Shutdown is checked first so it wins over a queued accept.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    let _ = stop_tx.send(true);
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    tasks.spawn(serve_connection(
                        TokioIo::new(stream),
                        remote_addr,
                        app.clone(),
                        stop_rx.clone(),
                    ));
                }

                // Reap finished connection tasks so the set stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("user-api stopped");
        Ok(())
    }
}

/// Serves one connection until the client closes it or `stop` flips. On
/// stop, hyper finishes the request in flight and then closes the
/// connection, so idle keep-alive clients cannot hold shutdown open.
async fn serve_connection(
    io: TokioIo<TcpStream>,
    remote_addr: SocketAddr,
    app: App,
    mut stop: watch::Receiver<bool>,
) {
    // Called once per request on the connection.
    let svc = service_fn(move |req| {
        let app = app.clone();
        async move { Ok::<_, Infallible>(app.handle(req).await) }
    });

    let builder = ConnBuilder::new(TokioExecutor::new());
    let conn = builder.serve_connection(io, svc);
    tokio::pin!(conn);

    let result = tokio::select! {
        res = conn.as_mut() => res,
        _ = stop.changed() => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };

    if let Err(e) = result {
        error!(peer = %remote_addr, "connection error: {e}");
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or Ctrl-C. If a handler cannot be installed
/// that arm never resolves; the other still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => { s.recv().await; }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
