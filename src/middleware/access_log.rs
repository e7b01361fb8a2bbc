use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::info;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::status::Status;

/// One completed request, as seen by [`AccessLog`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessRecord {
    pub method: String,
    pub path: String,
    pub status: u16,
}

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} → {}", self.method, self.path, self.status)
    }
}

/// Where access records go.
pub trait AccessSink: Send + Sync + 'static {
    fn record(&self, entry: &AccessRecord);
}

/// Default sink: an `info` event on the `access` target.
pub struct TracingSink;

impl AccessSink for TracingSink {
    fn record(&self, entry: &AccessRecord) {
        info!(
            target: "access",
            method = %entry.method,
            path = %entry.path,
            status = entry.status,
            "{entry}"
        );
    }
}

/// Records `METHOD PATH → STATUS` once the inner call has finished.
///
/// Register it last so it wraps only the router: requests rejected by an
/// outer stage are never recorded. A panic inside is recorded as 500 and
/// then resumed for an outer [`CatchPanic`](super::CatchPanic) to handle.
pub struct AccessLog {
    sink: Arc<dyn AccessSink>,
}

impl AccessLog {
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }

    pub fn with_sink(sink: impl AccessSink) -> Self {
        Self { sink: Arc::new(sink) }
    }
}

impl Default for AccessLog {
    fn default() -> Self { Self::new() }
}

impl Middleware for AccessLog {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let sink = Arc::clone(&self.sink);
        let method = req.method().to_owned();
        let path = req.path().to_owned();
        let inner = async move { next.run(req).await };

        Box::pin(async move {
            let outcome = AssertUnwindSafe(inner).catch_unwind().await;
            let status = match &outcome {
                Ok(res) => res.status_code(),
                Err(_) => Status::InternalServerError,
            };
            sink.record(&AccessRecord { method, path, status: status.as_u16() });

            match outcome {
                Ok(res) => res,
                Err(payload) => std::panic::resume_unwind(payload),
            }
        })
    }
}
