//! Middleware layer.
//!
//! A stage sees every request before the router does and every response after
//! it. Stages are kept in a plain ordered list on the [`Router`]; each one
//! receives a [`Next`] and decides whether, and how, to continue:
//!
//! ```text
//! CatchPanic ── BearerAuth ── AccessLog ── router ── handler
//!   outermost                  innermost
//! ```
//!
//! Built-in stages:
//! - [`CatchPanic`]: turns a panic anywhere inside into a 500
//! - [`BearerAuth`]: rejects requests without the shared bearer token
//! - [`AccessLog`]: one `METHOD PATH → STATUS` record per request

mod access_log;
mod auth;
mod catch_panic;

use std::any::Any;
use std::sync::Arc;

pub use access_log::{AccessLog, AccessRecord, AccessSink, TracingSink};
pub use auth::BearerAuth;
pub use catch_panic::CatchPanic;

use crate::handler::BoxFuture;
use crate::request::Request;
use crate::router::Router;

/// One interceptor in the chain.
///
/// The returned future must be `'static`, so anything borrowed from `self`
/// has to be cloned into it.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// The rest of the chain after the current stage.
///
/// Consumed by [`Next::run`]; a stage that never calls it short-circuits
/// everything behind it, router included.
pub struct Next {
    app: Arc<Router>,
    index: usize,
}

impl Next {
    pub(crate) fn new(app: Arc<Router>) -> Self {
        Self { app, index: 0 }
    }

    pub fn run(self, req: Request) -> BoxFuture {
        match self.app.stages.get(self.index).cloned() {
            Some(stage) => {
                let next = Self { app: Arc::clone(&self.app), index: self.index + 1 };
                stage.call(req, next)
            }
            None => self.app.route(req),
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use bytes::Bytes;

    use crate::request::Request;

    pub fn request(method: &str, path: &str, auth: Option<&str>) -> Request {
        let mut builder = http::Request::builder().method(method).uri(path);
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        Request::new(parts, Bytes::new())
    }
}
