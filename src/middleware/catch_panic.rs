use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::error;

use super::{Middleware, Next, panic_message};
use crate::error::{INTERNAL_MESSAGE, error_body};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::status::Status;

/// Last-resort net for panics raised anywhere deeper in the chain.
///
/// Register it first so it also covers the other stages. Whatever the inner
/// stages had built is discarded; the client gets
/// `500 {"error":"Internal server error."}`.
pub struct CatchPanic;

impl Middleware for CatchPanic {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let method = req.method().to_owned();
        let path = req.path().to_owned();

        // `run` is deferred into the guarded future: a stage may panic while
        // building its future, not only while it is polled.
        let inner = async move { next.run(req).await };

        Box::pin(async move {
            match AssertUnwindSafe(inner).catch_unwind().await {
                Ok(res) => res,
                Err(payload) => {
                    error!(%method, %path, cause = panic_message(&*payload), "request panicked");
                    error_body(Status::InternalServerError, INTERNAL_MESSAGE)
                }
            }
        })
    }
}
