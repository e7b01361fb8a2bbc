//! Radix-tree request router with an ordered middleware chain.
//!
//! One tree per HTTP method, O(path-length) lookup. Middleware stages wrap the
//! whole routing step, in the order they were registered.

use std::collections::HashMap;
use std::sync::Arc;

use http::Extensions;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve)
/// or [`App::new`](crate::App::new). Every builder method returns `self`.
///
/// ```rust,no_run
/// # use user_api::{Method, Request, Response, Router};
/// # use user_api::middleware::{AccessLog, CatchPanic};
/// # async fn root(_: Request) -> Response { Response::text("") }
/// Router::new()
///     .layer(CatchPanic)        // outermost
///     .layer(AccessLog::new())  // innermost, wraps the handler
///     .on(Method::Get, "/", root);
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    pub(crate) stages: Vec<Arc<dyn Middleware>>,
    pub(crate) state: Extensions,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), stages: Vec::new(), state: Extensions::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    /// Append a middleware stage. The first stage registered is the outermost:
    /// it sees the request first and the response last.
    pub fn layer(mut self, stage: impl Middleware) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Attach shared state. Every request carries a clone, readable through
    /// [`Request::state`].
    pub fn state<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.state.insert(value);
        self
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Whether any method has a route for `path`.
    fn knows_path(&self, path: &str) -> bool {
        self.routes.values().any(|tree| tree.at(path).is_ok())
    }

    /// Innermost step of the chain: pick the handler and run it.
    ///
    /// Unknown path → 404. Known path under another method, or a method
    /// outside RFC 9110 → 405.
    pub(crate) fn route(&self, mut req: Request) -> BoxFuture {
        let method = Method::try_from(&req.method).ok();
        let found = method.and_then(|m| self.lookup(m, req.path()));

        match found {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req)
            }
            None if method.is_none() || self.knows_path(req.path()) => {
                ready(Response::status(Status::MethodNotAllowed))
            }
            None => ready(Response::status(Status::NotFound)),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn ready(res: Response) -> BoxFuture {
    Box::pin(std::future::ready(res))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    async fn echo_id(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or("none").to_owned())
    }

    fn request(method: http::Method, path: &str) -> Request {
        let (parts, ()) = http::Request::builder()
            .method(method)
            .uri(path)
            .body(())
            .unwrap()
            .into_parts();
        Request::new(parts, Bytes::new())
    }

    fn router() -> Router {
        Router::new()
            .on(Method::Get, "/users/get/{id}", echo_id)
            .on(Method::Delete, "/users/{id}", echo_id)
    }

    #[test]
    fn lookup_extracts_params() {
        let (_, params) = router().lookup(Method::Get, "/users/get/7").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("7"));
        assert!(router().lookup(Method::Post, "/users/get/7").is_none());
    }

    #[tokio::test]
    async fn route_dispatches_to_handler() {
        let res = router().route(request(http::Method::DELETE, "/users/9")).await;
        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(res.body(), b"9");
    }

    #[tokio::test]
    async fn unknown_path_is_404_and_wrong_method_is_405() {
        let r = router();
        let res = r.route(request(http::Method::GET, "/nope")).await;
        assert_eq!(res.status_code(), Status::NotFound);

        let res = r.route(request(http::Method::PUT, "/users/get/1")).await;
        assert_eq!(res.status_code(), Status::MethodNotAllowed);

        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        let res = r.route(request(purge, "/users/1")).await;
        assert_eq!(res.status_code(), Status::MethodNotAllowed);
    }
}
