use std::sync::Arc;

use http::header::AUTHORIZATION;

use super::{Middleware, Next};
use crate::error::ApiError;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::IntoResponse;

/// Static shared-secret check on the `Authorization` header.
///
/// The header must equal `Bearer <token>` exactly. Requests to an exempt
/// path (exact match, no prefixes) skip the check. A rejected request never
/// reaches the stages behind this one.
pub struct BearerAuth {
    expected: Arc<str>,
    exempt: Vec<String>,
}

impl BearerAuth {
    pub fn new(token: &str) -> Self {
        Self { expected: format!("Bearer {token}").into(), exempt: Vec::new() }
    }

    /// Let `path` through without a token.
    pub fn exempt(mut self, path: impl Into<String>) -> Self {
        self.exempt.push(path.into());
        self
    }

    fn admits(&self, req: &Request) -> bool {
        if self.exempt.iter().any(|p| p == req.path()) {
            return true;
        }
        req.header(AUTHORIZATION.as_str()) == Some(&*self.expected)
    }
}

impl Middleware for BearerAuth {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        if self.admits(&req) {
            next.run(req)
        } else {
            Box::pin(std::future::ready(ApiError::Unauthorized.into_response()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::method::Method;
    use crate::middleware::test_support::request;
    use crate::response::Response;
    use crate::router::Router;
    use crate::status::Status;

    async fn ok(_req: Request) -> Response {
        Response::text("in")
    }

    fn app() -> Arc<Router> {
        Arc::new(
            Router::new()
                .layer(BearerAuth::new("s3cret").exempt("/"))
                .on(Method::Get, "/", ok)
                .on(Method::Get, "/users/get", ok),
        )
    }

    async fn status(path: &str, auth: Option<&str>) -> Status {
        Next::new(app()).run(request("GET", path, auth)).await.status_code()
    }

    #[tokio::test]
    async fn exact_token_is_admitted() {
        assert_eq!(status("/users/get", Some("Bearer s3cret")).await, Status::Ok);
    }

    #[tokio::test]
    async fn missing_or_wrong_token_is_rejected() {
        assert_eq!(status("/users/get", None).await, Status::Unauthorized);
        assert_eq!(status("/users/get", Some("Bearer nope")).await, Status::Unauthorized);
        assert_eq!(status("/users/get", Some("bearer s3cret")).await, Status::Unauthorized);
        assert_eq!(status("/users/get", Some("Bearer s3cret ")).await, Status::Unauthorized);
    }

    #[tokio::test]
    async fn root_is_exempt_but_only_exactly() {
        assert_eq!(status("/", None).await, Status::Ok);
        assert_eq!(status("/?probe=1", None).await, Status::Ok);
        assert_eq!(status("/users/get/", None).await, Status::Unauthorized);
    }

    #[tokio::test]
    async fn rejection_body_is_the_error_envelope() {
        let res = Next::new(app()).run(request("GET", "/users/get", None)).await;
        assert_eq!(res.body(), br#"{"error":"Unauthorized"}"#);
    }
}
