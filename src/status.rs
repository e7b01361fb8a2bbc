//! HTTP status codes as a typed enum.
//!
//! Only the codes this service actually answers with. Use [`Status`] anywhere
//! a status is accepted: `Response::status()`, `Response::builder().status()`,
//! or as a bare handler return value.
//!
//! ```rust
//! use user_api::{Response, Status};
//!
//! Response::status(Status::NotFound);
//!
//! Response::builder()
//!     .status(Status::BadRequest)
//!     .json(br#"{"error":"bad"}"#.to_vec());
//! ```

/// Status codes produced by the router, the middleware stages and the handlers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    Unauthorized,        // 401
    NotFound,            // 404
    MethodNotAllowed,    // 405

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
}

impl Status {
    pub fn as_u16(self) -> u16 {
        self.into()
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::BadRequest          => 400,
            Status::Unauthorized        => 401,
            Status::NotFound            => 404,
            Status::MethodNotAllowed    => 405,
            Status::InternalServerError => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        match s {
            Status::Ok                  => Self::OK,
            Status::BadRequest          => Self::BAD_REQUEST,
            Status::Unauthorized        => Self::UNAUTHORIZED,
            Status::NotFound            => Self::NOT_FOUND,
            Status::MethodNotAllowed    => Self::METHOD_NOT_ALLOWED,
            Status::InternalServerError => Self::INTERNAL_SERVER_ERROR,
        }
    }
}
