//! Liveness answer on `/`.
//!
//! Registered ahead of the `/users` routes and exempt from the bearer check,
//! so a load balancer or a curious human can probe it without credentials.

use crate::{Request, Response};

pub const LIVENESS_TEXT: &str = "User Management Api is Running!";

/// Always `200 OK`, `text/plain`. If the process can answer HTTP at all, it
/// is alive; this handler touches no state.
pub async fn liveness(_req: Request) -> Response {
    Response::text(LIVENESS_TEXT)
}
