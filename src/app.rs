//! Wires the stages, state and routes into one [`Router`].

use std::sync::Arc;

use crate::config::Config;
use crate::health;
use crate::method::Method;
use crate::middleware::{AccessLog, BearerAuth, CatchPanic};
use crate::router::Router;
use crate::users::{self, UserStore};

/// The production service: seeded store, access lines through `tracing`.
pub fn app(config: &Config) -> Router {
    build(config, Arc::new(UserStore::seeded()), AccessLog::new())
}

/// Same wiring with the store and access log supplied by the caller.
///
/// Stage order is fixed: panics are caught outside everything, auth runs
/// before anything is logged or touched, and the access log wraps only the
/// routed handler.
pub fn build(config: &Config, store: Arc<UserStore>, access_log: AccessLog) -> Router {
    let router = Router::new()
        .layer(CatchPanic)
        .layer(BearerAuth::new(&config.token).exempt("/"))
        .layer(access_log)
        .on(Method::Get, "/", health::liveness);

    users::routes(router, store)
}
