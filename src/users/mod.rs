//! User records: model, validation, the in-memory store, and the HTTP
//! handlers over it.

pub mod handlers;
mod model;
mod store;

use std::sync::Arc;

pub use model::{User, UserPayload, validate_user};
pub use store::{StoreError, UserStore};

use crate::method::Method;
use crate::router::Router;

/// Registers the `/users` routes and attaches `store` as router state.
pub fn routes(router: Router, store: Arc<UserStore>) -> Router {
    router
        .state(store)
        .on(Method::Post, "/users/create", handlers::create)
        .on(Method::Get, "/users/get", handlers::list)
        .on(Method::Get, "/users/get/{id}", handlers::get)
        .on(Method::Put, "/users/{id}", handlers::update)
        .on(Method::Delete, "/users/{id}", handlers::delete)
}
