//! # user-api
//!
//! A small HTTP service that keeps user records in memory and exposes CRUD
//! over them, behind a single static bearer token.
//!
//! ## Layout
//!
//! - HTTP plumbing: radix-tree routing via [`matchit`], hyper 1.x connections
//!   on tokio, graceful shutdown on SIGTERM / Ctrl-C.
//! - [`middleware`]: an explicit, ordered chain of stages around the router.
//! - [`users`]: the record type, validation, the store, and the handlers.
//! - [`app`]: puts it all together.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use user_api::{Config, Server, app};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), user_api::Error> {
//!     let config = Config::default();
//!     Server::bind(config.bind).serve(app(&config)).await
//! }
//! ```
//!
//! ## Surface
//!
//! | Route | Method | Answer |
//! |---|---|---|
//! | `/` | GET | liveness text, no token needed |
//! | `/users/create` | POST | created user, id assigned by the store |
//! | `/users/get` | GET | every user, ascending by id |
//! | `/users/get/{id}` | GET | one user or 404 |
//! | `/users/{id}` | PUT | updated user, 404, or 400 |
//! | `/users/{id}` | DELETE | `{"message": ...}` or 404 |

mod app;
mod config;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod health;
pub mod middleware;
pub mod telemetry;
pub mod users;

pub use app::{app, build};
pub use config::{Config, DEFAULT_TOKEN};
pub use error::{ApiError, Error};
pub use handler::{BoxFuture, Handler};
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response};
pub use router::Router;
pub use server::{App, Server};
pub use status::Status;
