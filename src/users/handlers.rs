//! `/users/...` route handlers.
//!
//! Each one maps a request onto a single store call and returns
//! `Result<_, ApiError>`; the error kind decides the status.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::ApiError;
use crate::request::Request;
use crate::response::Json;

use super::model::{User, payload};
use super::store::UserStore;

fn store(req: &Request) -> Result<Arc<UserStore>, ApiError> {
    req.state::<Arc<UserStore>>()
        .cloned()
        .ok_or_else(|| ApiError::internal("user store is not attached to the router"))
}

/// `POST /users/create`
pub async fn create(req: Request) -> Result<Json<User>, ApiError> {
    let store = store(&req)?;
    let candidate = payload(&req)?;
    Ok(Json(store.create(candidate)?))
}

/// `GET /users/get`
pub async fn list(req: Request) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(store(&req)?.list()?))
}

/// `GET /users/get/{id}`. A non-integer id is a bad request here.
pub async fn get(req: Request) -> Result<Json<User>, ApiError> {
    let store = store(&req)?;
    let id = req
        .param_as::<i32>("id")
        .ok_or_else(|| ApiError::validation("id must be an integer"))?;
    store.find(id)?.map(Json).ok_or(ApiError::NotFound)
}

/// `PUT /users/{id}`. The path id wins over anything in the body; a
/// non-integer id is a 404 before the body is looked at.
pub async fn update(req: Request) -> Result<Json<User>, ApiError> {
    let store = store(&req)?;
    let id = req.param_as::<i32>("id").ok_or(ApiError::NotFound)?;
    let candidate = payload(&req)?;
    store.update(id, candidate)?.map(Json).ok_or(ApiError::NotFound)
}

/// `DELETE /users/{id}`
pub async fn delete(req: Request) -> Result<Json<Value>, ApiError> {
    let store = store(&req)?;
    let id = req.param_as::<i32>("id").ok_or(ApiError::NotFound)?;
    if !store.delete(id)? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(json!({ "message": format!("User with ID {id} has been deleted") })))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http_body_util::{BodyExt, Full};

    use super::*;
    use crate::router::Router;
    use crate::server::App;
    use crate::users::routes;

    async fn send(store: UserStore, method: &str, path: &str, body: &str) -> (u16, Bytes) {
        let app = App::new(routes(Router::new(), Arc::new(store)));
        let req = http::Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from(body.to_owned())))
            .unwrap();
        let res = app.handle(req).await;
        let status = res.status().as_u16();
        (status, res.into_body().collect().await.unwrap().to_bytes())
    }

    #[tokio::test]
    async fn poisoned_store_is_a_500_without_detail() {
        for (method, path, body) in [
            ("GET", "/users/get", ""),
            ("GET", "/users/get/1", ""),
            ("POST", "/users/create", r#"{"userName":"Zed","age":20}"#),
            ("DELETE", "/users/1", ""),
        ] {
            let (status, bytes) = send(UserStore::poisoned(), method, path, body).await;
            assert_eq!(status, 500, "{method} {path}");
            assert_eq!(&bytes[..], br#"{"error":"Internal server error."}"#);
        }
    }

    #[tokio::test]
    async fn put_with_non_integer_id_is_404_even_with_a_bad_body() {
        let (status, bytes) = send(UserStore::seeded(), "PUT", "/users/abc", r#"{"age":0}"#).await;
        assert_eq!(status, 404);
        assert!(bytes.is_empty());

        let (status, _) = send(UserStore::seeded(), "PUT", "/users/1", r#"{"age":0}"#).await;
        assert_eq!(status, 400);
    }
}
