//! User record, request payload, and the validation rules applied to both
//! create and update.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request::Request;

pub(crate) const NULL_PAYLOAD: &str = "User cannot be null";
pub(crate) const INVALID_USER: &str = "Username cannot be empty and age must be greater than 0";

/// A stored user. Serialized as `{"id":1,"userName":"John","age":30}`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub user_name: String,
    pub age: i32,
}

impl User {
    pub fn new(id: i32, user_name: impl Into<String>, age: i32) -> Self {
        Self { id, user_name: user_name.into(), age }
    }
}

/// Body of a create or update request. A client-sent `id` falls under serde's
/// unknown-field rule and is dropped: the store, or the path, decides it.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub user_name: String,
    pub age: i32,
}

impl UserPayload {
    pub fn new(user_name: impl Into<String>, age: i32) -> Self {
        Self { user_name: user_name.into(), age }
    }
}

/// Rejects a blank (after trimming) name or a non-positive age.
pub fn validate_user(candidate: &UserPayload) -> Result<(), ApiError> {
    if candidate.user_name.trim().is_empty() || candidate.age <= 0 {
        return Err(ApiError::validation(INVALID_USER));
    }
    Ok(())
}

/// Parses and validates the request body. An empty body and JSON `null` are
/// both a missing payload.
pub(crate) fn payload(req: &Request) -> Result<UserPayload, ApiError> {
    let candidate = if req.body().is_empty() {
        None
    } else {
        req.json::<Option<UserPayload>>()?
    };
    let candidate = candidate.ok_or_else(|| ApiError::validation(NULL_PAYLOAD))?;
    validate_user(&candidate)?;
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(name: &str, age: i32) -> bool {
        matches!(validate_user(&UserPayload::new(name, age)), Err(ApiError::Validation(_)))
    }

    #[test]
    fn accepts_named_adult() {
        assert!(validate_user(&UserPayload::new("  Zed ", 1)).is_ok());
    }

    #[test]
    fn rejects_blank_names_and_non_positive_ages() {
        assert!(rejected("", 20));
        assert!(rejected(" \t\n", 20));
        assert!(rejected("Zed", 0));
        assert!(rejected("Zed", -3));
    }

    #[test]
    fn payload_ignores_client_id_and_uses_camel_case() {
        let p: UserPayload =
            serde_json::from_str(r#"{"id":99,"userName":"Ann","age":5}"#).unwrap();
        assert_eq!(p.user_name, "Ann");
        assert_eq!(p.age, 5);

        let user = serde_json::to_value(User::new(1, "John", 30)).unwrap();
        assert_eq!(user, serde_json::json!({"id": 1, "userName": "John", "age": 30}));
    }
}
