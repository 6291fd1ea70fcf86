use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    /// Missing fields or malformed input
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("user {0} not found")]
    NotFound(String),

    /// Connectivity, write or decode failure in the store
    #[error("Storage error: {0}")]
    Storage(String),

    /// Notification failure; logged by the dispatching task, never returned to callers
    #[error("Publish error: {0}")]
    Publish(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(msg) => AppError::BadRequest(msg),
            e @ UserError::NotFound(_) => AppError::NotFound(e.to_string()),
            UserError::Storage(detail) => AppError::Storage(detail),
            UserError::Publish(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Storage(err.to_string())
    }
}

impl From<redis::RedisError> for UserError {
    fn from(err: redis::RedisError) -> Self {
        UserError::Publish(err.to_string())
    }
}

impl From<validator::ValidationErrors> for UserError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = err.field_errors().into_keys().collect();
        fields.sort_unstable();
        UserError::Validation(format!(
            "user is missing required fields: {}",
            fields.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (UserError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (UserError::NotFound("abc".into()), StatusCode::NOT_FOUND),
            (UserError::Storage("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_not_found_message_names_the_id() {
        let app: AppError = UserError::NotFound("abc".into()).into();
        assert!(matches!(app, AppError::NotFound(ref m) if m == "user abc not found"));
    }
}
