use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use wither::WitherError;
use wither::bson;
use wither::mongodb::error::Error as MongoError;

#[derive(thiserror::Error, Debug)]
#[error("...")]
pub enum Error {
    #[error("{0}")]
    Wither(#[from] WitherError),

    #[error("{0}")]
    Mongo(#[from] MongoError),

    #[error("Error parsing ObjectID {0}")]
    ParseObjectID(String),

    #[error("{0}")]
    SerializeMongoResponse(#[from] bson::de::Error),

    #[error("{0}")]
    BadRequest(#[from] BadRequest),

    #[error("{0}")]
    NotFound(#[from] NotFound),

    #[error("{0}")]
    Internal(#[from] Internal),

    #[error("{0}")]
    Unauthorized(#[from] Unauthorized),

    #[error("{0}")]
    Forbidden(#[from] Forbidden),

    #[error("{0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl Error {
    fn get_codes(&self) -> (StatusCode, u16) {
        match *self {
            // 4XX Errors
            Error::ParseObjectID(_) => (StatusCode::BAD_REQUEST, 40001),
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, 40002),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, 40003),
            Error::Unauthorized(_) => (StatusCode::UNAUTHORIZED, 40003),
            Error::Forbidden(_) => (StatusCode::FORBIDDEN, 40003),

            // 5XX Errors
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, 5000),
            Error::Wither(_) => (StatusCode::INTERNAL_SERVER_ERROR, 5002),
            Error::Mongo(_) => (StatusCode::INTERNAL_SERVER_ERROR, 5003),
            Error::SerializeMongoResponse(_) => (StatusCode::INTERNAL_SERVER_ERROR, 5004),

            Error::Reqwest(_) => (StatusCode::INTERNAL_SERVER_ERROR, 6002),
            Error::SerdeJsonError(_) => (StatusCode::INTERNAL_SERVER_ERROR, 6003),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Error::BadRequest(BadRequest {
            message: message.to_string(),
        })
    }

    pub fn not_found(message: &str) -> Self {
        Error::NotFound(NotFound {
            message: message.to_string(),
        })
    }

    pub fn internal_err(message: &str) -> Self {
        Error::Internal(Internal {
            message: message.to_string(),
        })
    }

    pub fn unauthorized(message: &str) -> Self {
        Error::Unauthorized(Unauthorized {
            message: message.to_string(),
        })
    }

    pub fn forbidden(message: &str) -> Self {
        Error::Forbidden(Forbidden {
            message: message.to_string(),
        })
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("{self:?}");

        let (status_code, code) = self.get_codes();
        let message = self.to_string();
        let body = Json(json!({ "code": code, "message": message }));

        (status_code, body).into_response()
    }
}

#[derive(thiserror::Error, Debug)]
#[error("Bad Request: {message}")]
pub struct BadRequest {
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
#[error("Not found: {message}")]
pub struct NotFound {
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
#[error("Internal error: {message}")]
pub struct Internal {
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
#[error("Unauthorized error: {message}")]
pub struct Unauthorized {
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
#[error("Forbidden error: {message}")]
pub struct Forbidden {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_unauthorized_and_forbidden() {
        let (status, code) = Error::unauthorized("Invalid jwt token").get_codes();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, 40003);

        let (status, _) = Error::forbidden("Admin role required").get_codes();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn ownership_misses_surface_as_not_found() {
        let (status, code) = Error::not_found("Notification not found").get_codes();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, 40003);
    }
}
