use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

// Errors that end a request before or during execution; the message is returned as plain text
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Internal(String),
}

impl ViewError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ViewError::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ViewError::Internal(message.into())
    }
}

impl ResponseError for ViewError {
    fn status_code(&self) -> StatusCode {
        match self {
            ViewError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ViewError::NotFound => StatusCode::NOT_FOUND,
            ViewError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ViewError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}
