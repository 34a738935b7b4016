use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{error::ResponseError, HttpResponse};
use derive_more::Display;

use crate::models::FieldError;
use crate::registry::InsertError;

#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "Invalid {}: {}", field, message)]
    Validation {
        field: &'static str,
        message: String,
    },
    #[display(fmt = "email is already registered")]
    EmailAlreadyExist,
    #[display(fmt = "Internal Server Error")]
    InternalServerError,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    errors: Vec<String>,
}

impl ErrorResponse {
    pub fn new(errors: Vec<String>) -> Self {
        ErrorResponse { errors }
    }
}

impl ApiError {
    /// The `{field, message}` body for rejections that name a field.
    fn field_error(&self) -> Option<FieldError> {
        match self {
            ApiError::Validation { field, message } => Some(FieldError {
                field: (*field).to_string(),
                message: message.clone(),
            }),
            ApiError::EmailAlreadyExist => Some(FieldError {
                field: "email".to_string(),
                message: self.to_string(),
            }),
            ApiError::InternalServerError => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::EmailAlreadyExist => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self.field_error() {
            Some(field_error) => serde_json::to_string(&field_error),
            None => serde_json::to_string(&ErrorResponse::new(vec![self.to_string()])),
        }
        .unwrap_or_else(|_| "{}".to_string());

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(body)
    }
}

impl From<InsertError> for ApiError {
    fn from(error: InsertError) -> ApiError {
        match error {
            InsertError::DuplicateEmail => ApiError::EmailAlreadyExist,
        }
    }
}
