use crate::util::{self, Reply};
use core::fmt::{self, Display};
use hyper::StatusCode;
use model::FieldError;
use serde::Serialize;

#[derive(Debug)]
pub enum Error {
    /// One or more request fields failed validation.
    Validation(Vec<FieldError>),
    /// The request is malformed in a way that is not tied to a single field.
    BadRequest(&'static str),
    QuestionNotFound,
    NoRoute,
    MethodNotAllowed,
    TooLarge,
    /// Store or serialization failure. The message is logged and returned as is.
    Internal(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validation(_) => "Validation failed",
            Self::BadRequest(message) => *message,
            Self::QuestionNotFound => "Question not found",
            Self::NoRoute => "Route not found",
            Self::MethodNotAllowed => "Method not allowed",
            Self::TooLarge => "Request body is too large",
            Self::Internal(message) => message.as_str(),
        })
    }
}

impl From<db::error::Error> for Error {
    fn from(err: db::error::Error) -> Self {
        use db::error::Error as DbError;
        match err {
            DbError::NotFound => Self::QuestionNotFound,
            DbError::BadInput => Self::BadRequest("Question violates a storage constraint"),
            err @ DbError::Fatal(_) => Self::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct Body<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl Error {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::QuestionNotFound | Self::NoRoute => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error as `{"error": ..., "errors": [...]}`.
    pub fn into_response(self) -> Reply {
        let message = self.to_string();
        let errors = match &self {
            Self::Validation(errors) => Some(errors.as_slice()),
            _ => None,
        };

        let body = Body { error: &message, errors };
        match util::json(self.status(), &body) {
            Ok(res) => res,
            Err(_) => util::empty(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
