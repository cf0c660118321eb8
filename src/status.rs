//! HTTP status codes the service emits, as a typed enum.
//!
//! ```rust
//! use bookshelf::{Response, Status};
//!
//! Response::status(Status::NotFound);
//! ```

/// Status codes used by the router and the book handlers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,                   // 200
    BadRequest,           // 400
    NotFound,             // 404
    MethodNotAllowed,     // 405
    ContentTooLarge,      // 413
    UnprocessableContent, // 422
    InternalServerError,  // 500
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                   => 200,
            Status::BadRequest           => 400,
            Status::NotFound             => 404,
            Status::MethodNotAllowed     => 405,
            Status::ContentTooLarge      => 413,
            Status::UnprocessableContent => 422,
            Status::InternalServerError  => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        match s {
            Status::Ok                   => Self::OK,
            Status::BadRequest           => Self::BAD_REQUEST,
            Status::NotFound             => Self::NOT_FOUND,
            Status::MethodNotAllowed     => Self::METHOD_NOT_ALLOWED,
            Status::ContentTooLarge      => Self::PAYLOAD_TOO_LARGE,
            Status::UnprocessableContent => Self::UNPROCESSABLE_ENTITY,
            Status::InternalServerError  => Self::INTERNAL_SERVER_ERROR,
        }
    }
}
