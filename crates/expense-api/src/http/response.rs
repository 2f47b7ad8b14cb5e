//! Non-JSON response bodies.

use axum::http::header;
use axum::response::{IntoResponse, Response};

use expense_types::pod::TEXT_TURTLE;

/// A Turtle document returned verbatim with `Content-Type: text/turtle`.
#[derive(Debug)]
pub struct Turtle(pub String);

impl IntoResponse for Turtle {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, TEXT_TURTLE)], self.0).into_response()
    }
}
