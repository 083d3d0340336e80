//! Request extractors
//!
//! Drop-in replacements for axum's `Json`, `Path` and `Query` whose rejections
//! render as `LaunchpadError` JSON bodies instead of plain text.

use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use crate::utils::errors::LaunchpadError;

/// JSON request body, and JSON response body
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(LaunchpadError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(LaunchpadError))]
pub struct Path<T>(pub T);

#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(LaunchpadError))]
pub struct Query<T>(pub T);
