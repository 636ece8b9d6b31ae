//! Request extractors whose rejections go through `ApiError`

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Deserialized query string
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryString<T>(pub T);

/// Deserialized path parameters
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);
