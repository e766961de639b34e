//! Extractors whose rejections share the JSON error shape of [`AppError`].

use axum::extract::{FromRequest, FromRequestParts};

use crate::http::AppError;

/// JSON request body; malformed or non-JSON input is a 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);
