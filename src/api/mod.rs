//! REST API module.
//!
//! Public page endpoints, the admin session endpoints and the admin panel
//! endpoints. Every response uses the `{success, data}` envelope.

mod admin;
mod events;
mod gallery;
mod graduates;
mod home;
mod session;

pub use admin::*;
pub use events::*;
pub use gallery::*;
pub use graduates::*;
pub use home::*;
pub use session::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::listing::UnknownFilter;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

impl From<UnknownFilter> for AppError {
    fn from(err: UnknownFilter) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Parse an optional query parameter into a filter, empty meaning default.
pub(crate) fn parse_filter<F>(raw: Option<&str>) -> Result<F, AppError>
where
    F: std::str::FromStr<Err = UnknownFilter> + Default,
{
    match raw {
        None => Ok(F::default()),
        Some(raw) => Ok(raw.parse()?),
    }
}
