pub mod aircraft;
pub mod auth;
pub mod pdt_pages;
pub mod pilots;
pub mod status;

pub use aircraft::*;
pub use auth::*;
pub use pdt_pages::*;
pub use pilots::*;
pub use status::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use crate::validation::{DeleteProtected, ValidationErrors};

/// Build a JSON error body with the given status
pub fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Map a repository failure onto the API error model: per-field validation
/// failures become 422 with the field list, blocked deletes become 409,
/// anything else is logged and reported as 500.
pub fn repo_error(err: anyhow::Error, context: &'static str) -> Response {
    let err = match err.downcast::<ValidationErrors>() {
        Ok(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "errors": errors })),
            )
                .into_response();
        }
        Err(err) => err,
    };
    match err.downcast::<DeleteProtected>() {
        Ok(protected) => json_error(StatusCode::CONFLICT, &protected.to_string()),
        Err(err) => {
            error!(error = %err, "{}", context);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, context)
        }
    }
}
