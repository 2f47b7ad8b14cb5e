//! Raw resource handlers.
//!
//! Endpoints:
//! - GET /api/resource/get          - Any pod resource as Turtle
//! - PUT /api/resource/nonRDF/add   - Store a binary file, reports success

use axum::extract::{Multipart, Query, State};
use axum::Json;

use crate::http::error::AppError;
use crate::http::extractors::query::{require_uri, ResourceQuery, UploadQuery};
use crate::http::extractors::upload::UploadForm;
use crate::http::response::Turtle;
use crate::state::AppState;

/// GET /api/resource/get?resourceURL=
pub async fn get_resource_as_turtle(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Turtle, AppError> {
    let url = require_uri("resourceURL", query.resource_url.as_deref())?;
    let turtle = state.expense_service.get_resource_as_turtle(&url).await?;
    Ok(Turtle(turtle))
}

/// PUT /api/resource/nonRDF/add
///
/// The pod's verdict comes back as a boolean; only malformed requests are
/// reported as errors.
pub async fn add_non_rdf_file(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<bool>, AppError> {
    let mut form = UploadForm::read(multipart, query).await?;
    let upload = form.file_upload()?;
    Ok(Json(state.expense_service.add_non_rdf_file(upload).await))
}
