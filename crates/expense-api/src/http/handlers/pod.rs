//! Pod discovery handler.
//!
//! Endpoints:
//! - GET /api/pods?webid= - Storage roots declared by a WebID profile

use std::collections::BTreeSet;

use axum::extract::{Query, State};
use axum::Json;
use url::Url;

use crate::http::error::AppError;
use crate::http::extractors::query::{require_uri, WebIdQuery};
use crate::state::AppState;

/// GET /api/pods - List the pods (storage roots) a WebID points at.
pub async fn list_pods(
    State(state): State<AppState>,
    Query(query): Query<WebIdQuery>,
) -> Result<Json<BTreeSet<Url>>, AppError> {
    let webid = require_uri("webid", query.webid.as_deref())?;
    let pods = state.expense_service.list_pods(&webid).await?;
    Ok(Json(pods))
}
