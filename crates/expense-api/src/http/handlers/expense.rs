//! Expense HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/expenses/create       - Create an expense, returns its Turtle
//! - GET    /api/expenses/get          - Read an expense as JSON
//! - PUT    /api/expenses/update       - Replace an expense, returns its Turtle
//! - DELETE /api/expenses/delete       - Delete an expense (missing is fine)
//! - PUT    /api/expenses/receipts/add - Upload a receipt and link it

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use axum::http::StatusCode;

use expense_types::expense::Expense;

use crate::http::error::AppError;
use crate::http::extractors::query::{require_uri, ResourceQuery, UploadQuery};
use crate::http::extractors::upload::UploadForm;
use crate::http::response::Turtle;
use crate::state::AppState;

/// POST /api/expenses/create
pub async fn create_expense(
    State(state): State<AppState>,
    payload: Result<Json<Expense>, JsonRejection>,
) -> Result<Turtle, AppError> {
    let Json(expense) = payload?;
    let turtle = state.expense_service.create_expense(&expense).await?;
    Ok(Turtle(turtle))
}

/// GET /api/expenses/get?resourceURL=
pub async fn get_expense(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Expense>, AppError> {
    let url = require_uri("resourceURL", query.resource_url.as_deref())?;
    let expense = state.expense_service.get_expense(&url).await?;
    Ok(Json(expense))
}

/// PUT /api/expenses/update
pub async fn update_expense(
    State(state): State<AppState>,
    payload: Result<Json<Expense>, JsonRejection>,
) -> Result<Turtle, AppError> {
    let Json(expense) = payload?;
    let turtle = state.expense_service.update_expense(&expense).await?;
    Ok(Turtle(turtle))
}

/// DELETE /api/expenses/delete?resourceURL=
pub async fn delete_expense(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<StatusCode, AppError> {
    let url = require_uri("resourceURL", query.resource_url.as_deref())?;
    state.expense_service.delete_expense(&url).await?;
    Ok(StatusCode::OK)
}

/// PUT /api/expenses/receipts/add
///
/// Multipart parts: `file`, `destinationURL`, `expenseURL`. Both URLs may
/// be given as query parameters instead.
pub async fn add_receipt_to_expense(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Turtle, AppError> {
    let mut form = UploadForm::read(multipart, query).await?;
    let expense_url = require_uri("expenseURL", form.expense_url.as_deref())?;
    let upload = form.file_upload()?;

    let turtle = state
        .expense_service
        .add_receipt_to_expense(upload, &expense_url)
        .await?;
    Ok(Turtle(turtle))
}
