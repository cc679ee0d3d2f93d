use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::auth::{AdminUser, AuthUser};
use crate::flight_operations::{FlightOperation, NewFlightOperation};
use crate::pdt_pages::{PdtPage, PdtPageInput};
use crate::pdt_pages_repo::{PdtPageFilter, PdtPagesRepository};
use crate::web::AppState;

use super::{json_error, repo_error};

/// A flight operation with its derived duration, formatted H:MM
#[derive(Debug, Serialize)]
pub struct OperationView {
    #[serde(flatten)]
    pub operation: FlightOperation,
    pub flight_time: String,
}

impl From<FlightOperation> for OperationView {
    fn from(operation: FlightOperation) -> Self {
        Self {
            flight_time: operation.flight_time_formatted(),
            operation,
        }
    }
}

/// A PDT page together with its operation set
#[derive(Debug, Serialize)]
pub struct PdtPageView {
    #[serde(flatten)]
    pub page: PdtPage,
    pub flight_operations: Vec<OperationView>,
}

impl PdtPageView {
    fn build(page: PdtPage, operations: Vec<FlightOperation>) -> Self {
        Self {
            page,
            flight_operations: operations.into_iter().map(OperationView::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PdtPageRequest {
    #[serde(flatten)]
    pub page: PdtPageInput,
    pub flight_operations: Vec<NewFlightOperation>,
}

#[derive(Debug, Deserialize)]
pub struct PdtPageListQuery {
    pub aircraft_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

pub async fn list_pdt_pages(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<PdtPageListQuery>,
) -> impl IntoResponse {
    let pages_repo = PdtPagesRepository::new(state.pool);

    let filter = PdtPageFilter {
        aircraft_id: query.aircraft_id,
        date_from: query.date_from,
        date_to: query.date_to,
    };

    match pages_repo.list(filter).await {
        Ok(pages) => Json(pages).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list PDT pages");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list PDT pages")
        }
    }
}

pub async fn get_pdt_page_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let pages_repo = PdtPagesRepository::new(state.pool);

    match pages_repo.get_by_id(id).await {
        Ok(Some(page)) => match pages_repo.get_operations_for_page(id).await {
            Ok(operations) => Json(PdtPageView::build(page, operations)).into_response(),
            Err(e) => {
                error!(error = %e, "Failed to load page operations");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get PDT page")
            }
        },
        Ok(None) => json_error(StatusCode::NOT_FOUND, "PDT page not found"),
        Err(e) => {
            error!(error = %e, "Failed to get PDT page");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get PDT page")
        }
    }
}

pub async fn create_pdt_page(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<PdtPageRequest>,
) -> impl IntoResponse {
    let pages_repo = PdtPagesRepository::new(state.pool);

    match pages_repo
        .create_with_operations(payload.page, payload.flight_operations)
        .await
    {
        Ok((page, operations)) => (
            StatusCode::CREATED,
            Json(PdtPageView::build(page, operations)),
        )
            .into_response(),
        Err(e) => repo_error(e, "Failed to create PDT page"),
    }
}

pub async fn update_pdt_page(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PdtPageRequest>,
) -> impl IntoResponse {
    let pages_repo = PdtPagesRepository::new(state.pool);

    match pages_repo
        .update_with_operations(id, payload.page, payload.flight_operations)
        .await
    {
        Ok(Some((page, operations))) => Json(PdtPageView::build(page, operations)).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "PDT page not found"),
        Err(e) => repo_error(e, "Failed to update PDT page"),
    }
}

pub async fn delete_pdt_page(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let pages_repo = PdtPagesRepository::new(state.pool);

    match pages_repo.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => json_error(StatusCode::NOT_FOUND, "PDT page not found"),
        Err(e) => repo_error(e, "Failed to delete PDT page"),
    }
}
