use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::aircraft::{Aircraft, AircraftInput};
use crate::aircraft_repo::AircraftRepository;
use crate::auth::{AdminUser, AuthUser};
use crate::flight_operations::FlightOperation;
use crate::stats::{AircraftStats, DateStatus, aircraft_stats, date_status};
use crate::web::AppState;

use super::{OperationView, json_error, repo_error};

/// An aircraft together with its derived statistics and date statuses
#[derive(Debug, Serialize)]
pub struct AircraftView {
    #[serde(flatten)]
    pub aircraft: Aircraft,
    pub display_name: String,
    pub stats: AircraftStats,
    pub next_service_date_status: Option<DateStatus>,
    pub arc_status: Option<DateStatus>,
    pub insurance_status: Option<DateStatus>,
}

impl AircraftView {
    fn build(aircraft: Aircraft, operations: &[FlightOperation]) -> Self {
        let today = Utc::now().date_naive();
        Self {
            display_name: aircraft.display_name(),
            stats: aircraft_stats(&aircraft, operations),
            next_service_date_status: date_status(aircraft.next_service_date, today),
            arc_status: date_status(aircraft.arc_valid_until, today),
            insurance_status: date_status(aircraft.insurance_valid_until, today),
            aircraft,
        }
    }
}

/// Aircraft detail: statistics plus the most recent operations
#[derive(Debug, Serialize)]
pub struct AircraftDetailView {
    #[serde(flatten)]
    pub summary: AircraftView,
    pub recent_operations: Vec<OperationView>,
}

pub async fn list_aircraft(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let aircraft_repo = AircraftRepository::new(state.pool);

    let fleet = match aircraft_repo.get_active().await {
        Ok(fleet) => fleet,
        Err(e) => {
            error!(error = %e, "Failed to list aircraft");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list aircraft");
        }
    };

    let mut views = Vec::with_capacity(fleet.len());
    for aircraft in fleet {
        match aircraft_repo.get_operations_for_aircraft(aircraft.id).await {
            Ok(operations) => views.push(AircraftView::build(aircraft, &operations)),
            Err(e) => {
                error!(error = %e, "Failed to load aircraft operations");
                return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list aircraft");
            }
        }
    }

    Json(views).into_response()
}

pub async fn get_aircraft_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let aircraft_repo = AircraftRepository::new(state.pool);

    match aircraft_repo.get_by_id(id).await {
        Ok(Some(aircraft)) => match aircraft_repo.get_operations_for_aircraft(id).await {
            Ok(operations) => {
                let summary = AircraftView::build(aircraft, &operations);
                let recent: Vec<OperationView> = operations
                    .into_iter()
                    .take(20)
                    .map(OperationView::from)
                    .collect();
                Json(AircraftDetailView {
                    summary,
                    recent_operations: recent,
                })
                .into_response()
            }
            Err(e) => {
                error!(error = %e, "Failed to load aircraft operations");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get aircraft")
            }
        },
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Aircraft not found"),
        Err(e) => {
            error!(error = %e, "Failed to get aircraft");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get aircraft")
        }
    }
}

pub async fn create_aircraft(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<AircraftInput>,
) -> impl IntoResponse {
    let aircraft_repo = AircraftRepository::new(state.pool);

    match aircraft_repo.create(payload).await {
        Ok(aircraft) => (StatusCode::CREATED, Json(aircraft)).into_response(),
        Err(e) => repo_error(e, "Failed to create aircraft"),
    }
}

pub async fn update_aircraft(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AircraftInput>,
) -> impl IntoResponse {
    let aircraft_repo = AircraftRepository::new(state.pool);

    match aircraft_repo.update(id, payload).await {
        Ok(Some(aircraft)) => Json(aircraft).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Aircraft not found"),
        Err(e) => repo_error(e, "Failed to update aircraft"),
    }
}

pub async fn delete_aircraft(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let aircraft_repo = AircraftRepository::new(state.pool);

    match aircraft_repo.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => json_error(StatusCode::NOT_FOUND, "Aircraft not found"),
        Err(e) => repo_error(e, "Failed to delete aircraft"),
    }
}
