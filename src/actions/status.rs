//! Dashboard endpoint: fleet-wide counts and the latest PDT pages.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::error;

use crate::aircraft_repo::AircraftRepository;
use crate::auth::AuthUser;
use crate::pdt_pages::PdtPage;
use crate::pdt_pages_repo::PdtPagesRepository;
use crate::pilots_repo::PilotsRepository;
use crate::web::AppState;

use super::json_error;

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub total_pdt_pages: i64,
    pub total_flight_operations: i64,
    pub active_aircraft: i64,
    pub active_pilots: i64,
    pub recent_pages: Vec<PdtPage>,
}

pub async fn get_status(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let pages_repo = PdtPagesRepository::new(state.pool.clone());
    let aircraft_repo = AircraftRepository::new(state.pool.clone());
    let pilots_repo = PilotsRepository::new(state.pool);

    let counts = tokio::try_join!(
        pages_repo.count(),
        pages_repo.count_operations(),
        aircraft_repo.count_active(),
        pilots_repo.count_active(),
        pages_repo.get_recent(10),
    );

    match counts {
        Ok((total_pages, total_operations, active_aircraft, active_pilots, recent_pages)) => {
            Json(StatusView {
                total_pdt_pages: total_pages,
                total_flight_operations: total_operations,
                active_aircraft,
                active_pilots,
                recent_pages,
            })
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to load dashboard status");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load status")
        }
    }
}
