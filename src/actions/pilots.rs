use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::auth::{AdminUser, AuthUser};
use crate::pilots::{Pilot, PilotInput};
use crate::pilots_repo::PilotsRepository;
use crate::stats::{DateStatus, PilotStats, date_status, pilot_stats};
use crate::users::{User, UserInfo};
use crate::users_repo::UsersRepository;
use crate::web::AppState;

use super::{OperationView, json_error, repo_error};

#[derive(Debug, Deserialize)]
pub struct CreatePilotRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(flatten)]
    pub pilot: PilotInput,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

/// A pilot profile with its account and licence/medical date statuses
#[derive(Debug, Serialize)]
pub struct PilotView {
    #[serde(flatten)]
    pub pilot: Pilot,
    pub user: UserInfo,
    pub sepl_status: Option<DateStatus>,
    pub medical_status: Option<DateStatus>,
}

impl PilotView {
    fn build(pilot: Pilot, user: &User) -> Self {
        let today = Utc::now().date_naive();
        Self {
            user: user.to_user_info(),
            sepl_status: date_status(pilot.sepl_valid_until, today),
            medical_status: date_status(pilot.medical_valid_until, today),
            pilot,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PilotDetailView {
    #[serde(flatten)]
    pub summary: PilotView,
    pub stats: PilotStats,
    pub recent_operations: Vec<OperationView>,
}

/// Response for pilot creation; carries the generated temporary password,
/// shown exactly once
#[derive(Debug, Serialize)]
pub struct CreatedPilotView {
    #[serde(flatten)]
    pub summary: PilotView,
    pub temporary_password: String,
}

pub async fn list_pilots(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let pilots_repo = PilotsRepository::new(state.pool);

    match pilots_repo.get_active().await {
        Ok(pilots) => {
            let views: Vec<PilotView> = pilots
                .into_iter()
                .map(|(pilot, user)| PilotView::build(pilot, &user))
                .collect();
            Json(views).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list pilots");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list pilots")
        }
    }
}

pub async fn get_pilot_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let pilots_repo = PilotsRepository::new(state.pool);

    match pilots_repo.get_by_id(id).await {
        Ok(Some((pilot, user))) => match pilots_repo.get_operations_for_pilot(id).await {
            Ok(operations) => {
                let stats = pilot_stats(&operations);
                let recent: Vec<OperationView> = operations
                    .into_iter()
                    .take(20)
                    .map(OperationView::from)
                    .collect();
                Json(PilotDetailView {
                    summary: PilotView::build(pilot, &user),
                    stats,
                    recent_operations: recent,
                })
                .into_response()
            }
            Err(e) => {
                error!(error = %e, "Failed to load pilot operations");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get pilot")
            }
        },
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Pilot not found"),
        Err(e) => {
            error!(error = %e, "Failed to get pilot");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get pilot")
        }
    }
}

pub async fn create_pilot(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreatePilotRequest>,
) -> impl IntoResponse {
    let pilots_repo = PilotsRepository::new(state.pool);

    match pilots_repo
        .create_pilot(
            payload.first_name,
            payload.last_name,
            payload.email,
            payload.is_admin,
            payload.pilot,
        )
        .await
    {
        Ok((pilot, user, temp_password)) => (
            StatusCode::CREATED,
            Json(CreatedPilotView {
                summary: PilotView::build(pilot, &user),
                temporary_password: temp_password,
            }),
        )
            .into_response(),
        Err(e) => repo_error(e, "Failed to create pilot"),
    }
}

pub async fn update_pilot(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreatePilotRequest>,
) -> impl IntoResponse {
    let pilots_repo = PilotsRepository::new(state.pool);

    match pilots_repo
        .update_pilot(
            id,
            payload.first_name,
            payload.last_name,
            payload.email,
            payload.is_admin,
            payload.pilot,
        )
        .await
    {
        Ok(Some((pilot, user))) => Json(PilotView::build(pilot, &user)).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Pilot not found"),
        Err(e) => repo_error(e, "Failed to update pilot"),
    }
}

pub async fn delete_pilot(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let pilots_repo = PilotsRepository::new(state.pool);

    match pilots_repo.soft_delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => json_error(StatusCode::NOT_FOUND, "Pilot not found"),
        Err(e) => repo_error(e, "Failed to delete pilot"),
    }
}

/// Set a pilot's password. Pilots may change their own; admins may change
/// anyone's.
pub async fn change_pilot_password(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangePasswordRequest>,
) -> impl IntoResponse {
    let pilots_repo = PilotsRepository::new(state.pool.clone());
    let users_repo = UsersRepository::new(state.pool);

    let (_pilot, user) = match pilots_repo.get_by_id(id).await {
        Ok(Some(pair)) => pair,
        Ok(None) => return json_error(StatusCode::NOT_FOUND, "Pilot not found"),
        Err(e) => {
            error!(error = %e, "Failed to get pilot");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to change password");
        }
    };

    if !current_user.is_admin && current_user.id != user.id {
        return json_error(
            StatusCode::FORBIDDEN,
            "You may only change your own password",
        );
    }

    if payload.password.chars().count() < 8 {
        return json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Password must be at least 8 characters",
        );
    }

    match users_repo.set_password(user.id, &payload.password).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => json_error(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => {
            error!(error = %e, "Failed to change password");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to change password")
        }
    }
}
