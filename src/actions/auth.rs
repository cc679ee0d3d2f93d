use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::error;

use crate::auth::AuthUser;
use crate::users::{LoginRequest, LoginResponse, UserInfo};
use crate::users_repo::UsersRepository;
use crate::web::AppState;

use super::json_error;

pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let users_repo = UsersRepository::new(state.pool);

    match users_repo
        .authenticate(&payload.email, &payload.password)
        .await
    {
        Ok(Some(user)) => match state.jwt.issue_token(&user) {
            Ok(token) => {
                let response = LoginResponse {
                    token,
                    user: UserInfo::from(user),
                };
                Json(response).into_response()
            }
            Err(e) => {
                error!(error = %e, "Failed to issue session token");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to issue session token",
                )
            }
        },
        Ok(None) => json_error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(e) => {
            error!(error = %e, "Authentication error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
        }
    }
}

pub async fn get_current_user(auth_user: AuthUser) -> impl IntoResponse {
    Json(UserInfo::from(auth_user.0))
}
