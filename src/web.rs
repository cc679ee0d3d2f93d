use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::time::Instant;
use uuid::Uuid;

use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::actions;
use crate::auth::JwtService;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

// Shared handler state: database pool plus the token service
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt: JwtService,
}

// Middleware for request logging with correlation ID
async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = Uuid::new_v4().to_string()[..8].to_string();
    let start_time = Instant::now();

    info!("Started {} {} [{}]", method, path, request_id);

    let response = next.run(request).await;
    let duration = start_time.elapsed();
    let status = response.status();

    info!(
        "Completed {} {} [{}] {} in {:.2}ms",
        method,
        path,
        request_id,
        status.as_u16(),
        duration.as_secs_f64() * 1000.0
    );

    response
}

// Middleware to capture HTTP errors to Sentry
async fn sentry_error_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    // Capture HTTP 5xx errors to Sentry
    if response.status().is_server_error() {
        let status = response.status();
        error!("HTTP {} error on {} {}", status.as_u16(), method, uri);

        sentry::configure_scope(|scope| {
            scope.set_tag("http.method", method.as_str());
            scope.set_tag("http.url", uri.to_string());
            scope.set_tag("http.status_code", status.as_u16().to_string());
        });

        sentry::capture_message(
            &format!("HTTP {} error on {} {}", status.as_u16(), method, uri),
            sentry::Level::Error,
        );
    }

    response
}

pub async fn start_web_server(interface: String, port: u16, pool: PgPool) -> Result<()> {
    sentry::configure_scope(|scope| {
        scope.set_tag("operation", "web-server");
    });
    info!("Starting web server on {}:{}", interface, port);

    // Fail at startup, not on the first authenticated request
    let jwt = JwtService::from_env()?;
    let app_state = AppState { pool, jwt };

    // Create CORS layer that allows all origins and methods
    let cors_layer = CorsLayer::permissive();

    // Create API sub-router rooted at "/api"
    let api_router = Router::new()
        // Authentication routes
        .route("/auth/login", post(actions::login_user))
        .route("/auth/me", get(actions::get_current_user))
        // Aircraft routes
        .route("/aircraft", get(actions::list_aircraft))
        .route("/aircraft", post(actions::create_aircraft))
        .route("/aircraft/{id}", get(actions::get_aircraft_by_id))
        .route("/aircraft/{id}", put(actions::update_aircraft))
        .route("/aircraft/{id}", delete(actions::delete_aircraft))
        // Pilot routes
        .route("/pilots", get(actions::list_pilots))
        .route("/pilots", post(actions::create_pilot))
        .route("/pilots/{id}", get(actions::get_pilot_by_id))
        .route("/pilots/{id}", put(actions::update_pilot))
        .route("/pilots/{id}", delete(actions::delete_pilot))
        .route("/pilots/{id}/password", post(actions::change_pilot_password))
        // PDT page routes
        .route("/pdt", get(actions::list_pdt_pages))
        .route("/pdt", post(actions::create_pdt_page))
        .route("/pdt/{id}", get(actions::get_pdt_page_by_id))
        .route("/pdt/{id}", put(actions::update_pdt_page))
        .route("/pdt/{id}", delete(actions::delete_pdt_page))
        // Dashboard
        .route("/status", get(actions::get_status));

    // Build the main Axum application
    let app = Router::new()
        .nest("/api", api_router)
        .with_state(app_state)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(middleware::from_fn(sentry_error_middleware))
        .layer(cors_layer);

    // Create the listener
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", interface, port)).await?;
    info!("Web server listening on http://{}:{}", interface, port);

    // Start the server
    axum::serve(listener, app).await?;

    Ok(())
}
