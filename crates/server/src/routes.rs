use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use spot_game_core::{
    Attributes, Button, Dependencies, GameConfig, GameController,
    api::{Command, CommandResponse, Geometry},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<GameController>,
    pub dependencies: Dependencies,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/push", post(push))
        .route("/do_command", post(do_command))
        .route("/geometries", get(geometries))
        .route("/reconfigure", post(reconfigure))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

async fn push(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.controller.push().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn do_command(
    State(state): State<AppState>,
    Json(command): Json<Command>,
) -> Result<Json<CommandResponse>, ApiError> {
    Ok(Json(state.controller.do_command(&command).await?))
}

async fn geometries(State(state): State<AppState>) -> Result<Json<Vec<Geometry>>, ApiError> {
    Ok(Json(state.controller.geometries().await?))
}

async fn reconfigure(
    State(state): State<AppState>,
    Json(attributes): Json<Attributes>,
) -> Result<Json<Vec<String>>, ApiError> {
    let config = GameConfig::from_attributes(&attributes)?;
    state
        .controller
        .reconfigure(&config, &state.dependencies)
        .await?;

    tracing::info!(
        camera = %config.camera_name,
        detector = %config.detector_name,
        "game reconfigured"
    );
    Ok(Json(config.required_dependencies()))
}

async fn health() -> &'static str {
    "OK"
}
