use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use spot_game_core::GameError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Game(#[from] GameError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Game(GameError::Config(_)) => (StatusCode::BAD_REQUEST, "CONFIG_ERROR"),
            ApiError::Game(GameError::Dependency { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "DEPENDENCY_ERROR")
            }
            ApiError::Game(GameError::Detection(_)) => (StatusCode::BAD_GATEWAY, "DETECTION_ERROR"),
            ApiError::Game(GameError::DetectionTimeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "DETECTION_TIMEOUT")
            }
            ApiError::Game(GameError::NotImplemented(_)) => {
                (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
