use axum::{Extension, Json};
use serde::Serialize;

use crate::config::Config;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    engine: String,
}

pub async fn health_check(Extension(config): Extension<Config>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        engine: config.engine_path.clone(),
    })
}
