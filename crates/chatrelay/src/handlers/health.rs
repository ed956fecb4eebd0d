use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::llm::Provider;
use crate::server::AppState;

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[derive(Serialize)]
pub struct ReadyzResponse {
    status: &'static str,
    providers: ProvidersStatus,
}

#[derive(Serialize)]
pub struct ProvidersStatus {
    gemini: bool,
    groq: bool,
}

/// Ready once the server is up; reports which providers have credentials.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<ReadyzResponse>) {
    let registry = state.dispatcher.registry();
    let response = ReadyzResponse {
        status: "ok",
        providers: ProvidersStatus {
            gemini: registry.is_configured(&Provider::Gemini),
            groq: registry.is_configured(&Provider::Groq),
        },
    };
    (StatusCode::OK, Json(response))
}
