//! Health check endpoint

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct PingResponse {
    pub ok: bool,
    pub service: &'static str,
}

/// GET /ping and /healthz. No side effects, no auth.
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        ok: true,
        service: "novoyaz-server",
    })
}
