use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> (StatusCode, Json<Value>) {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "hostname": hostname,
            "version": env!("CARGO_PKG_VERSION"),
            "utcTime": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
