use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct WriteBody {
    /// Sent as `field1`.
    pub temperature: f64,
    /// Sent as `field2`.
    pub humidity: f64,
}

/// POST /send-to-thingspeak: write one reading to the feed.
pub async fn send_to_thingspeak(
    State(app): State<AppState>,
    Json(body): Json<WriteBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = app
        .feed
        .write_reading(body.temperature, body.humidity)
        .await?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "thingspeak_response": token,
    })))
}
