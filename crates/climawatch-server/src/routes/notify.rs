use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct NotifyBody {
    pub phone: String,
    pub message: String,
}

/// POST /notify: send an arbitrary WhatsApp message.
pub async fn notify(
    State(app): State<AppState>,
    Json(body): Json<NotifyBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let phone = body.phone.trim();
    if phone.is_empty() {
        return Err(AppError::bad_request("el teléfono es obligatorio"));
    }
    let sid = app.messenger.send(phone, &body.message).await?;
    Ok(Json(serde_json::json!({
        "sent": true,
        "twilio_sid": sid,
    })))
}
