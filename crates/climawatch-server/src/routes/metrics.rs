use axum::extract::State;
use axum::Json;
use climawatch_core::thresholds::{alert_text, assess};
use climawatch_core::Reading;
use tracing::{info, warn};

use super::latest_reading;
use crate::error::AppError;
use crate::state::AppState;

/// GET /metrics: latest reading of the feed (404 when empty).
pub async fn get_metrics(State(app): State<AppState>) -> Result<Json<Reading>, AppError> {
    let reading = latest_reading(&app).await?;
    Ok(Json(reading))
}

/// POST /check-and-notify: read, assess, and alert the default recipient
/// when the reading is critical.
pub async fn check_and_notify(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reading = latest_reading(&app).await?;
    let assessment = assess(reading.humidity, reading.temperature, &app.settings.thresholds);

    let mut twilio_sid = None;
    if assessment.is_critical {
        match app.settings.default_phone.as_deref() {
            Some(phone) => {
                let text = alert_text(&assessment.reasons, &reading);
                let sid = app.messenger.send(phone, &text).await?;
                info!(%sid, reasons = ?assessment.reasons, "critical reading alert sent");
                twilio_sid = Some(sid);
            }
            None => warn!("critical reading but DEFAULT_NOTIFY_PHONE is not set"),
        }
    }

    let mut body = serde_json::json!({
        "notified": twilio_sid.is_some(),
        "messages": assessment.reasons,
        "metrics": reading,
    });
    if let Some(sid) = twilio_sid {
        body["twilio_sid"] = serde_json::Value::String(sid);
    }
    Ok(Json(body))
}
