use axum::extract::State;
use axum::Json;
use climawatch_core::sequencer;
use climawatch_core::thresholds::assess;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use super::latest_reading;
use crate::error::AppError;
use crate::state::AppState;

/// POST /stabilize: when the latest reading is critical, walk it back to
/// the optimal values by writing corrective readings to the feed.
///
/// Holds the request open for the whole run (16 s between writes). Only one
/// run may be active at a time; a second call gets 409.
///
/// The run executes on its own task and owns the guard, so it completes even
/// if the client disconnects before the response is sent.
pub async fn stabilize(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let guard = Arc::clone(&app.stabilize_guard)
        .try_lock_owned()
        .map_err(|_| AppError::conflict("ya hay una estabilización en curso"))?;

    let reading = latest_reading(&app).await?;
    let Some((humidity, temperature)) = reading.values() else {
        return Ok(Json(serde_json::json!({
            "stabilization_needed": false,
            "message": "No se puede evaluar: faltan valores de temperatura o humedad",
            "current_values": {
                "temperature": reading.temperature,
                "humidity": reading.humidity,
            },
        })));
    };

    let thresholds = &app.settings.thresholds;
    let assessment = assess(Some(humidity), Some(temperature), thresholds);
    if !assessment.is_critical {
        return Ok(Json(serde_json::json!({
            "stabilization_needed": false,
            "message": "Los valores actuales están dentro de rangos aceptables",
            "current_values": {
                "temperature": temperature,
                "humidity": humidity,
            },
        })));
    }

    // Without a write key every step would fail; refuse before starting.
    app.settings.feed.write_key()?;

    let run_id = uuid::Uuid::new_v4().to_string();
    info!(%run_id, reasons = ?assessment.reasons, "starting stabilization run");
    let feed = app.feed.clone();
    let cfg = thresholds.clone();
    let settings = app.sequencer.clone();
    let run = async move {
        let report = sequencer::stabilize(&feed, temperature, humidity, &cfg, &settings).await;
        drop(guard);
        report
    };
    let report = tokio::spawn(run.instrument(info_span!("stabilize", %run_id)))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("la tarea de estabilización falló: {e}")))?;

    let message = if report.completed {
        "Estabilización completada"
    } else {
        "Estabilización parcial: se alcanzó el límite de iteraciones"
    };

    Ok(Json(serde_json::json!({
        "stabilization_needed": true,
        "run_id": run_id,
        "message": message,
        "messages": assessment.reasons,
        "initial_values": report.initial_values,
        "target_values": report.target_values,
        "current_values": report.final_values,
        "adjusted": report.adjusted,
        "steps": report.steps,
        "total_steps": report.steps.len(),
        "completed": report.completed,
    })))
}
