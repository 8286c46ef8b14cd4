use axum::Json;

pub const SERVICE_NAME: &str = "ThingSpeak -> WhatsApp notifier";

/// GET /: liveness.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": SERVICE_NAME,
        "status": "ok",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_reports_ok() {
        let Json(body) = root().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], SERVICE_NAME);
    }
}
