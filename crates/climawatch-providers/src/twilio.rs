//! Twilio WhatsApp gateway.

use climawatch_core::settings::MessagingSettings;
use climawatch_core::{ClimaError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize)]
struct MessageCreated {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct TwilioGateway {
    http: reqwest::Client,
    settings: MessagingSettings,
}

impl TwilioGateway {
    pub fn new(settings: MessagingSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: crate::http_client(timeout)?,
            settings,
        })
    }

    /// Send `body` to `to` over WhatsApp and return the message sid.
    ///
    /// `to` is a phone number (`+34...`); the `whatsapp:` prefix is added
    /// when missing.
    pub async fn send(&self, to: &str, body: &str) -> Result<String> {
        let (sid, token, from) = self.settings.credentials()?;
        let to = if to.starts_with("whatsapp:") {
            to.to_string()
        } else {
            format!("whatsapp:{to}")
        };

        let url = format!(
            "{}/2010-04-01/Accounts/{sid}/Messages.json",
            self.settings.base_url.trim_end_matches('/')
        );
        let form = [("From", from), ("To", to.as_str()), ("Body", body)];

        let resp = self
            .http
            .post(&url)
            .basic_auth(sid, Some(token))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClimaError::UpstreamUnavailable(e.to_string())
                } else {
                    ClimaError::DeliveryFailed(e.to_string())
                }
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ClimaError::DeliveryFailed(e.to_string()))?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<TwilioErrorBody>(&text) {
                Ok(TwilioErrorBody {
                    code: Some(code),
                    message: Some(message),
                }) => format!("{message} (code {code})"),
                Ok(TwilioErrorBody {
                    message: Some(message),
                    ..
                }) => message,
                _ => text.trim().to_string(),
            };
            return Err(ClimaError::DeliveryFailed(format!(
                "HTTP {}: {detail}",
                status.as_u16()
            )));
        }

        let created: MessageCreated = serde_json::from_str(&text)
            .map_err(|e| ClimaError::DeliveryFailed(format!("respuesta inesperada: {e}")))?;
        info!(sid = %created.sid, %to, "whatsapp message queued");
        Ok(created.sid)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
