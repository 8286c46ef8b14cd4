use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Form;
use climawatch_core::reply::{build_reply, is_status_command, twiml_message};
use tracing::{info, warn};

use crate::state::AppState;

/// Fields of Twilio's inbound-message webhook that we use.
#[derive(Debug, serde::Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
}

/// POST /whatsapp: inbound command webhook.
///
/// Always answers 200 with an XML reply document, including when the body
/// cannot be parsed or the feed cannot be read.
pub async fn inbound(
    State(app): State<AppState>,
    form: Result<Form<InboundMessage>, FormRejection>,
) -> Response {
    let text = match form {
        Ok(Form(msg)) => {
            info!(from = msg.from.as_deref().unwrap_or("unknown"), command = %msg.body.trim(), "inbound message");
            reply_for(&app, &msg.body).await
        }
        Err(e) => {
            warn!(error = %e, "malformed inbound webhook");
            build_reply("", None)
        }
    };
    xml(twiml_message(&text))
}

async fn reply_for(app: &AppState, command: &str) -> String {
    if !is_status_command(command) {
        return build_reply(command, None);
    }
    match app.feed.read_configured().await {
        Ok(latest) => build_reply(command, latest.as_ref()),
        Err(e) => {
            warn!(error = %e, "could not read feed for status reply");
            format!("No se pudo leer ThingSpeak: {e}")
        }
    }
}

fn xml(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}
