//! Clients for the services climawatch talks to: the ThingSpeak telemetry
//! feed and the Twilio WhatsApp API. Both are plain request/response calls
//! with a fixed timeout and no retries.

pub mod thingspeak;
pub mod twilio;

pub use thingspeak::ThingSpeakClient;
pub use twilio::TwilioGateway;

use climawatch_core::{ClimaError, Result};
use std::time::Duration;

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClimaError::UpstreamUnavailable(format!("no se pudo crear el cliente HTTP: {e}")))
}
