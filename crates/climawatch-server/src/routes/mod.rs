pub mod feed;
pub mod health;
pub mod metrics;
pub mod notify;
pub mod stabilize;
pub mod whatsapp;

use climawatch_core::{ClimaError, Reading};

use crate::state::AppState;

/// Latest reading of the configured channel; an empty feed is `NoData`.
pub(crate) async fn latest_reading(app: &AppState) -> Result<Reading, ClimaError> {
    app.feed.read_configured().await?.ok_or(ClimaError::NoData)
}
