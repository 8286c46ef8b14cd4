use anyhow::Result;
use climawatch_core::Settings;
use climawatch_server::AppState;
use tracing::info;

pub async fn run(settings: Settings, host: &str, port: u16) -> Result<()> {
    info!(
        channel = settings.feed.channel_id.as_deref().unwrap_or("<unset>"),
        thresholds = ?settings.thresholds,
        "starting climawatch server"
    );
    let state = AppState::new(settings)?;
    climawatch_server::serve(state, host, port).await
}
