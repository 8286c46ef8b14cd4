use crate::output::{opt, print_json, print_table};
use anyhow::{anyhow, Result};
use climawatch_core::Settings;
use climawatch_providers::ThingSpeakClient;

pub async fn run(settings: &Settings, json: bool) -> Result<()> {
    let feed = ThingSpeakClient::new(settings.feed.clone(), settings.request_timeout)?;
    let reading = feed
        .read_configured()
        .await?
        .ok_or_else(|| anyhow!("no data in feed yet"))?;

    if json {
        return print_json(&reading);
    }
    print_table(
        &["TEMPERATURE", "HUMIDITY", "CREATED_AT"],
        vec![vec![
            opt(reading.temperature),
            opt(reading.humidity),
            opt(reading.created_at),
        ]],
    );
    Ok(())
}
