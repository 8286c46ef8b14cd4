use crate::output::print_json;
use anyhow::Result;
use climawatch_core::Settings;
use climawatch_providers::ThingSpeakClient;

pub async fn run(settings: &Settings, temperature: f64, humidity: f64, json: bool) -> Result<()> {
    let feed = ThingSpeakClient::new(settings.feed.clone(), settings.request_timeout)?;
    let token = feed.write_reading(temperature, humidity).await?;
    if json {
        return print_json(&serde_json::json!({
            "status": "ok",
            "thingspeak_response": token,
        }));
    }
    println!("entry {token}");
    Ok(())
}
