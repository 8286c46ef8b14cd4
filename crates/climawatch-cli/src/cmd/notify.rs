use crate::output::print_json;
use anyhow::Result;
use climawatch_core::Settings;
use climawatch_providers::TwilioGateway;

pub async fn run(settings: &Settings, phone: &str, message: &str, json: bool) -> Result<()> {
    let gateway = TwilioGateway::new(settings.messaging.clone(), settings.request_timeout)?;
    let sid = gateway.send(phone, message).await?;
    if json {
        return print_json(&serde_json::json!({ "sent": true, "twilio_sid": sid }));
    }
    println!("sent: {sid}");
    Ok(())
}
