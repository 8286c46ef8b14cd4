use crate::output::print_json;
use anyhow::{anyhow, Result};
use climawatch_core::thresholds::{alert_text, assess};
use climawatch_core::Settings;
use climawatch_providers::{ThingSpeakClient, TwilioGateway};

/// Assess the latest reading; with `notify`, alert the default recipient
/// when it is critical.
pub async fn run(settings: &Settings, notify: bool, json: bool) -> Result<()> {
    let feed = ThingSpeakClient::new(settings.feed.clone(), settings.request_timeout)?;
    let reading = feed
        .read_configured()
        .await?
        .ok_or_else(|| anyhow!("no data in feed yet"))?;
    let assessment = assess(reading.humidity, reading.temperature, &settings.thresholds);

    let mut sid = None;
    if notify && assessment.is_critical {
        let phone = settings
            .default_phone
            .as_deref()
            .ok_or_else(|| anyhow!("DEFAULT_NOTIFY_PHONE is not set"))?;
        let gateway = TwilioGateway::new(settings.messaging.clone(), settings.request_timeout)?;
        sid = Some(
            gateway
                .send(phone, &alert_text(&assessment.reasons, &reading))
                .await?,
        );
    }

    if json {
        return print_json(&serde_json::json!({
            "critical": assessment.is_critical,
            "messages": assessment.reasons,
            "metrics": reading,
            "twilio_sid": sid,
        }));
    }

    if assessment.is_critical {
        println!("CRITICAL");
        for reason in &assessment.reasons {
            println!("  {reason}");
        }
    } else {
        println!("ok");
    }
    if let Some(sid) = sid {
        println!("alert sent: {sid}");
    }
    Ok(())
}
