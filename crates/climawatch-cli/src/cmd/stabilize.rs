use crate::output::{print_json, print_table};
use anyhow::{anyhow, Result};
use climawatch_core::sequencer::{self, StepOutcome};
use climawatch_core::{assess, SequencerSettings, Settings};
use climawatch_providers::ThingSpeakClient;

/// Run one stabilization sequence from the terminal. Blocks for the whole
/// run, 16 s between writes.
pub async fn run(settings: &Settings, json: bool) -> Result<()> {
    settings.feed.write_key()?;
    let feed = ThingSpeakClient::new(settings.feed.clone(), settings.request_timeout)?;
    let reading = feed
        .read_configured()
        .await?
        .ok_or_else(|| anyhow!("no data in feed yet"))?;

    let Some((humidity, temperature)) = reading.values() else {
        println!("cannot assess: temperature or humidity missing");
        return Ok(());
    };
    if !assess(Some(humidity), Some(temperature), &settings.thresholds).is_critical {
        println!("no stabilization required (T={temperature} H={humidity})");
        return Ok(());
    }

    let report = sequencer::stabilize(
        &feed,
        temperature,
        humidity,
        &settings.thresholds,
        &SequencerSettings::default(),
    )
    .await;

    if json {
        return print_json(&report);
    }

    let rows = report
        .steps
        .iter()
        .map(|s| {
            let result = match &s.outcome {
                StepOutcome::Written { entry_id } => format!("entry {entry_id}"),
                StepOutcome::Failed { error } => format!("error: {error}"),
                StepOutcome::Note { note } => note.clone(),
            };
            vec![
                s.step.to_string(),
                format!("{:.1}", s.temperature),
                format!("{:.1}", s.humidity),
                result,
            ]
        })
        .collect();
    print_table(&["STEP", "TEMPERATURE", "HUMIDITY", "RESULT"], rows);
    println!(
        "{} after {} iteration(s)",
        if report.completed { "completed" } else { "stopped at iteration limit" },
        report.iterations
    );
    Ok(())
}
