//! Stabilization sequencer.
//!
//! Walks temperature and humidity from an out-of-range reading toward the
//! configured optimal values in bounded steps. Every step is written back to
//! the feed, and consecutive writes are spaced by `step_delay` because the
//! feed rejects updates that arrive faster than its minimum interval.
//!
//! Both parameters advance in the same iteration when both need it. A failed
//! write is recorded in the step log and the run carries on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::Result;
use crate::thresholds::ThresholdConfig;

pub const DEFAULT_STEP_SIZE: f64 = 5.0;
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;
/// One second longer than the feed's 15 s minimum write interval.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(16);

pub const NO_STABILIZATION_NOTE: &str = "no stabilization required";

// ---------------------------------------------------------------------------
// FeedWriter
// ---------------------------------------------------------------------------

/// Destination for the corrective readings produced by a run.
pub trait FeedWriter: Send + Sync {
    /// Write one reading, returning the provider's confirmation token.
    fn write_reading(
        &self,
        temperature: f64,
        humidity: f64,
    ) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SequencerSettings {
    pub step_size: f64,
    pub max_iterations: u32,
    pub step_delay: Duration,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            step_size: DEFAULT_STEP_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step_delay: DEFAULT_STEP_DELAY,
        }
    }
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Values {
    pub temperature: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjusted {
    pub temperature: bool,
    pub humidity: bool,
}

/// Result of one step. Flattened into the step object as `entry_id`,
/// `error` or `note`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepOutcome {
    Written { entry_id: String },
    Failed { error: String },
    Note { note: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilizationStep {
    pub step: u32,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    pub timestamp: DateTime<Utc>,
}

impl StabilizationStep {
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilizationReport {
    pub adjusted: Adjusted,
    pub initial_values: Values,
    pub target_values: Values,
    pub final_values: Values,
    pub steps: Vec<StabilizationStep>,
    /// Every adjusted parameter reached its target.
    pub completed: bool,
    pub iterations: u32,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Drive one stabilization run to its end.
///
/// Never fails: write errors are captured per step, and exhausting
/// `max_iterations` returns the partial log with `completed == false`.
pub async fn stabilize<W: FeedWriter>(
    writer: &W,
    current_temp: i64,
    current_hum: i64,
    cfg: &ThresholdConfig,
    settings: &SequencerSettings,
) -> StabilizationReport {
    let needs_temp = cfg.temperature_out_of_range(current_temp);
    let needs_hum = cfg.humidity_out_of_range(current_hum);

    let initial = Values {
        temperature: current_temp as f64,
        humidity: current_hum as f64,
    };
    let target = Values {
        temperature: cfg.temp_optimal as f64,
        humidity: cfg.hum_optimal as f64,
    };
    let adjusted = Adjusted {
        temperature: needs_temp,
        humidity: needs_hum,
    };

    if !needs_temp && !needs_hum {
        info!(current_temp, current_hum, "readings in range, nothing to stabilize");
        return StabilizationReport {
            adjusted,
            initial_values: initial,
            target_values: target,
            final_values: initial,
            steps: vec![StabilizationStep {
                step: 1,
                temperature: initial.temperature,
                humidity: initial.humidity,
                outcome: StepOutcome::Note {
                    note: NO_STABILIZATION_NOTE.to_string(),
                },
                timestamp: Utc::now(),
            }],
            completed: true,
            iterations: 0,
        };
    }

    info!(
        current_temp,
        current_hum,
        needs_temp,
        needs_hum,
        target_temp = target.temperature,
        target_hum = target.humidity,
        "stabilization started"
    );

    let mut temp = initial.temperature;
    let mut hum = initial.humidity;
    let mut temp_reached = false;
    let mut hum_reached = false;
    let mut steps = Vec::new();
    let mut iteration = 0;
    let mut completed = false;

    while iteration < settings.max_iterations {
        if needs_temp {
            (temp, temp_reached) = clamp_toward(temp, target.temperature, settings.step_size);
        }
        if needs_hum {
            (hum, hum_reached) = clamp_toward(hum, target.humidity, settings.step_size);
        }

        let step = iteration + 1;
        let outcome = match writer.write_reading(temp, hum).await {
            Ok(entry_id) => {
                info!(step, temperature = temp, humidity = hum, %entry_id, "step written");
                StepOutcome::Written { entry_id }
            }
            Err(e) => {
                warn!(step, temperature = temp, humidity = hum, error = %e, "step write failed");
                StepOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        steps.push(StabilizationStep {
            step,
            temperature: round1(temp),
            humidity: round1(hum),
            outcome,
            timestamp: Utc::now(),
        });
        iteration += 1;

        if (!needs_temp || temp_reached) && (!needs_hum || hum_reached) {
            completed = true;
            break;
        }
        if iteration < settings.max_iterations {
            tokio::time::sleep(settings.step_delay).await;
        }
    }

    if !completed {
        warn!(
            iterations = iteration,
            temperature = temp,
            humidity = hum,
            "stabilization stopped at iteration limit"
        );
    } else {
        info!(iterations = iteration, "stabilization completed");
    }

    StabilizationReport {
        adjusted,
        initial_values: initial,
        target_values: target,
        final_values: Values {
            temperature: round1(temp),
            humidity: round1(hum),
        },
        steps,
        completed,
        iterations: iteration,
    }
}

/// Move `current` toward `target` by at most `step`, never past it.
/// Returns the new value and whether it now sits on the target.
pub fn clamp_toward(current: f64, target: f64, step: f64) -> (f64, bool) {
    let next = if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    };
    (next, next == target)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
