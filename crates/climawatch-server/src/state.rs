use climawatch_core::{Result, SequencerSettings, Settings};
use climawatch_providers::{ThingSpeakClient, TwilioGateway};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state passed to all route handlers.
///
/// Everything here is fixed at startup except `stabilize_guard`, which is
/// held for the duration of a `/stabilize` run.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub feed: ThingSpeakClient,
    pub messenger: TwilioGateway,
    pub sequencer: SequencerSettings,
    pub stabilize_guard: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self> {
        let feed = ThingSpeakClient::new(settings.feed.clone(), settings.request_timeout)?;
        let messenger = TwilioGateway::new(settings.messaging.clone(), settings.request_timeout)?;
        Ok(Self {
            settings: Arc::new(settings),
            feed,
            messenger,
            sequencer: SequencerSettings::default(),
            stabilize_guard: Arc::new(Mutex::new(())),
        })
    }

    /// Override the step size, iteration cap or pacing of stabilization runs.
    pub fn with_sequencer(mut self, sequencer: SequencerSettings) -> Self {
        self.sequencer = sequencer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn new_state_uses_default_sequencer() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        let state = AppState::new(settings).unwrap();
        assert_eq!(state.sequencer.max_iterations, 20);
        assert_eq!(state.sequencer.step_delay, Duration::from_secs(16));
    }

    #[test]
    fn with_sequencer_overrides_pacing() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        let state = AppState::new(settings).unwrap().with_sequencer(SequencerSettings {
            step_delay: Duration::ZERO,
            ..Default::default()
        });
        assert_eq!(state.sequencer.step_delay, Duration::ZERO);
    }
}
