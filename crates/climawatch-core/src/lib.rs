pub mod error;
pub mod reading;
pub mod reply;
pub mod sequencer;
pub mod settings;
pub mod thresholds;

pub use error::{ClimaError, Result};
pub use reading::Reading;
pub use sequencer::{FeedWriter, SequencerSettings, StabilizationReport};
pub use settings::Settings;
pub use thresholds::{assess, CriticalAssessment, ThresholdConfig};
