use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Latest temperature/humidity pair reported by the feed.
///
/// Either value is `None` when the provider omitted the field or sent text
/// that is not a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub humidity: Option<i64>,
    pub temperature: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Reading {
    pub fn new(humidity: Option<i64>, temperature: Option<i64>, created_at: Option<String>) -> Self {
        Self {
            humidity,
            temperature,
            created_at,
        }
    }

    /// Build a reading from the raw text fields of one feed entry.
    pub fn from_fields(
        temperature: Option<&str>,
        humidity: Option<&str>,
        created_at: Option<String>,
    ) -> Self {
        Self {
            humidity: humidity.and_then(parse_field),
            temperature: temperature.and_then(parse_field),
            created_at,
        }
    }

    /// Both values, or `None` when the reading cannot be assessed.
    pub fn values(&self) -> Option<(i64, i64)> {
        Some((self.humidity?, self.temperature?))
    }
}

/// Parse a feed field as a float and truncate it toward zero.
///
/// `"23.7"` becomes 23, `"-4.9"` becomes -4. Non-finite values are rejected.
pub fn parse_field(raw: &str) -> Option<i64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.trunc() as i64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
