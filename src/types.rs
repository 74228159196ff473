use std::str::FromStr;

use serde::Deserialize;

/// How the supervisor suspends between reap passes.
///
/// - `Poll`: sleep a fixed `poll_interval`, then re-check every active job
///   (default).
/// - `Notify`: wait until any active job exits, then re-check. Same outcomes
///   and launch order as `Poll`, lower completion latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WaitMode {
    #[default]
    Poll,
    Notify,
}

impl FromStr for WaitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "poll" => Ok(WaitMode::Poll),
            "notify" => Ok(WaitMode::Notify),
            other => Err(format!(
                "invalid wait_mode: {other} (expected \"poll\" or \"notify\")"
            )),
        }
    }
}

/// A `date` value as written in the batch config.
///
/// Both `date = 20240115` and `date = "2024-01-15"` are accepted; the value is
/// only ever used as text inside templates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Number(i64),
    Text(String),
}

impl Default for DateValue {
    fn default() -> Self {
        DateValue::Text(String::new())
    }
}

impl DateValue {
    pub fn as_text(&self) -> String {
        match self {
            DateValue::Number(n) => n.to_string(),
            DateValue::Text(s) => s.clone(),
        }
    }
}
