use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the simulated operations performed by
/// [Actions](crate::Actions).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long every simulated fetch, save or remove takes.
    pub latency: Duration,
    /// Fail operations which take longer than this. `None` waits
    /// forever.
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(500),
            timeout: None,
        }
    }
}
