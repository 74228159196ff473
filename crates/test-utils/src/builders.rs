#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use vcf_batch::config::SupervisorConfig;
use vcf_batch::types::WaitMode;
use vcf_batch::worklist::WorkItem;

/// Builder for `SupervisorConfig` with a test-friendly 5ms poll interval.
pub struct SupervisorConfigBuilder {
    config: SupervisorConfig,
}

impl SupervisorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SupervisorConfig {
                poll_interval: Duration::from_millis(5),
                ..SupervisorConfig::default()
            },
        }
    }

    /// Goes through the same clamping as the config file.
    pub fn max_workers(mut self, requested: i64) -> Self {
        self.config = self.config.with_max_workers(requested);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn wait_mode(mut self, mode: WaitMode) -> Self {
        self.config.wait_mode = mode;
        self
    }

    pub fn max_poll_errors(mut self, n: u32) -> Self {
        self.config.max_poll_errors = n;
        self
    }

    pub fn build(self) -> SupervisorConfig {
        self.config
    }
}

impl Default for SupervisorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `/fake/in/<name>` → `destination` for every name, in order.
pub fn work_items(names: &[&str], destination: impl AsRef<Path>) -> Vec<WorkItem> {
    names
        .iter()
        .map(|name| WorkItem::new(format!("/fake/in/{name}"), destination.as_ref()))
        .collect()
}

/// `item0.vcf`, `item1.vcf`, ...
pub fn numbered_items(n: usize, destination: impl AsRef<Path>) -> Vec<WorkItem> {
    (0..n)
        .map(|i| WorkItem::new(format!("/fake/in/item{i}.vcf"), destination.as_ref()))
        .collect()
}
