//! Daily activity aggregator configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Schedule and parallelism of the daily message count job.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    /// Run the scheduler in this process
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// UTC hour at which the previous day is counted
    #[serde(default = "default_run_hour")]
    pub run_hour_utc: u32,

    /// Groups scanned in parallel
    #[serde(default = "default_scan_concurrency")]
    pub scan_concurrency: usize,
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.run_hour_utc > 23 {
            return Err(ValidationError::InvalidRunHour);
        }
        if !(1..=64).contains(&self.scan_concurrency) {
            return Err(ValidationError::InvalidScanConcurrency);
        }
        Ok(())
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            run_hour_utc: default_run_hour(),
            scan_concurrency: default_scan_concurrency(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_run_hour() -> u32 {
    1
}

fn default_scan_concurrency() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_at_one_am_with_four_workers() {
        let config = AggregatorConfig::default();
        assert!(config.enabled);
        assert_eq!(config.run_hour_utc, 1);
        assert_eq!(config.scan_concurrency, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let config = AggregatorConfig {
            run_hour_utc: 24,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRunHour));

        let config = AggregatorConfig {
            scan_concurrency: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidScanConcurrency));
    }
}
