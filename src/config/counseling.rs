//! Counseling flow configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Turn shaping and completion-call pacing
#[derive(Debug, Clone, Deserialize)]
pub struct CounselingConfig {
    /// Turns of history shown in prompts
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,

    /// Expert calls in flight per turn (1 = sequential)
    #[serde(default = "default_analysis_concurrency")]
    pub analysis_concurrency: usize,

    /// Token bucket refill rate across all calls (0 disables the bucket)
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Token bucket capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Completion calls in flight across all sessions
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl CounselingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.analysis_concurrency == 0 {
            return Err(ValidationError::MustBePositive("analysis_concurrency"));
        }
        if self.burst == 0 {
            return Err(ValidationError::MustBePositive("burst"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ValidationError::MustBePositive("max_concurrent_requests"));
        }
        Ok(())
    }
}

impl Default for CounselingConfig {
    fn default() -> Self {
        Self {
            max_history_turns: default_max_history_turns(),
            analysis_concurrency: default_analysis_concurrency(),
            requests_per_minute: default_requests_per_minute(),
            burst: default_burst(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

fn default_max_history_turns() -> usize {
    10
}

fn default_analysis_concurrency() -> usize {
    3
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_burst() -> u32 {
    5
}

fn default_max_concurrent_requests() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counseling_defaults() {
        let config = CounselingConfig::default();
        assert_eq!(config.max_history_turns, 10);
        assert_eq!(config.analysis_concurrency, 3);
        assert_eq!(config.requests_per_minute, 60);
        assert_eq!(config.burst, 5);
        assert_eq!(config.max_concurrent_requests, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = CounselingConfig {
            analysis_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MustBePositive("analysis_concurrency"))
        ));
    }

    #[test]
    fn test_zero_history_turns_allowed() {
        let config = CounselingConfig {
            max_history_turns: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
