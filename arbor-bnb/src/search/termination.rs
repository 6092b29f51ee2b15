//! Search termination control.

use std::fmt;
use std::time::{Duration, Instant};

use crate::model::BnbStatus;
use crate::settings::BnbSettings;

/// Why the search stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Wall-clock limit reached.
    TimeLimit,

    /// Processed-node limit reached.
    NodeLimit,
}

impl TerminationReason {
    /// Status reported for a search stopped for this reason.
    pub fn status(self) -> BnbStatus {
        match self {
            TerminationReason::TimeLimit => BnbStatus::TimeLimitReached,
            TerminationReason::NodeLimit => BnbStatus::NodeLimitReached,
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::TimeLimit => write!(f, "time limit"),
            TerminationReason::NodeLimit => write!(f, "node limit"),
        }
    }
}

/// Tracks elapsed time and processed nodes against the configured limits.
///
/// Consulted before every pop; it never interrupts a node in progress.
#[derive(Debug, Clone)]
pub struct TerminationController {
    start: Instant,
    time_limit: Option<Duration>,
    node_limit: Option<u64>,
}

impl TerminationController {
    /// Start the clock now.
    pub fn new(time_limit: Option<Duration>, node_limit: Option<u64>) -> Self {
        Self {
            start: Instant::now(),
            time_limit,
            node_limit,
        }
    }

    /// Controller for the limits in `settings`, clock started now.
    pub fn from_settings(settings: &BnbSettings) -> Self {
        Self::new(settings.time_limit_duration(), settings.node_limit)
    }

    /// Time since the controller was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Check the limits. The time limit is checked first.
    pub fn check(&self, nodes_processed: u64) -> Option<TerminationReason> {
        if let Some(limit) = self.time_limit {
            if self.elapsed() >= limit {
                return Some(TerminationReason::TimeLimit);
            }
        }
        if let Some(limit) = self.node_limit {
            if nodes_processed >= limit {
                return Some(TerminationReason::NodeLimit);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_limits() {
        let ctl = TerminationController::new(None, None);
        assert_eq!(ctl.check(0), None);
        assert_eq!(ctl.check(u64::MAX), None);
    }

    #[test]
    fn test_node_limit() {
        let ctl = TerminationController::new(None, Some(3));
        assert_eq!(ctl.check(2), None);
        assert_eq!(ctl.check(3), Some(TerminationReason::NodeLimit));

        // Zero means nothing may be processed
        let ctl = TerminationController::new(None, Some(0));
        assert_eq!(ctl.check(0), Some(TerminationReason::NodeLimit));
    }

    #[test]
    fn test_time_limit_wins() {
        let ctl = TerminationController::new(Some(Duration::ZERO), Some(0));
        assert_eq!(ctl.check(0), Some(TerminationReason::TimeLimit));

        let ctl = TerminationController::new(Some(Duration::from_secs(3600)), None);
        assert_eq!(ctl.check(1_000_000), None);
    }

    #[test]
    fn test_from_settings() {
        let settings = BnbSettings::default().with_node_limit(5);
        let ctl = TerminationController::from_settings(&settings);
        assert_eq!(ctl.check(5), Some(TerminationReason::NodeLimit));
        assert_eq!(TerminationReason::NodeLimit.status(), BnbStatus::NodeLimitReached);
        assert_eq!(TerminationReason::TimeLimit.status(), BnbStatus::TimeLimitReached);
    }
}
