//! Suspicious-activity detection over a user's recent records
//!
//! Three independent heuristics, evaluated in a fixed order against the
//! evaluation time (not insertion time), so the verdict for a static log
//! changes as time passes. Nothing is cached.

use crate::config::DetectorConfig;
use crate::types::{ActivityAction, ActivityRecord, Severity};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A triggered heuristic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum SuspicionReason {
    /// Too many failed logins inside the window
    FailedLoginBurst { count: usize, window_minutes: i64 },
    /// Too many distinct source addresses inside the window
    SourceDiversity { count: usize, window_minutes: i64 },
    /// Too many critical actions inside the window
    CriticalActionBurst { count: usize, window_minutes: i64 },
}

impl fmt::Display for SuspicionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuspicionReason::FailedLoginBurst {
                count,
                window_minutes,
            } => write!(
                f,
                "{} failed login attempts in the last {} minutes",
                count, window_minutes
            ),
            SuspicionReason::SourceDiversity {
                count,
                window_minutes,
            } => write!(
                f,
                "Activity from {} different source addresses in the last {} minutes",
                count, window_minutes
            ),
            SuspicionReason::CriticalActionBurst {
                count,
                window_minutes,
            } => write!(
                f,
                "{} critical actions in the last {} minutes",
                count, window_minutes
            ),
        }
    }
}

/// Verdict of a detection pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspicionReport {
    pub is_suspicious: bool,

    /// Triggered heuristics, in evaluation order
    pub reasons: Vec<SuspicionReason>,
}

impl SuspicionReport {
    /// Human-readable reason strings
    pub fn messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

/// Heuristic evaluator
#[derive(Debug, Clone, Default)]
pub struct SuspicionDetector {
    config: DetectorConfig,
}

impl SuspicionDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Evaluate a user's recent records at time `now`
    ///
    /// `records` is expected to be one user's newest-first sample; only the
    /// first `sample_size` entries are considered.
    pub fn evaluate(&self, records: &[ActivityRecord], now: DateTime<Utc>) -> SuspicionReport {
        let cfg = &self.config;
        let sample = &records[..records.len().min(cfg.sample_size)];
        let mut reasons = Vec::new();

        let failed_logins = sample
            .iter()
            .filter(|r| r.action == ActivityAction::LoginFailed)
            .filter(|r| is_recent(r, now, cfg.failed_login_window_minutes))
            .count();
        if failed_logins >= cfg.failed_login_threshold {
            reasons.push(SuspicionReason::FailedLoginBurst {
                count: failed_logins,
                window_minutes: cfg.failed_login_window_minutes,
            });
        }

        let sources: HashSet<&str> = sample
            .iter()
            .filter(|r| is_recent(r, now, cfg.source_window_minutes))
            .map(|r| r.source_address.as_str())
            .collect();
        if sources.len() >= cfg.distinct_source_threshold {
            reasons.push(SuspicionReason::SourceDiversity {
                count: sources.len(),
                window_minutes: cfg.source_window_minutes,
            });
        }

        let critical = sample
            .iter()
            .filter(|r| r.severity == Severity::Critical)
            .filter(|r| is_recent(r, now, cfg.critical_window_minutes))
            .count();
        if critical >= cfg.critical_action_threshold {
            reasons.push(SuspicionReason::CriticalActionBurst {
                count: critical,
                window_minutes: cfg.critical_window_minutes,
            });
        }

        SuspicionReport {
            is_suspicious: !reasons.is_empty(),
            reasons,
        }
    }
}

/// A record is recent when no more than `minutes` have elapsed since it
///
/// A window too large to represent covers every record.
fn is_recent(record: &ActivityRecord, now: DateTime<Utc>, minutes: i64) -> bool {
    match Duration::try_minutes(minutes) {
        Some(window) => now.signed_duration_since(record.timestamp) <= window,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::severity_of;
    use crate::types::Outcome;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 14, 0, 0).unwrap()
    }

    fn record(action: ActivityAction, minutes_ago: i64, source: &str) -> ActivityRecord {
        ActivityRecord {
            id: format!("log-{}", uuid::Uuid::new_v4()),
            timestamp: now() - Duration::minutes(minutes_ago),
            actor_user_id: Some("u-1".to_string()),
            actor_email: None,
            actor_role: None,
            action,
            resource_type: "user".to_string(),
            resource_id: None,
            source_address: source.to_string(),
            agent_string: "unknown".to_string(),
            detail: None,
            outcome: Outcome::Failure,
            severity: severity_of(action),
        }
    }

    fn detector() -> SuspicionDetector {
        SuspicionDetector::default()
    }

    #[test]
    fn test_no_records_not_suspicious() {
        let report = detector().evaluate(&[], now());
        assert!(!report.is_suspicious);
        assert!(report.reasons.is_empty());
    }

    #[test]
    fn test_failed_login_boundary() {
        let four: Vec<_> = (0..4)
            .map(|i| record(ActivityAction::LoginFailed, i * 2, "10.0.0.1"))
            .collect();
        assert!(!detector().evaluate(&four, now()).is_suspicious);

        let five: Vec<_> = (0..5)
            .map(|i| record(ActivityAction::LoginFailed, i * 2, "10.0.0.1"))
            .collect();
        let report = detector().evaluate(&five, now());
        assert!(report.is_suspicious);
        assert_eq!(
            report.reasons,
            vec![SuspicionReason::FailedLoginBurst {
                count: 5,
                window_minutes: 30
            }]
        );
        let message = &report.messages()[0];
        assert!(message.contains('5'));
        assert!(message.contains("30"));
    }

    #[test]
    fn test_failed_logins_outside_window_ignored() {
        let records: Vec<_> = (0..6)
            .map(|i| record(ActivityAction::LoginFailed, 31 + i, "10.0.0.1"))
            .collect();
        assert!(!detector().evaluate(&records, now()).is_suspicious);
    }

    #[test]
    fn test_window_edge_is_inclusive() {
        let records: Vec<_> = (0..5)
            .map(|_| record(ActivityAction::LoginFailed, 30, "10.0.0.1"))
            .collect();
        assert!(detector().evaluate(&records, now()).is_suspicious);
    }

    #[test]
    fn test_source_diversity_boundary() {
        let two = vec![
            record(ActivityAction::Logout, 1, "10.0.0.1"),
            record(ActivityAction::Logout, 2, "10.0.0.2"),
            record(ActivityAction::Logout, 3, "10.0.0.2"),
        ];
        assert!(!detector().evaluate(&two, now()).is_suspicious);

        let three = vec![
            record(ActivityAction::Logout, 1, "10.0.0.1"),
            record(ActivityAction::Logout, 20, "10.0.0.2"),
            record(ActivityAction::Logout, 59, "10.0.0.3"),
        ];
        let report = detector().evaluate(&three, now());
        assert_eq!(
            report.reasons,
            vec![SuspicionReason::SourceDiversity {
                count: 3,
                window_minutes: 60
            }]
        );
    }

    #[test]
    fn test_old_sources_not_counted() {
        let records = vec![
            record(ActivityAction::Logout, 1, "10.0.0.1"),
            record(ActivityAction::Logout, 2, "10.0.0.2"),
            record(ActivityAction::Logout, 61, "10.0.0.3"),
        ];
        assert!(!detector().evaluate(&records, now()).is_suspicious);
    }

    #[test]
    fn test_critical_action_burst() {
        let one = vec![record(ActivityAction::UserRoleChanged, 5, "10.0.0.1")];
        assert!(!detector().evaluate(&one, now()).is_suspicious);

        let two = vec![
            record(ActivityAction::UserRoleChanged, 5, "10.0.0.1"),
            record(ActivityAction::DataDeletionRequested, 10, "10.0.0.1"),
        ];
        let report = detector().evaluate(&two, now());
        assert_eq!(
            report.reasons,
            vec![SuspicionReason::CriticalActionBurst {
                count: 2,
                window_minutes: 60
            }]
        );
    }

    #[test]
    fn test_reasons_in_fixed_order() {
        let mut records: Vec<_> = (0..5)
            .map(|i| record(ActivityAction::LoginFailed, i, &format!("10.0.0.{}", i)))
            .collect();
        records.push(record(ActivityAction::AccountDeleted, 1, "10.0.0.1"));
        records.push(record(ActivityAction::MultipleFailedLogins, 1, "10.0.0.1"));

        let report = detector().evaluate(&records, now());
        assert!(report.is_suspicious);
        assert!(matches!(report.reasons[0], SuspicionReason::FailedLoginBurst { .. }));
        assert!(matches!(report.reasons[1], SuspicionReason::SourceDiversity { count: 5, .. }));
        assert!(matches!(report.reasons[2], SuspicionReason::CriticalActionBurst { count: 2, .. }));
    }

    #[test]
    fn test_sample_size_limits_considered_records() {
        let config = DetectorConfig {
            sample_size: 4,
            ..DetectorConfig::default()
        };
        let records: Vec<_> = (0..10)
            .map(|i| record(ActivityAction::LoginFailed, i, "10.0.0.1"))
            .collect();
        assert!(!SuspicionDetector::new(config).evaluate(&records, now()).is_suspicious);
    }

    #[test]
    fn test_verdict_changes_as_time_passes() {
        let records: Vec<_> = (0..5)
            .map(|_| record(ActivityAction::LoginFailed, 0, "10.0.0.1"))
            .collect();
        assert!(detector().evaluate(&records, now()).is_suspicious);
        assert!(!detector()
            .evaluate(&records, now() + Duration::minutes(31))
            .is_suspicious);
    }

    #[test]
    fn test_unrepresentable_window_covers_everything() {
        let config = DetectorConfig {
            failed_login_window_minutes: i64::MAX,
            source_window_minutes: i64::MAX,
            critical_window_minutes: i64::MAX,
            ..DetectorConfig::default()
        };
        let records: Vec<_> = (0..5)
            .map(|i| record(ActivityAction::LoginFailed, 100_000 * i, "10.0.0.1"))
            .collect();
        let report = SuspicionDetector::new(config).evaluate(&records, now());
        assert!(report.is_suspicious);
        assert!(matches!(
            report.reasons[0],
            SuspicionReason::FailedLoginBurst { count: 5, .. }
        ));
    }

    #[test]
    fn test_report_serialization() {
        let report = SuspicionReport {
            is_suspicious: true,
            reasons: vec![SuspicionReason::CriticalActionBurst {
                count: 2,
                window_minutes: 60,
            }],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"isSuspicious\":true"));
        assert!(json.contains("\"type\":\"criticalActionBurst\""));
        assert!(json.contains("\"windowMinutes\":60"));
    }
}
