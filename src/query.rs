//! Query/filter engine over activity records
//!
//! Pure functions: the store hands in its records under a read lock and gets
//! back owned, newest-first results.

use crate::types::{ActivityFilter, ActivityRecord};

impl ActivityFilter {
    /// Whether a record satisfies every present predicate
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        let user_id = self.user_id.as_deref().filter(|u| !u.trim().is_empty());
        if let Some(user_id) = user_id {
            if !record.is_by(user_id) {
                return false;
            }
        }
        if let Some(action) = self.action {
            if record.action != action {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if record.severity != severity {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if record.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if record.timestamp > end {
                return false;
            }
        }
        true
    }

    /// Effective limit, falling back to `default` when unset or zero
    pub fn effective_limit(&self, default: usize) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => default,
        }
    }
}

/// Select matching records, newest first, truncated to `limit`
///
/// The sort is stable, so records sharing a timestamp keep their insertion
/// order.
pub fn select<'a, I, P>(records: I, predicate: P, limit: usize) -> Vec<ActivityRecord>
where
    I: IntoIterator<Item = &'a ActivityRecord>,
    P: Fn(&ActivityRecord) -> bool,
{
    let mut matched: Vec<&ActivityRecord> =
        records.into_iter().filter(|&r| predicate(r)).collect();
    matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matched.into_iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::severity_of;
    use crate::types::{ActivityAction, Outcome, Severity};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn record(id: &str, user: Option<&str>, action: ActivityAction, minute: i64) -> ActivityRecord {
        ActivityRecord {
            id: id.to_string(),
            timestamp: base() + Duration::minutes(minute),
            actor_user_id: user.map(str::to_string),
            actor_email: None,
            actor_role: None,
            action,
            resource_type: "appointment".to_string(),
            resource_id: None,
            source_address: "unknown".to_string(),
            agent_string: "unknown".to_string(),
            detail: None,
            outcome: Outcome::Success,
            severity: severity_of(action),
        }
    }

    fn sample() -> Vec<ActivityRecord> {
        vec![
            record("a", Some("alice"), ActivityAction::LoginSuccess, 0),
            record("b", Some("bob"), ActivityAction::LoginFailed, 5),
            record("c", Some("alice"), ActivityAction::AccountDeleted, 10),
            record("d", None, ActivityAction::AppointmentCreated, 15),
            record("e", Some("alice"), ActivityAction::LoginSuccess, 20),
        ]
    }

    fn ids(records: &[ActivityRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let records = sample();
        let filter = ActivityFilter::new();
        let out = select(&records, |r| filter.matches(r), 100);
        assert_eq!(ids(&out), vec!["e", "d", "c", "b", "a"]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let records = sample();
        let filter = ActivityFilter::new()
            .user("alice")
            .action(ActivityAction::LoginSuccess);
        let out = select(&records, |r| filter.matches(r), 100);
        assert_eq!(ids(&out), vec!["e", "a"]);

        let filter = ActivityFilter::new().user("alice").severity(Severity::Critical);
        let out = select(&records, |r| filter.matches(r), 100);
        assert_eq!(ids(&out), vec!["c"]);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let records = sample();
        let filter = ActivityFilter::new()
            .since(base() + Duration::minutes(5))
            .until(base() + Duration::minutes(15));
        let out = select(&records, |r| filter.matches(r), 100);
        assert_eq!(ids(&out), vec!["d", "c", "b"]);
    }

    #[test]
    fn test_empty_user_filter_imposes_no_constraint() {
        let records = sample();
        let filter = ActivityFilter::new().user("");
        assert!(filter.user_id.is_none());
        assert_eq!(select(&records, |r| filter.matches(r), 100).len(), 5);

        // Deserialized filters skip the builder
        let filter: ActivityFilter =
            serde_json::from_str(r#"{"userId": " ", "action": "login_success"}"#).unwrap();
        let out = select(&records, |r| filter.matches(r), 100);
        assert_eq!(ids(&out), vec!["e", "a"]);
    }

    #[test]
    fn test_anonymous_records_never_match_user_filter() {
        let records = sample();
        let filter = ActivityFilter::new().user("alice");
        let out = select(&records, |r| filter.matches(r), 100);
        assert!(out.iter().all(|r| r.actor_user_id.is_some()));
    }

    #[test]
    fn test_limit_truncates_newest_first() {
        let records = sample();
        let out = select(&records, |_| true, 2);
        assert_eq!(ids(&out), vec!["e", "d"]);
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let records = vec![
            record("first", Some("u"), ActivityAction::Logout, 1),
            record("second", Some("u"), ActivityAction::Logout, 1),
            record("third", Some("u"), ActivityAction::Logout, 1),
        ];
        let out = select(&records, |_| true, 10);
        assert_eq!(ids(&out), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_effective_limit() {
        assert_eq!(ActivityFilter::new().effective_limit(100), 100);
        assert_eq!(ActivityFilter::new().limit(0).effective_limit(100), 100);
        assert_eq!(ActivityFilter::new().limit(7).effective_limit(100), 7);
    }
}
