//! In-memory activity log with size-bounded retention
//!
//! `ActivityLog` is the composition point: it assigns ids and timestamps,
//! classifies, keeps the bounded history, and answers queries, detection,
//! export and erasure requests. Construct one at startup and share it
//! (`Arc<ActivityLog>`) with every handler that records activity.

use crate::classify::severity_of;
use crate::clock::{Clock, SystemClock};
use crate::config::LoggerConfig;
use crate::detector::{SuspicionDetector, SuspicionReport};
use crate::error::Result;
use crate::origin::{or_unknown, redact_detail};
use crate::query::select;
use crate::sink::{ActivitySink, TracingSink};
use crate::types::{
    non_empty, ActivityFilter, ActivityRecord, ActivityStats, NewActivity, UserActivityExport,
};
use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Bounded, classified activity history
///
/// Thread-safe via a single internal lock: appends, archival and erasure are
/// mutually exclusive, queries share read access. Sink callbacks run after
/// the lock is released.
pub struct ActivityLog {
    config: LoggerConfig,
    detector: SuspicionDetector,
    state: RwLock<LogState>,
    sink: Box<dyn ActivitySink>,
    clock: Box<dyn Clock>,
}

#[derive(Default)]
struct LogState {
    /// Held records, in insertion order
    records: Vec<ActivityRecord>,

    /// Last assigned timestamp, so timestamps never step backwards
    last_timestamp: Option<DateTime<Utc>>,

    archival_passes: u64,
    archived_total: u64,
    erased_total: u64,
}

impl LogState {
    /// Keep the `retain` most recent records, returning the rest
    ///
    /// Ranking is a stable newest-first sort, so among equal timestamps the
    /// earlier insertion ranks higher. Survivors keep their insertion order.
    fn archive(&mut self, retain: usize) -> Vec<ActivityRecord> {
        let mut ranking: Vec<usize> = (0..self.records.len()).collect();
        ranking.sort_by(|&a, &b| self.records[b].timestamp.cmp(&self.records[a].timestamp));

        let mut keep = vec![false; self.records.len()];
        for &index in ranking.iter().take(retain) {
            keep[index] = true;
        }

        let records = std::mem::take(&mut self.records);
        let mut kept = Vec::with_capacity(retain);
        let mut discarded = Vec::with_capacity(records.len().saturating_sub(retain));
        for (record, keep) in records.into_iter().zip(keep) {
            if keep {
                kept.push(record);
            } else {
                discarded.push(record);
            }
        }

        self.records = kept;
        self.archival_passes += 1;
        self.archived_total += discarded.len() as u64;
        discarded
    }
}

impl ActivityLog {
    /// Create a log from a validated configuration
    ///
    /// Uses the system clock and the tracing sink; swap them with
    /// `with_clock` / `with_sink`.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            detector: SuspicionDetector::new(config.detector.clone()),
            config,
            state: RwLock::new(LogState::default()),
            sink: Box::new(TracingSink),
            clock: Box::new(SystemClock),
        })
    }

    /// Replace the sink receiving recorded, archived and erased notifications
    pub fn with_sink(mut self, sink: impl ActivitySink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Record an action
    ///
    /// Assigns id and timestamp, derives severity, normalizes blank identity
    /// fields to absent and blank origin fields to "unknown", redacts
    /// secret-looking detail keys, and runs an archival pass if the log grew past
    /// `max_records`. Never fails; the finished record is returned for
    /// callers that want it.
    pub fn append(&self, entry: NewActivity) -> ActivityRecord {
        let NewActivity {
            action,
            resource_type,
            resource_id,
            actor,
            origin,
            detail,
            outcome,
        } = entry;

        let detail = if self.config.redact_detail {
            detail.map(redact_detail)
        } else {
            detail
        };

        let (record, discarded) = {
            let mut state = self.write();

            let now = self.clock.now();
            let timestamp = match state.last_timestamp {
                Some(last) if last > now => last,
                _ => now,
            };
            state.last_timestamp = Some(timestamp);

            let record = ActivityRecord {
                id: format!("log-{}", uuid::Uuid::new_v4()),
                timestamp,
                actor_user_id: actor.user_id.and_then(non_empty),
                actor_email: actor.email.and_then(non_empty),
                actor_role: actor.role.and_then(non_empty),
                action,
                resource_type,
                resource_id: resource_id.and_then(non_empty),
                source_address: or_unknown(Some(&origin.source_address)),
                agent_string: or_unknown(Some(&origin.agent_string)),
                detail,
                outcome,
                severity: severity_of(action),
            };
            state.records.push(record.clone());

            let discarded = if state.records.len() > self.config.max_records {
                Some(state.archive(self.config.retained_records))
            } else {
                None
            };
            (record, discarded)
        };

        self.sink.record(&record);
        if let Some(discarded) = discarded {
            self.sink.archived(&discarded);
        }
        record
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    /// A user's records, newest first
    ///
    /// `limit` of `None` or 0 uses `user_query_limit`.
    pub fn query_by_user(&self, user_id: &str, limit: Option<usize>) -> Vec<ActivityRecord> {
        let limit = match limit {
            Some(limit) if limit > 0 => limit,
            _ => self.config.user_query_limit,
        };
        let state = self.read();
        select(&state.records, |r| r.is_by(user_id), limit)
    }

    /// Records matching every present filter field, newest first
    pub fn query(&self, filter: &ActivityFilter) -> Vec<ActivityRecord> {
        let limit = filter.effective_limit(self.config.query_limit);
        let state = self.read();
        select(&state.records, |r| filter.matches(r), limit)
    }

    /// Run the suspicious-activity heuristics for a user at the current time
    pub fn detect_suspicious_activity(&self, user_id: &str) -> SuspicionReport {
        let sample = self.query_by_user(user_id, Some(self.detector.config().sample_size));
        let report = self.detector.evaluate(&sample, self.clock.now());
        if report.is_suspicious {
            tracing::warn!(
                user_id = %user_id,
                reasons = ?report.messages(),
                "Suspicious activity detected"
            );
        }
        report
    }

    /// Every held record of a user, newest first, without truncation
    pub fn export_for_user(&self, user_id: &str) -> Vec<ActivityRecord> {
        let state = self.read();
        select(&state.records, |r| r.is_by(user_id), usize::MAX)
    }

    /// Data-portability bundle of a user's records as pretty JSON
    pub fn export_json_for_user(&self, user_id: &str) -> Result<String> {
        let records = self.export_for_user(user_id);
        let bundle = UserActivityExport {
            user_id: user_id.to_string(),
            exported_at: self.clock.now(),
            record_count: records.len(),
            records,
        };
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Permanently remove every record of a user, returning how many
    ///
    /// The erasure is reported to the sink but not recorded in the log.
    pub fn erase_for_user(&self, user_id: &str) -> usize {
        let erased = {
            let mut state = self.write();
            let before = state.records.len();
            state.records.retain(|r| !r.is_by(user_id));
            let erased = before - state.records.len();
            state.erased_total += erased as u64;
            erased
        };

        self.sink.erased(user_id, erased);
        erased
    }

    /// Snapshot of held records and retention counters
    pub fn stats(&self) -> ActivityStats {
        let state = self.read();
        let mut stats = ActivityStats {
            total: state.records.len() as u64,
            archival_passes: state.archival_passes,
            archived_total: state.archived_total,
            erased_total: state.erased_total,
            ..ActivityStats::default()
        };
        for record in &state.records {
            *stats.by_severity.entry(record.severity).or_insert(0) += 1;
        }
        stats
    }

    fn read(&self) -> RwLockReadGuard<'_, LogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        let config = LoggerConfig::default();
        Self {
            detector: SuspicionDetector::new(config.detector.clone()),
            config,
            state: RwLock::new(LogState::default()),
            sink: Box::new(TracingSink),
            clock: Box::new(SystemClock),
        }
    }
}
