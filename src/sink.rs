//! Activity sinks — observers of recorded, archived and erased entries
//!
//! The log itself performs no I/O. Every finished record, every archival
//! pass and every erasure is handed to an `ActivitySink`, which decides
//! whether to print, collect or forward it.

use crate::types::{ActivityRecord, Severity};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;

/// Trait for activity log observers
///
/// Callbacks run synchronously after the log releases its lock. They must
/// not fail; a sink that cannot deliver drops the notification.
pub trait ActivitySink: Send + Sync {
    /// A record was appended
    fn record(&self, record: &ActivityRecord);

    /// An archival pass discarded these records
    fn archived(&self, discarded: &[ActivityRecord]) {
        let _ = discarded;
    }

    /// All records of a user were erased
    fn erased(&self, user_id: &str, count: usize) {
        let _ = (user_id, count);
    }
}

/// Sink that renders human-readable lines through `tracing`
///
/// Low and medium records log at info, high at warn, critical at error with
/// an additional security alert line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ActivitySink for TracingSink {
    fn record(&self, record: &ActivityRecord) {
        let line = record.summary_line();
        match record.severity {
            Severity::Low | Severity::Medium => tracing::info!(
                id = %record.id,
                action = %record.action,
                severity = %record.severity,
                "{}",
                line
            ),
            Severity::High => tracing::warn!(
                id = %record.id,
                action = %record.action,
                severity = %record.severity,
                "{}",
                line
            ),
            Severity::Critical => {
                tracing::error!(
                    id = %record.id,
                    action = %record.action,
                    severity = %record.severity,
                    "{}",
                    line
                );
                tracing::error!(
                    "{} SECURITY ALERT: {} by {} from {}",
                    Severity::Critical.marker(),
                    record.action,
                    record.actor_email.as_deref().unwrap_or("anonymous"),
                    record.source_address
                );
            }
        }
    }

    fn archived(&self, discarded: &[ActivityRecord]) {
        tracing::info!(
            count = discarded.len(),
            "[ARCHIVE] Archived {} old activity logs",
            discarded.len()
        );
    }

    fn erased(&self, user_id: &str, count: usize) {
        tracing::info!(
            user_id = %user_id,
            count,
            "[GDPR] Deleted {} activity logs for user {}",
            count,
            user_id
        );
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ActivitySink for NullSink {
    fn record(&self, _record: &ActivityRecord) {}
}

/// Notification captured by `MemorySink` or forwarded by `ChannelSink`
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Recorded(ActivityRecord),
    Archived(Vec<ActivityRecord>),
    Erased { user_id: String, count: usize },
}

/// In-memory sink for development and testing
///
/// Clones share the same buffer, so a test can keep a handle while the log
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<RwLock<Vec<SinkEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured notifications, oldest first
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records seen by `record`, oldest first
    pub fn recorded(&self) -> Vec<ActivityRecord> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Recorded(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Number of archival passes observed
    pub fn archival_passes(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, SinkEvent::Archived(_)))
            .count()
    }

    fn push(&self, event: SinkEvent) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl ActivitySink for MemorySink {
    fn record(&self, record: &ActivityRecord) {
        self.push(SinkEvent::Recorded(record.clone()));
    }

    fn archived(&self, discarded: &[ActivityRecord]) {
        self.push(SinkEvent::Archived(discarded.to_vec()));
    }

    fn erased(&self, user_id: &str, count: usize) {
        self.push(SinkEvent::Erased {
            user_id: user_id.to_string(),
            count,
        });
    }
}

/// Sink that forwards notifications to an async consumer
///
/// Lets a task outside the log persist archived records or stream activity
/// elsewhere. Sending never blocks; once the receiver is dropped,
/// notifications are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver for its notifications
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: SinkEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Activity channel closed, dropping notification");
        }
    }
}

impl ActivitySink for ChannelSink {
    fn record(&self, record: &ActivityRecord) {
        self.forward(SinkEvent::Recorded(record.clone()));
    }

    fn archived(&self, discarded: &[ActivityRecord]) {
        self.forward(SinkEvent::Archived(discarded.to_vec()));
    }

    fn erased(&self, user_id: &str, count: usize) {
        self.forward(SinkEvent::Erased {
            user_id: user_id.to_string(),
            count,
        });
    }
}

impl<S: ActivitySink + ?Sized> ActivitySink for Arc<S> {
    fn record(&self, record: &ActivityRecord) {
        (**self).record(record)
    }

    fn archived(&self, discarded: &[ActivityRecord]) {
        (**self).archived(discarded)
    }

    fn erased(&self, user_id: &str, count: usize) {
        (**self).erased(user_id, count)
    }
}
