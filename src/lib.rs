//! # a3s-activity
//!
//! Activity audit log with severity classification, bounded retention,
//! suspicious-activity detection, and data-subject export/erasure.
//!
//! ## Overview
//!
//! Request handlers record one entry per significant action (logins, account
//! changes, appointments, admin operations). The log classifies each entry,
//! keeps a bounded in-memory history, and answers filtered queries and
//! per-user detection, export, and erasure requests. Recording never fails,
//! so audit logging cannot block the operation it observes.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_activity::{ActivityAction, ActivityLog, Actor, LoggerConfig, NewActivity, RequestOrigin};
//!
//! # fn example() -> a3s_activity::Result<()> {
//! let log = ActivityLog::new(LoggerConfig::default())?;
//!
//! let record = log.append(
//!     NewActivity::new(ActivityAction::LoginFailed, "session")
//!         .actor(Actor::user("u-42").with_email("client@example.com"))
//!         .origin(RequestOrigin::from_request_parts(
//!             Some("203.0.113.9, 10.0.0.1"),
//!             None,
//!             Some("Mozilla/5.0"),
//!         )),
//! );
//! assert_eq!(record.source_address, "203.0.113.9");
//!
//! let report = log.detect_suspicious_activity("u-42");
//! assert!(!report.is_suspicious);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Architecture
//!
//! - **ActivityLog** — the store: append, archival, query, export, erasure
//! - **classify** — action kind → severity
//! - **SuspicionDetector** — heuristics over a user's recent records
//! - **ActivitySink** trait — observer for recorded/archived/erased entries
//! - **Clock** trait — time source for timestamps and detection windows

pub mod classify;
pub mod clock;
pub mod config;
pub mod detector;
pub mod error;
pub mod origin;
pub mod query;
pub mod sink;
pub mod store;
pub mod types;

// Re-export core types
pub use classify::{severity_of, severity_of_str};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DetectorConfig, LoggerConfig};
pub use detector::{SuspicionDetector, SuspicionReason, SuspicionReport};
pub use error::{ActivityError, Result};
pub use origin::{redact_detail, RequestOrigin};
pub use sink::{ActivitySink, ChannelSink, MemorySink, NullSink, SinkEvent, TracingSink};
pub use store::ActivityLog;
pub use types::{
    ActionDomain, ActivityAction, ActivityFilter, ActivityRecord, ActivityStats, Actor,
    NewActivity, Outcome, Severity, UserActivityExport,
};
