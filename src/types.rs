//! Core activity types for the a3s-activity log
//!
//! All types use camelCase JSON serialization; action names use their
//! snake_case wire form (e.g. `login_failed`, `2fa_disabled`).

use crate::error::ActivityError;
use crate::origin::RequestOrigin;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// An auditable action kind
///
/// Closed set: loosely typed action names are parsed with `FromStr` at the
/// boundary, so the log only ever holds known actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    // Authentication
    LoginSuccess,
    LoginFailed,
    Logout,
    PasswordResetRequested,
    PasswordChanged,
    #[serde(rename = "2fa_enabled")]
    TwoFactorEnabled,
    #[serde(rename = "2fa_disabled")]
    TwoFactorDisabled,
    #[serde(rename = "2fa_verified")]
    TwoFactorVerified,

    // Account lifecycle
    AccountCreated,
    AccountDeleted,
    AccountModified,
    ProfileUpdated,

    // Data-subject rights
    DataExported,
    ConsentUpdated,
    DataDeletionRequested,

    // Scheduling
    AppointmentCreated,
    AppointmentCancelled,
    AppointmentConfirmed,
    AppointmentModified,

    // Administration
    AdminAccess,
    ConfigModified,
    UserRoleChanged,
    BlogPostCreated,
    BlogPostModified,
    BlogPostDeleted,

    // Security
    SuspiciousActivity,
    MultipleFailedLogins,
    UnauthorizedAccessAttempt,
    ApiRateLimitExceeded,
}

/// Functional grouping of action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionDomain {
    Authentication,
    Account,
    DataRights,
    Scheduling,
    Administration,
    Security,
}

impl ActivityAction {
    /// Every action kind, in declaration order
    pub const ALL: [ActivityAction; 29] = [
        ActivityAction::LoginSuccess,
        ActivityAction::LoginFailed,
        ActivityAction::Logout,
        ActivityAction::PasswordResetRequested,
        ActivityAction::PasswordChanged,
        ActivityAction::TwoFactorEnabled,
        ActivityAction::TwoFactorDisabled,
        ActivityAction::TwoFactorVerified,
        ActivityAction::AccountCreated,
        ActivityAction::AccountDeleted,
        ActivityAction::AccountModified,
        ActivityAction::ProfileUpdated,
        ActivityAction::DataExported,
        ActivityAction::ConsentUpdated,
        ActivityAction::DataDeletionRequested,
        ActivityAction::AppointmentCreated,
        ActivityAction::AppointmentCancelled,
        ActivityAction::AppointmentConfirmed,
        ActivityAction::AppointmentModified,
        ActivityAction::AdminAccess,
        ActivityAction::ConfigModified,
        ActivityAction::UserRoleChanged,
        ActivityAction::BlogPostCreated,
        ActivityAction::BlogPostModified,
        ActivityAction::BlogPostDeleted,
        ActivityAction::SuspiciousActivity,
        ActivityAction::MultipleFailedLogins,
        ActivityAction::UnauthorizedAccessAttempt,
        ActivityAction::ApiRateLimitExceeded,
    ];

    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::LoginSuccess => "login_success",
            ActivityAction::LoginFailed => "login_failed",
            ActivityAction::Logout => "logout",
            ActivityAction::PasswordResetRequested => "password_reset_requested",
            ActivityAction::PasswordChanged => "password_changed",
            ActivityAction::TwoFactorEnabled => "2fa_enabled",
            ActivityAction::TwoFactorDisabled => "2fa_disabled",
            ActivityAction::TwoFactorVerified => "2fa_verified",
            ActivityAction::AccountCreated => "account_created",
            ActivityAction::AccountDeleted => "account_deleted",
            ActivityAction::AccountModified => "account_modified",
            ActivityAction::ProfileUpdated => "profile_updated",
            ActivityAction::DataExported => "data_exported",
            ActivityAction::ConsentUpdated => "consent_updated",
            ActivityAction::DataDeletionRequested => "data_deletion_requested",
            ActivityAction::AppointmentCreated => "appointment_created",
            ActivityAction::AppointmentCancelled => "appointment_cancelled",
            ActivityAction::AppointmentConfirmed => "appointment_confirmed",
            ActivityAction::AppointmentModified => "appointment_modified",
            ActivityAction::AdminAccess => "admin_access",
            ActivityAction::ConfigModified => "config_modified",
            ActivityAction::UserRoleChanged => "user_role_changed",
            ActivityAction::BlogPostCreated => "blog_post_created",
            ActivityAction::BlogPostModified => "blog_post_modified",
            ActivityAction::BlogPostDeleted => "blog_post_deleted",
            ActivityAction::SuspiciousActivity => "suspicious_activity",
            ActivityAction::MultipleFailedLogins => "multiple_failed_logins",
            ActivityAction::UnauthorizedAccessAttempt => "unauthorized_access_attempt",
            ActivityAction::ApiRateLimitExceeded => "api_rate_limit_exceeded",
        }
    }

    /// Domain this action belongs to
    pub fn domain(&self) -> ActionDomain {
        use ActivityAction::*;
        match self {
            LoginSuccess | LoginFailed | Logout | PasswordResetRequested | PasswordChanged
            | TwoFactorEnabled | TwoFactorDisabled | TwoFactorVerified => {
                ActionDomain::Authentication
            }
            AccountCreated | AccountDeleted | AccountModified | ProfileUpdated => {
                ActionDomain::Account
            }
            DataExported | ConsentUpdated | DataDeletionRequested => ActionDomain::DataRights,
            AppointmentCreated | AppointmentCancelled | AppointmentConfirmed
            | AppointmentModified => ActionDomain::Scheduling,
            AdminAccess | ConfigModified | UserRoleChanged | BlogPostCreated
            | BlogPostModified | BlogPostDeleted => ActionDomain::Administration,
            SuspiciousActivity | MultipleFailedLogins | UnauthorizedAccessAttempt
            | ApiRateLimitExceeded => ActionDomain::Security,
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ActivityAction::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == name)
            .ok_or_else(|| ActivityError::UnknownAction(s.to_string()))
    }
}

/// Blast-radius classification, derived from the action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Upper-case label used in console lines
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Console marker prefixed to each emitted line
    pub fn marker(&self) -> &'static str {
        match self {
            Severity::Low => "ℹ️",
            Severity::Medium => "⚠️",
            Severity::High => "🔶",
            Severity::Critical => "🚨",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => f.write_str("low"),
            Severity::Medium => f.write_str("medium"),
            Severity::High => f.write_str("high"),
            Severity::Critical => f.write_str("critical"),
        }
    }
}

/// Result of the audited action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Success,
    Failure,
    Warning,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Failure => f.write_str("failure"),
            Outcome::Warning => f.write_str("warning"),
        }
    }
}

/// Identity of the principal performing an action
///
/// Empty strings are treated as absent; an actor with no user id is anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Actor {
    /// Unauthenticated actor
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticated actor identified by user id
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: non_empty(user_id),
            email: None,
            role: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = non_empty(email);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = non_empty(role);
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Caller input for a new log entry
///
/// Carries everything except `id`, `timestamp` and `severity`, which the
/// log assigns on append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub action: ActivityAction,

    /// Kind of resource affected (e.g. "appointment", "user", "blog-post")
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    #[serde(default)]
    pub actor: Actor,

    #[serde(default)]
    pub origin: RequestOrigin,

    /// Free-form context; secret-looking keys are redacted on append
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,

    #[serde(default)]
    pub outcome: Outcome,
}

impl NewActivity {
    /// Start a new entry for an action on a resource kind
    pub fn new(action: ActivityAction, resource_type: impl Into<String>) -> Self {
        Self {
            action,
            resource_type: resource_type.into(),
            resource_id: None,
            actor: Actor::anonymous(),
            origin: RequestOrigin::default(),
            detail: None,
            outcome: Outcome::Success,
        }
    }

    pub fn actor(mut self, actor: Actor) -> Self {
        self.actor = actor;
        self
    }

    pub fn origin(mut self, origin: RequestOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = non_empty(resource_id);
        self
    }

    pub fn detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// A single immutable entry in the activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Unique record identifier (log-<uuid>)
    pub id: String,

    /// Time the log recorded the action
    pub timestamp: DateTime<Utc>,

    pub actor_user_id: Option<String>,
    pub actor_email: Option<String>,
    pub actor_role: Option<String>,

    pub action: ActivityAction,

    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// Network origin of the triggering request, or "unknown"
    pub source_address: String,

    /// Client identifier string, or "unknown"
    pub agent_string: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,

    pub outcome: Outcome,

    /// Derived from `action` by the classifier
    pub severity: Severity,
}

impl ActivityRecord {
    /// Whether this record was produced by the given user
    pub fn is_by(&self, user_id: &str) -> bool {
        self.actor_user_id.as_deref() == Some(user_id)
    }

    /// Human-readable one-line rendering used by console sinks
    pub fn summary_line(&self) -> String {
        format!(
            "{} [{}] {} | User: {} | IP: {} | Status: {}",
            self.severity.marker(),
            self.severity.label(),
            self.action,
            self.actor_email.as_deref().unwrap_or("anonymous"),
            self.source_address,
            self.outcome,
        )
    }
}

/// Filter for querying the activity log
///
/// Every field is optional; present fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActivityAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    /// Inclusive lower bound on `timestamp`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    /// Inclusive upper bound on `timestamp`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    /// Maximum number of records returned; `None` or 0 uses the log default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ActivityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one user; an empty id imposes no constraint
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = non_empty(user_id);
        self
    }

    pub fn action(mut self, action: ActivityAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Snapshot of log contents and retention counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    /// Records currently held
    pub total: u64,

    /// Records currently held, per severity
    pub by_severity: BTreeMap<Severity, u64>,

    /// Archival passes run since the log was created
    pub archival_passes: u64,

    /// Records discarded by archival since the log was created
    pub archived_total: u64,

    /// Records removed by per-user erasure since the log was created
    pub erased_total: u64,
}

/// Data-portability bundle of one user's activity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityExport {
    pub user_id: String,
    pub exported_at: DateTime<Utc>,
    pub record_count: usize,
    pub records: Vec<ActivityRecord>,
}

pub(crate) fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
