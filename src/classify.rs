//! Severity classification of action kinds
//!
//! Grouped by blast radius: irreversible or account-compromising actions are
//! critical, sensitive security changes are high, routine but trackable
//! events are medium, everything else is low.

use crate::types::{ActivityAction, Severity};

/// Severity of an action kind
pub fn severity_of(action: ActivityAction) -> Severity {
    use ActivityAction::*;
    match action {
        AccountDeleted
        | DataDeletionRequested
        | UserRoleChanged
        | UnauthorizedAccessAttempt
        | MultipleFailedLogins => Severity::Critical,

        PasswordChanged | TwoFactorDisabled | ConfigModified | AdminAccess => Severity::High,

        LoginSuccess | DataExported | ConsentUpdated | AccountModified => Severity::Medium,

        _ => Severity::Low,
    }
}

/// Severity of a raw action name
///
/// Unrecognized names classify as `Low` so that audit logging never blocks
/// the operation it observes.
pub fn severity_of_str(action: &str) -> Severity {
    action
        .parse::<ActivityAction>()
        .map(severity_of)
        .unwrap_or(Severity::Low)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(action: ActivityAction) -> Severity {
        match action.as_str() {
            "account_deleted"
            | "data_deletion_requested"
            | "user_role_changed"
            | "unauthorized_access_attempt"
            | "multiple_failed_logins" => Severity::Critical,
            "password_changed" | "2fa_disabled" | "config_modified" | "admin_access" => {
                Severity::High
            }
            "login_success" | "data_exported" | "consent_updated" | "account_modified" => {
                Severity::Medium
            }
            _ => Severity::Low,
        }
    }

    #[test]
    fn test_every_action_classified() {
        for action in ActivityAction::ALL {
            assert_eq!(severity_of(action), expected(action), "action {}", action);
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        for action in ActivityAction::ALL {
            let first = severity_of(action);
            for _ in 0..3 {
                assert_eq!(severity_of(action), first);
            }
        }
    }

    #[test]
    fn test_severity_counts() {
        let count = |level: Severity| {
            ActivityAction::ALL
                .iter()
                .filter(|a| severity_of(**a) == level)
                .count()
        };
        assert_eq!(count(Severity::Critical), 5);
        assert_eq!(count(Severity::High), 4);
        assert_eq!(count(Severity::Medium), 4);
        assert_eq!(count(Severity::Low), ActivityAction::ALL.len() - 13);
    }

    #[test]
    fn test_str_classification_matches_enum() {
        for action in ActivityAction::ALL {
            assert_eq!(severity_of_str(action.as_str()), severity_of(action));
        }
    }

    #[test]
    fn test_unknown_names_are_low() {
        for name in ["", "login", "ACCOUNT_DELETED", "account-deleted", "drop_tables"] {
            assert_eq!(severity_of_str(name), Severity::Low, "name {:?}", name);
        }
    }
}
