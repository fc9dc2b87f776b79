//! Append-only audit trail entries.

use chrono::{DateTime, Utc};

/// A single append-only record of a state-changing action, kept for
/// operator review and incident reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLog {
    id: u64,
    actor: String,
    action: String,
    subject: String,
    detail: String,
    recorded_at: DateTime<Utc>,
}

impl AuditLog {
    #[must_use]
    pub fn new(
        id: u64,
        actor: impl Into<String>,
        action: impl Into<String>,
        subject: impl Into<String>,
        detail: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            actor: actor.into(),
            action: action.into(),
            subject: subject.into(),
            detail: detail.into(),
            recorded_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn actor(&self) -> &str {
        &self.actor
    }

    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_with_expected_fields() {
        let log = AuditLog::new(1, "system", "confirm_intent", "i1", "auto-confirmed", Utc::now());
        assert_eq!(log.id(), 1);
        assert_eq!(log.actor(), "system");
        assert_eq!(log.action(), "confirm_intent");
        assert_eq!(log.subject(), "i1");
    }
}
