//! External collaborators
//!
//! The executor and recovery policy reach the outside world only through
//! these traits: the transport that performs round trips, the status
//! refresher that re-reads the character sheet, the display notifier, and
//! the user's recovery procedure.

use async_trait::async_trait;
use std::fmt;

use crate::domain::{Request, Response};
use crate::error::Result;
use crate::session::Session;

/// Performs one round trip against the game server.
///
/// Authentication, cookies and HTTP-level retries live behind this trait;
/// timeouts come back as `SessionError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, request: &Request) -> Result<Response>;
}

/// Re-synchronizes character levels and equipment from the server.
#[async_trait]
pub trait StatusRefresher: Send + Sync {
    async fn refresh(&self, session: &mut Session) -> Result<()>;
}

/// Runs the user's health recovery procedure.
///
/// The only observable effect is a changed resource level after the next
/// status refresh.
#[async_trait]
pub trait RecoveryProcedure: Send + Sync {
    async fn recover(&self, session: &mut Session) -> Result<()>;

    fn description(&self) -> &str;
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    InProgress,
    Error,
    Cancelled,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Normal => "normal",
            Severity::InProgress => "in-progress",
            Severity::Error => "error",
            Severity::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Receives user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);

    /// Ask the user to confirm a risky request; refuses unless overridden
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Notifier that writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => log::error!("{}", message),
            Severity::Cancelled => log::warn!("{}", message),
            Severity::Normal | Severity::InProgress => log::info!("{}", message),
        }
    }
}

/// Status refresher for sessions with no server-side character sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpRefresher;

#[async_trait]
impl StatusRefresher for NoOpRefresher {
    async fn refresh(&self, _session: &mut Session) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Character;

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::InProgress.to_string(), "in-progress");
        assert_eq!(Severity::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_log_notifier_refuses_confirmation() {
        let notifier = LogNotifier;
        notifier.notify(Severity::Normal, "Requests completed!");
        assert!(!notifier.confirm("You are falling-down drunk. Continue?"));
    }

    #[tokio::test]
    async fn test_noop_refresher() {
        let mut session = Session::login("1", Character::named("Tester"));
        NoOpRefresher.refresh(&mut session).await.unwrap();
        assert_eq!(session.character.name, "Tester");
    }
}
