//! Mana restoration from priority-ordered sources

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::RecoveryContext;
use crate::domain::{AdventureResult, Request};
use crate::error::{Result, SessionError};
use crate::executor::Severity;
use crate::session::Session;

/// Unchanged attempts in a row that count as a stall
const STALL_LIMIT: u32 = 2;

/// One configured way of restoring MP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreSource {
    pub name: String,
    /// Request path, e.g. "inv_use.php"
    pub path: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Consumed per use; the source is usable only while one is held
    #[serde(default)]
    pub item: Option<String>,
    /// Uses allowed per day
    #[serde(default)]
    pub daily_limit: Option<u32>,
    /// Turns spent per use
    #[serde(default)]
    pub adventures_used: i64,
}

impl RestoreSource {
    pub fn request(&self) -> Request {
        self.fields
            .iter()
            .fold(Request::new(&self.path), |req, (k, v)| req.field(k, v))
    }

    /// Whether the source can be used right now
    pub fn usable(&self, session: &mut Session) -> bool {
        if let Some(item) = &self.item
            && !session.character.has_item(item)
        {
            return false;
        }
        if let Some(limit) = self.daily_limit
            && session.restore_uses_today(&self.name) >= limit
        {
            return false;
        }
        self.adventures_used <= 0 || session.character.adventures_left >= self.adventures_used
    }

    /// Perform one use and reconcile what came back.
    async fn apply(&self, ctx: &RecoveryContext<'_>, session: &mut Session) -> Result<()> {
        let response = ctx.transport.perform(&self.request()).await?;

        if let Some(item) = &self.item {
            session.process_result(&AdventureResult::item(item, -1));
        }
        if self.adventures_used > 0 {
            session.process_result(&AdventureResult::adventures(-self.adventures_used));
        }
        if self.daily_limit.is_some() {
            session.record_restore_use(&self.name);
        }

        session.process_response(&response.text);
        session.ledger.apply_recent_effects();
        Ok(())
    }
}

/// Restore MP until at least `needed`, trying `sources` in order.
pub async fn recover_mana(
    ctx: &RecoveryContext<'_>,
    sources: &[RestoreSource],
    session: &mut Session,
    needed: i64,
) -> Result<()> {
    if session.character.current_mp >= needed {
        return Ok(());
    }

    let mut unchanged = 0;
    for source in sources {
        while source.usable(session) && session.character.current_mp < session.character.maximum_mp {
            ctx.abort.check()?;

            let previous = session.character.current_mp;
            ctx.notifier
                .notify(Severity::InProgress, &format!("Restoring MP with {}...", source.name));
            source.apply(ctx, session).await?;

            if session.character.current_mp >= needed {
                return Ok(());
            }
            if session.character.current_mp != previous {
                unchanged = 0;
                continue;
            }

            ctx.notifier.notify(
                Severity::Error,
                "Detected no MP change.  Refreshing status to verify...",
            );
            ctx.refresher.refresh(session).await?;
            if session.character.current_mp >= needed {
                return Ok(());
            }
            if session.character.current_mp != previous {
                unchanged = 0;
                continue;
            }

            unchanged += 1;
            if unchanged >= STALL_LIMIT {
                log::warn!("MP unchanged after {} uses of {}", unchanged, source.name);
                return Err(SessionError::Stall(format!(
                    "{} produced no MP change",
                    source.name
                )));
            }
        }
    }

    ctx.notifier.notify(Severity::Error, "Unable to acquire enough MP!");
    Err(SessionError::InsufficientResource(
        "Unable to acquire enough MP!".to_string(),
    ))
}
