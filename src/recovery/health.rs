//! Health auto-recovery

use super::RecoveryContext;
use crate::error::{Result, SessionError};
use crate::executor::{RecoveryProcedure, Severity};
use crate::session::Session;

/// Run the recovery procedure until HP is above `threshold`.
///
/// Each attempt must change the observed HP; an attempt that does not is a
/// stall and ends recovery with an error.
pub async fn recover_health(
    ctx: &RecoveryContext<'_>,
    procedure: Option<&dyn RecoveryProcedure>,
    session: &mut Session,
    threshold: i64,
) -> Result<()> {
    let character = &session.character;
    if character.maximum_hp <= 0 || character.current_hp > threshold {
        return Ok(());
    }

    let Some(procedure) = procedure else {
        ctx.notifier
            .notify(Severity::Error, "Could not find HP auto-recovery script.");
        return Err(SessionError::RecoveryUnavailable(
            "no HP recovery procedure configured".to_string(),
        ));
    };

    let mut last_hp = None;
    loop {
        let current = session.character.current_hp;
        let progressing = last_hp != Some(current);
        if current > threshold || current >= session.character.maximum_hp || !progressing {
            break;
        }

        ctx.abort.check()?;
        last_hp = Some(current);
        ctx.notifier
            .notify(Severity::InProgress, "Executing HP auto-recovery script...");
        log::debug!("HP recovery via {} at {}/{}", procedure.description(), current, session.character.maximum_hp);

        procedure.recover(session).await?;
        ctx.refresher.refresh(session).await?;
    }

    if last_hp == Some(session.character.current_hp) {
        ctx.notifier
            .notify(Severity::Error, "Auto-recovery script failed to restore HP.");
        return Err(SessionError::Stall(
            "Auto-recovery script failed to restore HP.".to_string(),
        ));
    }

    ctx.notifier
        .notify(Severity::Normal, "Autorecover complete.  Resuming requests...");
    Ok(())
}
