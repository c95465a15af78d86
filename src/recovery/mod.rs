//! Resource recovery
//!
//! Bounded-retry sub-loops that restore HP and MP before a request may
//! proceed:
//! - **health**: repeated runs of an external recovery procedure
//! - **mana**: priority-ordered restore sources
//! - **script**: the shell-script recovery procedure
//!
//! Both loops stop on a stall (an attempt with no observable change) rather
//! than retrying forever.

pub mod health;
pub mod mana;
pub mod script;

pub use health::recover_health;
pub use mana::{RestoreSource, recover_mana};
pub use script::ScriptRecovery;

use std::sync::Arc;

use crate::config::RecoveryConfig;
use crate::error::Result;
use crate::executor::{AbortSignal, Notifier, RecoveryProcedure, StatusRefresher, Transport};
use crate::session::Session;

/// Collaborators a recovery attempt may call back into.
pub struct RecoveryContext<'a> {
    pub transport: &'a dyn Transport,
    pub refresher: &'a dyn StatusRefresher,
    pub notifier: &'a dyn Notifier,
    pub abort: &'a AbortSignal,
}

/// Thresholds and strategies for both resources.
#[derive(Clone, Default)]
pub struct RecoveryPolicy {
    /// Recover HP while at or below this fraction of maximum
    pub hp_threshold: f64,
    /// Restore MP to at least this fraction of maximum
    pub mp_threshold: f64,
    pub hp_procedure: Option<Arc<dyn RecoveryProcedure>>,
    pub mp_sources: Vec<RestoreSource>,
}

impl RecoveryPolicy {
    pub fn from_config(config: &RecoveryConfig) -> Self {
        let hp_procedure = config.hp_script.as_ref().map(|path| {
            Arc::new(ScriptRecovery::new(path).timeout_ms(config.script_timeout_ms)) as Arc<dyn RecoveryProcedure>
        });
        Self {
            hp_threshold: config.hp_threshold,
            mp_threshold: config.mp_threshold,
            hp_procedure,
            mp_sources: config.mp_sources.clone(),
        }
    }

    /// Replace the HP procedure (builder style)
    pub fn with_procedure(mut self, procedure: Arc<dyn RecoveryProcedure>) -> Self {
        self.hp_procedure = Some(procedure);
        self
    }

    /// A zero threshold turns HP recovery off
    pub async fn recover_health(&self, ctx: &RecoveryContext<'_>, session: &mut Session) -> Result<()> {
        if self.hp_threshold <= 0.0 {
            return Ok(());
        }
        let threshold = fraction_of(self.hp_threshold, session.character.maximum_hp);
        recover_health(ctx, self.hp_procedure.as_deref(), session, threshold).await
    }

    pub async fn recover_mana(&self, ctx: &RecoveryContext<'_>, session: &mut Session) -> Result<()> {
        let needed = fraction_of(self.mp_threshold, session.character.maximum_mp);
        recover_mana(ctx, &self.mp_sources, session, needed).await
    }

    /// Make sure at least `needed` MP is on hand, e.g. for a skill cast
    pub async fn ensure_mana(&self, ctx: &RecoveryContext<'_>, session: &mut Session, needed: i64) -> Result<()> {
        recover_mana(ctx, &self.mp_sources, session, needed).await
    }
}

impl std::fmt::Debug for RecoveryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryPolicy")
            .field("hp_threshold", &self.hp_threshold)
            .field("mp_threshold", &self.mp_threshold)
            .field("hp_procedure", &self.hp_procedure.as_ref().map(|p| p.description().to_string()))
            .field("mp_sources", &self.mp_sources.len())
            .finish()
    }
}

fn fraction_of(fraction: f64, maximum: i64) -> i64 {
    (fraction * maximum as f64) as i64
}
