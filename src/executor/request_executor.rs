//! Request executor - repeats an action until its goals are met.
//!
//! Each pass checks the iteration boundary (abort, continuation flag, goal
//! progress), confirms impaired adventuring, runs auto-recovery, dispatches
//! the request and folds the response back into the session. Every failure
//! inside a pass, panics included, ends the run as `Errored`.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::action::{Action, ActionClass};
use super::collaborators::{Notifier, Severity, StatusRefresher, Transport};
use super::context::{AbortSignal, Continuation, IterationContext};
use crate::config::SessionConfig;
use crate::domain::{AdventureResult, RunOutcome, RunReport};
use crate::error::{Result, SessionError};
use crate::recovery::{RecoveryContext, RecoveryPolicy};
use crate::session::Session;

/// Run-level settings for the executor.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    /// Inebriety above this is falling-down drunk
    pub inebriety_limit: i64,
    /// Zones where adventuring drunk needs no confirmation
    pub exempt_zones: Vec<String>,
    /// Stop as soon as any one condition is met
    pub stop_on_any_condition: bool,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            inebriety_limit: 14,
            exempt_zones: vec!["Camp".to_string()],
            stop_on_any_condition: false,
        }
    }
}

impl ExecutorSettings {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            inebriety_limit: config.inebriety_limit,
            exempt_zones: config.exempt_zones.clone(),
            stop_on_any_condition: config.stop_on_any_condition,
        }
    }

    fn is_exempt(&self, zone: &str) -> bool {
        self.exempt_zones.iter().any(|z| z.eq_ignore_ascii_case(zone))
    }
}

/// Drives repeated request/response cycles against one session.
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    refresher: Arc<dyn StatusRefresher>,
    notifier: Arc<dyn Notifier>,
    recovery: RecoveryPolicy,
    settings: ExecutorSettings,
    abort: AbortSignal,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, refresher: Arc<dyn StatusRefresher>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            refresher,
            notifier,
            recovery: RecoveryPolicy::default(),
            settings: ExecutorSettings::default(),
            abort: AbortSignal::new(),
        }
    }

    pub fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn with_settings(mut self, settings: ExecutorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Handle for aborting a run from another task
    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// Repeat `action` up to `iterations` times.
    ///
    /// Fails only on invalid input; everything that goes wrong once the run
    /// has started is reported through the returned outcome.
    pub async fn run(&self, session: &mut Session, action: &dyn Action, iterations: u32) -> Result<RunReport> {
        if iterations == 0 {
            return Err(SessionError::Validation(
                "Zero is not a valid number of iterations.".to_string(),
            ));
        }

        session.reset_continue();
        session
            .ledger
            .set_use_disjunction(self.settings.stop_on_any_condition);

        let description = action.describe();
        let mut ctx = IterationContext::new(
            iterations,
            session.character.snapshot(),
            session.ledger.conditions().len(),
        );
        tracing::info!(action = %description, iterations, "Run started");

        let outcome = loop {
            if self.check_cancelled(session) {
                break RunOutcome::Cancelled;
            }
            if !ctx.has_remaining() {
                break self.finish(session);
            }
            if self.check_conditions(session, &mut ctx) {
                break RunOutcome::EarlyStop;
            }

            let pass = AssertUnwindSafe(self.iterate(session, action, &mut ctx))
                .catch_unwind()
                .await;

            match pass {
                Ok(Ok(())) => {}
                Ok(Err(SessionError::Aborted)) => {
                    self.notifier.notify(Severity::Cancelled, "Run aborted.");
                    ctx.cancel();
                }
                Ok(Err(e)) => {
                    log::error!("Request {} of {} failed: {}", ctx.completed + 1, ctx.requested, e);
                    self.notifier.notify(Severity::Error, &e.to_string());
                    session.cancel();
                    ctx.fail(e.to_string());
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    log::error!("Request {} of {} panicked: {}", ctx.completed + 1, ctx.requested, message);
                    self.notifier.notify(Severity::Error, "Unexpected error.");
                    session.cancel();
                    ctx.fail(message);
                }
            }

            match &ctx.continuation {
                Continuation::Continuing => {}
                Continuation::Cancelled => break RunOutcome::Cancelled,
                Continuation::Errored(message) => break RunOutcome::Errored(message.clone()),
            }
        };

        match &outcome {
            RunOutcome::Errored(error) => {
                tracing::error!(action = %description, completed = ctx.completed, error = %error, "Run failed")
            }
            _ => tracing::info!(
                action = %description,
                completed = ctx.completed,
                outcome = ?outcome,
                "Run finished"
            ),
        }

        Ok(RunReport {
            outcome,
            requested: iterations,
            completed: ctx.completed,
        })
    }

    fn check_cancelled(&self, session: &Session) -> bool {
        if self.abort.is_aborted() || !session.permits_continue() {
            self.notifier.notify(Severity::Cancelled, "Run aborted.");
            return true;
        }
        false
    }

    /// Goals met with iterations still left. Only consulted when another pass
    /// would otherwise run, so a goal met on the last pass finishes normally.
    fn check_conditions(&self, session: &mut Session, ctx: &mut IterationContext) -> bool {
        let remaining = session.ledger.conditions().len();
        let shrank = remaining < ctx.conditions_seen;
        ctx.conditions_seen = remaining;

        if shrank && (remaining == 0 || session.ledger.use_disjunction()) {
            session.ledger.clear_conditions();
            self.notifier.notify(Severity::Normal, "Conditions satisfied.");
            return true;
        }
        false
    }

    fn finish(&self, session: &Session) -> RunOutcome {
        if session.ledger.conditions().is_empty() {
            self.notifier.notify(Severity::Normal, "Requests completed!");
            RunOutcome::Complete
        } else {
            self.notifier
                .notify(Severity::Normal, "Requests completed! (Conditions not yet met)");
            RunOutcome::Partial
        }
    }

    async fn iterate(&self, session: &mut Session, action: &dyn Action, ctx: &mut IterationContext) -> Result<()> {
        let index = ctx.completed + 1;
        self.notifier.notify(
            Severity::InProgress,
            &format!("Request {} of {} ({}) in progress...", index, ctx.requested, action.describe()),
        );

        let class = action.class();
        if !self.confirm_impairment(session, &class, ctx) {
            self.notifier.notify(Severity::Cancelled, "Request cancelled.");
            ctx.cancel();
            return Ok(());
        }

        self.recover(session, &class).await?;
        self.abort.check()?;

        let request = action.request();
        tracing::debug!(iteration = index, request = %request.to_url(), "Dispatching request");
        let response = self.transport.perform(&request).await?;

        let effects_before = session.ledger.active_effects().len();
        action.reconcile(&response, session)?;

        let adventures = action.adventures_used();
        if adventures > 0 {
            session.process_result(&AdventureResult::adventures(-adventures));
        }
        session.ledger.apply_recent_effects();

        let effects_changed = session.ledger.active_effects().len() != effects_before;
        let is_adventure = matches!(class, ActionClass::Adventure { .. });
        if effects_changed || (is_adventure && session.character.recovering_equipment) {
            self.refresher.refresh(session).await?;
        }

        ctx.snapshot = session.character.snapshot();
        ctx.completed = index;
        tracing::debug!(
            iteration = index,
            hp = ctx.snapshot.hp,
            mp = ctx.snapshot.mp,
            conditions = session.ledger.conditions().len(),
            "Request completed"
        );
        Ok(())
    }

    /// Ask once per run before adventuring while falling-down drunk.
    fn confirm_impairment(&self, session: &Session, class: &ActionClass, ctx: &mut IterationContext) -> bool {
        let ActionClass::Adventure { zone } = class else {
            return true;
        };
        if ctx.confirmed_impairment
            || self.settings.is_exempt(zone)
            || !session.character.is_falling_down(self.settings.inebriety_limit)
        {
            return true;
        }

        let confirmed = self
            .notifier
            .confirm("You are about to adventure while falling-down drunk. Continue?");
        ctx.confirmed_impairment = confirmed;
        confirmed
    }

    async fn recover(&self, session: &mut Session, class: &ActionClass) -> Result<()> {
        let ctx = RecoveryContext {
            transport: self.transport.as_ref(),
            refresher: self.refresher.as_ref(),
            notifier: self.notifier.as_ref(),
            abort: &self.abort,
        };
        match class {
            ActionClass::Adventure { .. } => {
                self.recovery.recover_health(&ctx, session).await?;
                self.recovery.recover_mana(&ctx, session).await
            }
            ActionClass::Skill { mp_cost } => self.recovery.ensure_mana(&ctx, session, *mp_cost).await,
            ActionClass::Purchase | ActionClass::Other => Ok(()),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
