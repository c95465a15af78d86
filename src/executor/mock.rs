//! Scripted collaborators
//!
//! In-memory stand-ins for the transport, status refresher, notifier and
//! recovery procedure. They record every call so runs can be inspected
//! afterwards.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::collaborators::{Notifier, RecoveryProcedure, Severity, StatusRefresher, Transport};
use crate::domain::{Request, Response};
use crate::error::{Result, SessionError};
use crate::session::Session;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Transport that replays queued responses, then a fallback.
pub struct ScriptedTransport {
    queued: Mutex<VecDeque<Result<Response>>>,
    fallback: String,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    /// Every request answers with `fallback` once the queue is empty
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: fallback.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        locked(&self.queued).push_back(Ok(Response::new("", text)));
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        locked(&self.queued).push_back(Err(SessionError::Transport(message.into())));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        locked(&self.requests).clone()
    }

    pub fn calls(&self) -> usize {
        locked(&self.requests).len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn perform(&self, request: &Request) -> Result<Response> {
        locked(&self.requests).push(request.clone());
        let next = locked(&self.queued).pop_front();
        match next {
            Some(response) => response.map(|r| Response::new(request.to_url(), r.text)),
            None => Ok(Response::new(request.to_url(), self.fallback.clone())),
        }
    }
}

type SessionHook = Box<dyn Fn(&mut Session) + Send + Sync>;

/// Status refresher that counts calls and optionally rewrites the session.
#[derive(Default)]
pub struct CountingRefresher {
    calls: AtomicU32,
    hook: Option<SessionHook>,
}

impl CountingRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook(hook: impl Fn(&mut Session) + Send + Sync + 'static) -> Self {
        Self {
            calls: AtomicU32::new(0),
            hook: Some(Box::new(hook)),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusRefresher for CountingRefresher {
    async fn refresh(&self, session: &mut Session) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.hook {
            hook(session);
        }
        Ok(())
    }
}

/// Notifier that keeps every message.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Severity, String)>>,
    confirms: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer yes to every confirmation
    pub fn confirming() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            confirms: true,
        }
    }

    pub fn messages(&self) -> Vec<(Severity, String)> {
        locked(&self.messages).clone()
    }

    pub fn saw(&self, severity: Severity, message: &str) -> bool {
        locked(&self.messages)
            .iter()
            .any(|(s, m)| *s == severity && m == message)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        locked(&self.messages).push((severity, message.to_string()));
    }

    fn confirm(&self, prompt: &str) -> bool {
        locked(&self.messages).push((Severity::Normal, prompt.to_string()));
        self.confirms
    }
}

/// Recovery procedure that restores a fixed amount of HP per call.
#[derive(Default)]
pub struct FixedRecovery {
    hp_per_call: i64,
    calls: AtomicU32,
}

impl FixedRecovery {
    pub fn new(hp_per_call: i64) -> Self {
        Self {
            hp_per_call,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecoveryProcedure for FixedRecovery {
    async fn recover(&self, session: &mut Session) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let character = &mut session.character;
        character.current_hp = (character.current_hp + self.hp_per_call).min(character.maximum_hp);
        Ok(())
    }

    fn description(&self) -> &str {
        "fixed"
    }
}
