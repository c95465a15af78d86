//! External recovery script
//!
//! Runs a user-configured shell script with a timeout. The script's only
//! contract is an observable HP change after the next status refresh.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{Result, SessionError};
use crate::executor::RecoveryProcedure;
use crate::session::Session;

/// Default script timeout in milliseconds
pub const DEFAULT_SCRIPT_TIMEOUT_MS: u64 = 30000;

#[derive(Debug, Clone)]
pub struct ScriptRecovery {
    path: PathBuf,
    timeout_ms: u64,
    description: String,
}

impl ScriptRecovery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let description = path.display().to_string();
        Self {
            path,
            timeout_ms: DEFAULT_SCRIPT_TIMEOUT_MS,
            description,
        }
    }

    /// Set the timeout in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn execute(&self, session: &Session) -> std::io::Result<std::process::Output> {
        let character = &session.character;
        let mut cmd = Command::new("sh");
        cmd.arg(&self.path)
            .env("LOATHING_CHARACTER", &character.name)
            .env("LOATHING_HP", character.current_hp.to_string())
            .env("LOATHING_MAX_HP", character.maximum_hp.to_string())
            .env("LOATHING_MP", character.current_mp.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn()?;

        let timeout = tokio::time::Duration::from_millis(self.timeout_ms);
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("Recovery script timed out after {}ms", self.timeout_ms),
            )),
        }
    }
}

#[async_trait]
impl RecoveryProcedure for ScriptRecovery {
    async fn recover(&self, session: &mut Session) -> Result<()> {
        if !self.path.is_file() {
            return Err(SessionError::RecoveryUnavailable(format!(
                "Could not find HP auto-recovery script: {}",
                self.path.display()
            )));
        }

        let output = match self.execute(session).await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                return Err(SessionError::Stall(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::warn!(
                "Recovery script {} exited with {:?}: {}",
                self.description,
                output.status.code(),
                stderr.trim()
            );
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
