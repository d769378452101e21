//*** START FILE: src/access.rs ***//
//! Owner/user mode switch behind a shared password.
//!
//! Plaintext comparison only: no hashing, rate limiting or expiry. Fine for a
//! trusted single-user desktop, not for anything exposed beyond it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    User,
    Owner,
}

#[derive(Debug, Clone)]
pub struct AccessGate {
    password: String,
    authorized: bool,
    mode: Mode,
}

impl AccessGate {
    pub fn new(password: impl Into<String>) -> Self {
        AccessGate {
            password: password.into(),
            authorized: false,
            mode: Mode::User,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// Checks `attempt` and, on a match, enters owner mode.
    pub fn authenticate(&mut self, attempt: &str) -> Result<()> {
        if attempt == self.password {
            self.authorized = true;
            self.switch_mode(Mode::Owner)
        } else {
            warn!("Owner password rejected");
            self.authorized = false;
            Err(Error::Unauthorized)
        }
    }

    /// Switching to user mode always succeeds and drops authorization.
    pub fn switch_mode(&mut self, mode: Mode) -> Result<()> {
        match mode {
            Mode::Owner if !self.authorized => return Err(Error::Unauthorized),
            Mode::User => self.authorized = false,
            Mode::Owner => {}
        }
        if self.mode != mode {
            info!("Mode switched to {:?}", mode);
        }
        self.mode = mode;
        Ok(())
    }
}

//*** END FILE: src/access.rs ***//
