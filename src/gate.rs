//! Shared-secret gate in front of the admin view.
//!
//! A single static password compared in plaintext. There is no hashing, no
//! rate limiting and no lockout; a wrong attempt only produces an alert.

/// Password that unlocks the admin view.
pub const ADMIN_PASSWORD: &str = "jeff123";

/// Alert shown after a wrong password.
pub const DENIED_ALERT: &str = "Erro";

/// Result of one unlock attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Granted,
    /// Exactly one alert per failed attempt.
    Denied { alert: &'static str },
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    password: &'static str,
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new(ADMIN_PASSWORD)
    }
}

impl AdminGate {
    pub fn new(password: &'static str) -> Self {
        Self { password }
    }

    pub fn check(&self, attempt: &str) -> GateOutcome {
        if attempt == self.password {
            GateOutcome::Granted
        } else {
            GateOutcome::Denied {
                alert: DENIED_ALERT,
            }
        }
    }
}
