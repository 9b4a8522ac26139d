//! Explicit auth session state.
//!
//! The session is a value with two pure transition functions, `login` and
//! `logout`, held behind one `RwLock` in `CoreState` — no ambient mutable
//! flags. No token or credential material is kept client-side.

use serde::{Deserialize, Serialize};

/// Which kind of account is signed in. Selects the login/register
/// endpoint family (`/api/doctor/...` vs `/api/patient/...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doctor" => Ok(Self::Doctor),
            "patient" => Ok(Self::Patient),
            other => Err(format!("Unknown role '{other}'")),
        }
    }
}

/// Current auth state. Serialized for the frontend as a tagged object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    LoggedOut,
    LoggedIn { role: Role, identity: String },
}

/// `login(role, identity) → SessionState`. The identity is whatever the
/// backend echoed back (falling back to the entered name happens at the
/// call site).
pub fn login(role: Role, identity: impl Into<String>) -> SessionState {
    SessionState::LoggedIn {
        role,
        identity: identity.into(),
    }
}

/// `logout() → SessionState`.
pub fn logout() -> SessionState {
    SessionState::LoggedOut
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn { .. })
    }

    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::LoggedIn { identity, .. } => Some(identity),
            Self::LoggedOut => None,
        }
    }
}
