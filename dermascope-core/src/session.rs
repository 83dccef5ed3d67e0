use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::models::PredictionResult;

/// Slots in the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Bearer token issued by login
    AuthToken,
    /// Secondary token issued after OTP verification
    OtpSession,
    /// Email used at login, needed to request an OTP
    AccountEmail,
    /// Last prediction, kept so the result page survives a reload
    LastPrediction,
}

impl SessionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthToken => "token",
            Self::OtpSession => "otp_session",
            Self::AccountEmail => "account_email",
            Self::LastPrediction => "predictionResult",
        }
    }

    /// Whether the value should outlive the browser tab.
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Self::LastPrediction)
    }
}

/// Shared key-value state read and written by every view.
///
/// Implementations use interior mutability; the UI runs on a single event
/// loop so the last write wins.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: SessionKey) -> Option<String>;
    fn set(&self, key: SessionKey, value: &str);
    fn remove(&self, key: SessionKey);

    fn auth_token(&self) -> Option<String> {
        self.get(SessionKey::AuthToken).filter(|t| !t.is_empty())
    }

    fn otp_session(&self) -> Option<String> {
        self.get(SessionKey::OtpSession).filter(|t| !t.is_empty())
    }

    fn is_authenticated(&self) -> bool {
        self.auth_token().is_some()
    }

    /// Drop both credentials. Called on logout and on any auth failure.
    fn clear_credentials(&self) {
        debug!("Clearing stored credentials");
        self.remove(SessionKey::AuthToken);
        self.remove(SessionKey::OtpSession);
    }

    fn store_prediction(&self, result: &PredictionResult) {
        match serde_json::to_string(result) {
            Ok(json) => self.set(SessionKey::LastPrediction, &json),
            Err(e) => tracing::warn!("Failed to serialise prediction: {}", e),
        }
    }

    fn last_prediction(&self) -> Option<PredictionResult> {
        let raw = self.get(SessionKey::LastPrediction)?;
        match serde_json::from_str(&raw) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!("Failed to parse stored result: {}", e);
                None
            }
        }
    }
}

/// In-process store for native use and tests
#[derive(Debug, Default)]
pub struct MemorySession {
    values: Mutex<HashMap<SessionKey, String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let session = Self::new();
        session.set(SessionKey::AuthToken, token);
        session
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(&key).cloned())
    }

    fn set(&self, key: SessionKey, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key, value.to_string());
        }
    }

    fn remove(&self, key: SessionKey) {
        if let Ok(mut values) = self.values.lock() {
            values.remove(&key);
        }
    }
}
