use std::time::Duration;

/// Base URL used when `DERMASCOPE_API_BASE` is not set at build time
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Number of records requested by the history view
pub const HISTORY_PAGE_LIMIT: u32 = 50;
pub const SIGNUP_REDIRECT_DELAY_MS: u64 = 1500;
pub const RESULT_REDIRECT_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: trim_base(&api_base.into()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Configuration baked in by the build.
    ///
    /// The frontend ships as a static bundle, so the API base is read with
    /// `option_env!` rather than at runtime.
    pub fn from_build_env() -> Self {
        Self::new(option_env!("DERMASCOPE_API_BASE").unwrap_or(DEFAULT_API_BASE))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Origin that serves uploaded images and heatmaps.
    ///
    /// Some deployments configure the base as the predict endpoint itself,
    /// so a trailing `/predict` is dropped.
    pub fn media_base(&self) -> &str {
        self.api_base
            .strip_suffix("/predict")
            .unwrap_or(&self.api_base)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_build_env()
    }
}

fn trim_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}
