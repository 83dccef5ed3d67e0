use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Problems caught before a request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please select an image first.")]
    MissingFile,

    #[error("Please enter both email and password")]
    MissingCredentials,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Please enter a 6-digit OTP code")]
    OtpLength,

    #[error("An analysis is already running")]
    AnalysisInFlight,
}

/// Classified failure of an API call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// No response reached the client
    #[error("Cannot connect to backend server at {base}: {message}")]
    Network { base: String, message: String },

    #[error("Request timed out after {millis} ms. The server may be slow or unreachable.")]
    Timeout { millis: u64 },

    /// 401, or 403 without an OTP indicator. Session state has been cleared.
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// 403 asking for one-time-code verification
    #[error("OTP verification required: {0}")]
    OtpRequired(String),

    #[error("Request rejected ({status}): {message}")]
    Validation { status: u16, message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The server answered with a success status but an unreadable body
    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error(transparent)]
    Input(#[from] InputError),
}

impl ApiError {
    /// Classify a non-success HTTP status and its body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = server_message(body);

        match status {
            401 => ApiError::Auth {
                status,
                message: detail.unwrap_or_else(|| default_message(status).to_string()),
            },
            403 => match detail {
                Some(message) if message.contains("OTP") => ApiError::OtpRequired(message),
                other => ApiError::Auth {
                    status,
                    message: other.unwrap_or_else(|| default_message(status).to_string()),
                },
            },
            400..=499 => ApiError::Validation {
                status,
                message: detail.unwrap_or_else(|| default_message(status).to_string()),
            },
            _ => ApiError::Server {
                status,
                message: detail.unwrap_or_else(|| default_message(status).to_string()),
            },
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }

    /// Text shown inline in the UI.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network { base, .. } => format!(
                "Cannot connect to backend server at {}. Please ensure the backend is running.",
                base
            ),
            ApiError::Timeout { .. } => {
                "Request timed out. The server may be slow or unreachable.".to_string()
            }
            ApiError::Auth { status: 401, .. } => {
                "Your session has expired. Please log in again.".to_string()
            }
            ApiError::Auth { .. } => "You do not have access to this resource.".to_string(),
            ApiError::OtpRequired(_) => {
                "OTP verification required. Please verify your OTP first.".to_string()
            }
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::Server { status, .. } => default_message(*status).to_string(),
            ApiError::Decode(_) => "The server sent an unexpected response.".to_string(),
            ApiError::Input(input) => input.to_string(),
        }
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        401 => "Invalid email or password. Please try again.",
        403 => "Access denied.",
        404 => "Endpoint not found. Please check the API configuration.",
        400..=499 => "The request was rejected.",
        _ => "Server error. Please try again later.",
    }
}

/// Pull a human-readable message out of an error body.
///
/// FastAPI puts it in `detail`, Flask in `error`; some proxies use `message`.
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["detail", "error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .or_else(|| value.as_str().map(str::to_string)),
        Err(_) => Some(trimmed.to_string()),
    }
}
