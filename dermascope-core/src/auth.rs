//! Client-side checks for the login, signup and OTP forms.
//!
//! Everything here runs before the network layer; a failing check means no
//! request is sent.

use crate::error::{ApiError, InputError};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const OTP_LENGTH: usize = 6;

/// Message shown on the login form when the server rejects the credentials
pub const INVALID_CREDENTIALS: &str = "Invalid credentials. Please check your email and password.";

pub fn validate_login(email: &str, password: &str) -> Result<(), InputError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(InputError::MissingCredentials);
    }
    Ok(())
}

pub fn validate_signup(email: &str, password: &str) -> Result<(), InputError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(InputError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(InputError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// A code is exactly six ASCII digits.
pub fn validate_otp(code: &str) -> Result<(), InputError> {
    if code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(InputError::OtpLength)
    }
}

/// Normalise typed OTP input: digits only, at most six of them.
pub fn sanitize_otp_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(OTP_LENGTH)
        .collect()
}

pub fn login_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Auth { status: 401, .. } => INVALID_CREDENTIALS.to_string(),
        ApiError::Validation { message, .. } => message.clone(),
        other => other.user_message(),
    }
}

pub fn signup_success_message(is_admin: bool) -> String {
    if is_admin {
        "Account created successfully! You are an admin. Redirecting to login...".to_string()
    } else {
        "Account created successfully! Redirecting to login...".to_string()
    }
}
