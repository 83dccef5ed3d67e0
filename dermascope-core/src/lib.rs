//! Client-side logic for the Dermascope skin-lesion classifier.
//!
//! Everything the browser UI needs that does not touch the DOM lives here:
//! the HTTP client for the prediction, history, auth and OTP endpoints, the
//! session store contract, the upload/analyze state machine, and the
//! derivations behind the result card, heatmap slider and admin charts.

pub mod auth;
pub mod charts;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod history;
pub mod liveness;
pub mod models;
pub mod result;
pub mod routes;
pub mod session;
pub mod slider;
pub mod upload;

pub use client::{ApiClient, AuthApi, HistoryApi, PredictionApi};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, InputError};
pub use models::{HistoryQuery, HistoryRecord, PredictionResult, Probability};
pub use session::{MemorySession, SessionKey, SessionStore};
