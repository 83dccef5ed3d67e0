use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::auth::{validate_login, validate_otp, validate_signup};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, InputError};
use crate::models::{
    AccountSettings, Credentials, HistoryPayload, HistoryQuery, HistoryRecord, OtpDelivery,
    OtpRequest, OtpSession, OtpVerifyRequest, PredictionResult, SaveResultRequest,
    SignupResponse, TokenResponse,
};
use crate::session::{SessionKey, SessionStore};
use crate::upload::ImageUpload;

/// Prediction endpoints
#[async_trait(?Send)]
pub trait PredictionApi {
    async fn predict(&self, image: ImageUpload) -> ApiResult<PredictionResult>;
    async fn save_result(&self, request: &SaveResultRequest) -> ApiResult<HistoryRecord>;
}

/// History listing and deletion
#[async_trait(?Send)]
pub trait HistoryApi {
    async fn fetch_history(&self, query: &HistoryQuery) -> ApiResult<Vec<HistoryRecord>>;
    async fn delete_history_record(&self, id: i64) -> ApiResult<()>;
}

/// Login, signup and the OTP second factor
#[async_trait(?Send)]
pub trait AuthApi {
    async fn login(&self, email: &str, password: &str) -> ApiResult<TokenResponse>;
    async fn signup(&self, email: &str, password: &str) -> ApiResult<SignupResponse>;
    async fn request_otp(&self, email: &str) -> ApiResult<OtpDelivery>;
    async fn verify_otp(&self, email: &str, code: &str) -> ApiResult<OtpSession>;
    async fn account_settings(&self) -> ApiResult<AccountSettings>;
}

/// Which stored credential goes into the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bearer {
    /// The login token
    Auth,
    /// The OTP session token when one exists, else the login token
    Sensitive,
}

/// HTTP client for the prediction, history, auth and OTP APIs.
///
/// Every call is a single attempt. Failures come back classified as
/// [`ApiError`]; an auth failure also clears the session store.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> Self {
        Self {
            http: Client::new(),
            config,
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Probe the API root to tell the user early that the backend is down.
    ///
    /// Any HTTP answer counts as reachable. Only a missing response is an
    /// error, and the session is never touched.
    pub async fn check_backend(&self) -> ApiResult<()> {
        let response = self
            .http
            .get(self.config.endpoint("/"))
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        debug!("Backend answered {} at {}", response.status().as_u16(), response.url());
        Ok(())
    }

    pub fn logout(&self) {
        info!("Logging out");
        self.session.clear_credentials();
        self.session.remove(SessionKey::AccountEmail);
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        bearer: Option<Bearer>,
    ) -> ApiResult<T> {
        let response = self.dispatch(request, bearer).await?;
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("Unreadable response body: {}", e);
            ApiError::Decode(e.to_string())
        })
    }

    async fn dispatch(&self, request: RequestBuilder, bearer: Option<Bearer>) -> ApiResult<Response> {
        let mut request = request.timeout(self.config.timeout);
        if let Some(token) = bearer.and_then(|b| self.token_for(b)) {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        if err.is_auth() {
            warn!("Auth failure ({}), clearing session", status.as_u16());
            self.session.clear_credentials();
        } else {
            warn!("Request failed: {}", err);
        }
        Err(err)
    }

    fn token_for(&self, bearer: Bearer) -> Option<String> {
        match bearer {
            Bearer::Auth => self.session.auth_token(),
            Bearer::Sensitive => self
                .session
                .otp_session()
                .or_else(|| self.session.auth_token()),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            warn!("Request timed out: {}", err);
            ApiError::Timeout {
                millis: self.config.timeout.as_millis() as u64,
            }
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            warn!("Network error: {}", err);
            ApiError::Network {
                base: self.config.api_base.clone(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait(?Send)]
impl PredictionApi for ApiClient {
    async fn predict(&self, image: ImageUpload) -> ApiResult<PredictionResult> {
        if image.bytes.is_empty() {
            return Err(InputError::MissingFile.into());
        }
        info!("Uploading {} ({} bytes) for prediction", image.file_name, image.bytes.len());

        let content_type = if image.content_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            image.content_type
        };
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&content_type)
            .map_err(|_| InputError::UnsupportedFileType(content_type.clone()))?;
        let form = Form::new().part("file", part);

        let request = self.http.post(self.config.endpoint("/predict")).multipart(form);
        let result: PredictionResult = self.send_json(request, Some(Bearer::Auth)).await?;
        info!(
            "Predicted {} ({:.1}%)",
            result.predicted_class,
            result.confidence * 100.0
        );
        Ok(result)
    }

    async fn save_result(&self, request: &SaveResultRequest) -> ApiResult<HistoryRecord> {
        let request = self
            .http
            .post(self.config.endpoint("/save-result"))
            .json(request);
        self.send_json(request, Some(Bearer::Auth)).await
    }
}

#[async_trait(?Send)]
impl HistoryApi for ApiClient {
    async fn fetch_history(&self, query: &HistoryQuery) -> ApiResult<Vec<HistoryRecord>> {
        let request = self
            .http
            .get(self.config.endpoint("/history"))
            .query(&query.params());
        let payload: HistoryPayload = self.send_json(request, Some(Bearer::Sensitive)).await?;
        let records = payload.into_records();
        debug!("Loaded {} history records", records.len());
        Ok(records)
    }

    async fn delete_history_record(&self, id: i64) -> ApiResult<()> {
        info!("Deleting history record {}", id);
        let request = self
            .http
            .delete(self.config.endpoint(&format!("/history/{}", id)));
        self.dispatch(request, Some(Bearer::Sensitive)).await.map(|_| ())
    }
}

#[async_trait(?Send)]
impl AuthApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> ApiResult<TokenResponse> {
        validate_login(email, password)?;

        let request = self
            .http
            .post(self.config.endpoint("/auth/login"))
            .json(&Credentials { email, password });
        let token: TokenResponse = self.send_json(request, None).await?;

        self.session.remove(SessionKey::OtpSession);
        self.session.set(SessionKey::AuthToken, &token.access_token);
        self.session.set(SessionKey::AccountEmail, email);
        info!("Logged in as {}", email);
        Ok(token)
    }

    async fn signup(&self, email: &str, password: &str) -> ApiResult<SignupResponse> {
        validate_signup(email, password)?;

        let request = self
            .http
            .post(self.config.endpoint("/auth/signup"))
            .json(&Credentials { email, password });
        self.send_json(request, None).await
    }

    async fn request_otp(&self, email: &str) -> ApiResult<OtpDelivery> {
        let request = self
            .http
            .post(self.config.endpoint("/otp/request"))
            .json(&OtpRequest { email });
        self.send_json(request, Some(Bearer::Auth)).await
    }

    async fn verify_otp(&self, email: &str, code: &str) -> ApiResult<OtpSession> {
        validate_otp(code)?;

        let request = self
            .http
            .post(self.config.endpoint("/otp/verify"))
            .json(&OtpVerifyRequest { email, otp: code });
        let session: OtpSession = self.send_json(request, Some(Bearer::Auth)).await?;
        self.session.set(SessionKey::OtpSession, &session.session_token);
        Ok(session)
    }

    async fn account_settings(&self) -> ApiResult<AccountSettings> {
        let request = self
            .http
            .get(self.config.endpoint("/notifications/settings"));
        self.send_json(request, Some(Bearer::Auth)).await
    }
}
