//! End-to-end tests of `ApiClient` against an in-process axum server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use dermascope_core::auth::{login_error_message, INVALID_CREDENTIALS};
use dermascope_core::history::{delete_then_reload, load_admin_history, HistoryLoad};
use dermascope_core::result::ResultSummary;
use dermascope_core::upload::ImageUpload;
use dermascope_core::{
    ApiClient, ApiError, AuthApi, ClientConfig, HistoryApi, HistoryQuery, InputError,
    MemorySession, PredictionApi, SessionKey, SessionStore,
};

const OTP_TOKEN: &str = "otp-xyz";

#[derive(Default)]
struct Mock {
    calls: Vec<String>,
    bearers: Vec<Option<String>>,
    login_bodies: Vec<Value>,
    records: Vec<Value>,
    wrapped: bool,
    otp_gate: bool,
    /// Status the root answers with instead of 200
    root_status: Option<StatusCode>,
    /// Delay before `/history` answers
    history_delay: Option<Duration>,
    history_crash: bool,
}

type Shared = Arc<Mutex<Mock>>;

impl Mock {
    fn note(&mut self, call: String, headers: &HeaderMap) {
        self.calls.push(call);
        self.bearers.push(bearer(headers));
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

async fn root(State(mock): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let mut mock = mock.lock().unwrap();
    mock.note("GET /".to_string(), &headers);
    match mock.root_status {
        Some(status) => (status, Json(json!({"detail": "nope"}))),
        None => (StatusCode::OK, Json(json!({"message": "Skin lesion API is running"}))),
    }
}

async fn login(
    State(mock): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut mock = mock.lock().unwrap();
    mock.note("POST /auth/login".to_string(), &headers);
    mock.login_bodies.push(body.clone());

    if body["password"] == "secret1" {
        (
            StatusCode::OK,
            Json(json!({"access_token": "abc123", "token_type": "bearer"})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect email or password"})),
        )
    }
}

async fn predict(State(mock): State<Shared>, headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    mock.lock().unwrap().note("POST /predict".to_string(), &headers);

    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);
    let needle = b"name=\"file\"";
    let has_file = body.windows(needle.len()).any(|w| w == needle);
    if !is_multipart || !has_file {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "file field missing"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": 7,
            "predicted_class": "Melanoma",
            "confidence": 0.92,
            "image_url": "/static/test.jpg",
            "heatmap_url": "/static/heatmap.jpg"
        })),
    )
}

async fn history(
    State(mock): State<Shared>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> (StatusCode, Json<Value>) {
    let delay = mock.lock().unwrap().history_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut mock = mock.lock().unwrap();
    let call = match &query {
        Some(q) => format!("GET /history?{}", q),
        None => "GET /history".to_string(),
    };
    mock.note(call, &headers);

    if mock.history_crash {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "database unavailable"})),
        );
    }

    let otp_bearer = format!("Bearer {}", OTP_TOKEN);
    if mock.otp_gate && bearer(&headers).as_deref() != Some(otp_bearer.as_str()) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"detail": "OTP verification required. Please verify your OTP first."})),
        );
    }

    let records = Value::Array(mock.records.clone());
    let body = if mock.wrapped {
        json!({"items": records})
    } else {
        records
    };
    (StatusCode::OK, Json(body))
}

async fn delete_record(
    State(mock): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> StatusCode {
    let mut mock = mock.lock().unwrap();
    mock.note(format!("DELETE /history/{}", id), &headers);
    let before = mock.records.len();
    mock.records.retain(|r| r["id"] != id);
    if mock.records.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn verify_otp(
    State(mock): State<Shared>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> Json<Value> {
    mock.lock().unwrap().note("POST /otp/verify".to_string(), &headers);
    Json(json!({"session_token": OTP_TOKEN}))
}

fn sample_records() -> Vec<Value> {
    vec![
        json!({"id": 1, "timestamp": "2024-01-15T10:30:00", "image_url": "/static/a.jpg",
               "predicted_class": "Melanoma", "confidence": 0.92}),
        json!({"id": 2, "timestamp": "2024-01-14T09:20:00", "image_url": "/static/b.jpg",
               "predicted_class": "Nevus", "confidence": 0.78}),
    ]
}

async fn spawn_mock(mock: Mock) -> (String, Shared) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let shared: Shared = Arc::new(Mutex::new(mock));
    let app = Router::new()
        .route("/", get(root))
        .route("/auth/login", post(login))
        .route("/predict", post(predict))
        .route("/history", get(history))
        .route("/history/:id", delete(delete_record))
        .route("/otp/verify", post(verify_otp))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), shared)
}

fn client(base: &str, session: Arc<MemorySession>) -> ApiClient {
    ApiClient::new(ClientConfig::new(base), session)
}

fn calls(mock: &Shared) -> Vec<String> {
    mock.lock().unwrap().calls.clone()
}

#[tokio::test]
async fn test_login_with_empty_password_sends_nothing() {
    let (base, mock) = spawn_mock(Mock::default()).await;
    let api = client(&base, Arc::new(MemorySession::new()));

    let err = api.login("a@b.com", "").await.unwrap_err();

    assert_eq!(err, ApiError::Input(InputError::MissingCredentials));
    assert!(calls(&mock).is_empty());
}

#[tokio::test]
async fn test_login_stores_token() {
    let (base, mock) = spawn_mock(Mock::default()).await;
    let session = Arc::new(MemorySession::new());
    let api = client(&base, session.clone());

    let token = api.login("a@b.com", "secret1").await.unwrap();

    assert_eq!(token.access_token, "abc123");
    assert_eq!(calls(&mock), vec!["POST /auth/login"]);
    assert_eq!(
        mock.lock().unwrap().login_bodies,
        vec![json!({"email": "a@b.com", "password": "secret1"})]
    );
    assert_eq!(mock.lock().unwrap().bearers, vec![None]);
    assert_eq!(session.auth_token().as_deref(), Some("abc123"));
    assert_eq!(session.get(SessionKey::AccountEmail).as_deref(), Some("a@b.com"));
}

#[tokio::test]
async fn test_rejected_login_clears_session() {
    let (base, _mock) = spawn_mock(Mock::default()).await;
    let session = Arc::new(MemorySession::with_token("stale"));
    let api = client(&base, session.clone());

    let err = api.login("a@b.com", "wrong-password").await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(login_error_message(&err), INVALID_CREDENTIALS);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_predict_uploads_multipart_with_bearer() {
    let (base, mock) = spawn_mock(Mock::default()).await;
    let api = client(&base, Arc::new(MemorySession::with_token("tok")));

    let upload = ImageUpload::new("lesion.png", "image/png", vec![0x89, b'P', b'N', b'G']);
    let result = api.predict(upload).await.unwrap();

    assert_eq!(result.predicted_class, "Melanoma");
    assert_eq!(result.confidence, 0.92);
    let summary = ResultSummary::new(&result, api.config().media_base());
    assert_eq!(format!("{}%", summary.percent), "92%");
    assert_eq!(
        summary.image_url.as_deref(),
        Some(format!("{}/static/test.jpg", base).as_str())
    );
    assert_eq!(mock.lock().unwrap().bearers, vec![Some("Bearer tok".to_string())]);
}

#[tokio::test]
async fn test_predict_with_empty_file_sends_nothing() {
    let (base, mock) = spawn_mock(Mock::default()).await;
    let api = client(&base, Arc::new(MemorySession::new()));

    let err = api
        .predict(ImageUpload::new("empty.png", "image/png", Vec::new()))
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::Input(InputError::MissingFile));
    assert!(calls(&mock).is_empty());
}

#[tokio::test]
async fn test_history_accepts_bare_array() {
    let (base, mock) = spawn_mock(Mock {
        records: sample_records(),
        ..Default::default()
    })
    .await;
    let api = client(&base, Arc::new(MemorySession::with_token("tok")));

    let records = api.fetch_history(&HistoryQuery::recent(50)).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].predicted_class, "Melanoma");
    assert_eq!(calls(&mock), vec!["GET /history?limit=50"]);
}

#[tokio::test]
async fn test_history_accepts_items_envelope() {
    let (base, _mock) = spawn_mock(Mock {
        records: sample_records(),
        wrapped: true,
        ..Default::default()
    })
    .await;
    let api = client(&base, Arc::new(MemorySession::with_token("tok")));

    let records = api.fetch_history(&HistoryQuery::admin(false)).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].id, 2);
}

#[tokio::test]
async fn test_history_prefers_otp_session_token() {
    let (base, mock) = spawn_mock(Mock::default()).await;
    let session = Arc::new(MemorySession::with_token("tok"));
    session.set(SessionKey::OtpSession, OTP_TOKEN);
    let api = client(&base, session);

    api.fetch_history(&HistoryQuery::admin(true)).await.unwrap();

    assert_eq!(calls(&mock), vec!["GET /history?all=true&require_otp=true"]);
    assert_eq!(
        mock.lock().unwrap().bearers,
        vec![Some(format!("Bearer {}", OTP_TOKEN))]
    );
}

#[tokio::test]
async fn test_delete_then_reload() {
    let (base, mock) = spawn_mock(Mock {
        records: sample_records(),
        ..Default::default()
    })
    .await;
    let api = client(&base, Arc::new(MemorySession::with_token("tok")));

    let rows = delete_then_reload(&api, 1, &HistoryQuery::admin(false)).await.unwrap();

    assert_eq!(calls(&mock), vec!["DELETE /history/1", "GET /history?all=true"]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 2);
}

#[tokio::test]
async fn test_delete_failure_skips_reload() {
    let (base, mock) = spawn_mock(Mock {
        records: sample_records(),
        ..Default::default()
    })
    .await;
    let api = client(&base, Arc::new(MemorySession::with_token("tok")));

    let err = delete_then_reload(&api, 99, &HistoryQuery::admin(false))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation { status: 404, .. }));
    assert_eq!(calls(&mock), vec!["DELETE /history/99"]);
}

#[tokio::test]
async fn test_otp_gate_then_verify_unlocks_history() {
    let (base, mock) = spawn_mock(Mock {
        records: sample_records(),
        otp_gate: true,
        ..Default::default()
    })
    .await;
    let session = Arc::new(MemorySession::with_token("tok"));
    let api = client(&base, session.clone());

    let first = load_admin_history(&api, session.as_ref(), false).await.unwrap();
    assert_eq!(first, HistoryLoad::NeedsOtp);
    assert!(session.is_authenticated());

    api.verify_otp("a@b.com", "123456").await.unwrap();
    assert_eq!(session.otp_session().as_deref(), Some(OTP_TOKEN));

    match load_admin_history(&api, session.as_ref(), true).await.unwrap() {
        HistoryLoad::Records(records) => assert_eq!(records.len(), 2),
        other => panic!("expected records, got {:?}", other),
    }
    assert_eq!(calls(&mock).len(), 3);
}

#[tokio::test]
async fn test_short_otp_sends_nothing() {
    let (base, mock) = spawn_mock(Mock::default()).await;
    let api = client(&base, Arc::new(MemorySession::with_token("tok")));

    let err = api.verify_otp("a@b.com", "12345").await.unwrap_err();

    assert_eq!(err, ApiError::Input(InputError::OtpLength));
    assert!(calls(&mock).is_empty());
}

#[tokio::test]
async fn test_check_backend() {
    let (base, mock) = spawn_mock(Mock::default()).await;
    let api = client(&base, Arc::new(MemorySession::new()));

    api.check_backend().await.unwrap();

    assert_eq!(calls(&mock), vec!["GET /"]);
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let session = Arc::new(MemorySession::with_token("tok"));
    let api = client(&base, session.clone());

    let err = api.fetch_history(&HistoryQuery::recent(50)).await.unwrap_err();

    assert!(matches!(err, ApiError::Network { .. }));
    assert!(err.user_message().starts_with("Cannot connect to backend server at"));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_check_backend_accepts_any_status() {
    let (base, mock) = spawn_mock(Mock {
        root_status: Some(StatusCode::NOT_FOUND),
        ..Default::default()
    })
    .await;
    let api = client(&base, Arc::new(MemorySession::new()));

    assert_eq!(api.check_backend().await, Ok(()));
    assert_eq!(calls(&mock), vec!["GET /"]);
}

#[tokio::test]
async fn test_check_backend_leaves_session_alone() {
    let (base, _mock) = spawn_mock(Mock {
        root_status: Some(StatusCode::UNAUTHORIZED),
        ..Default::default()
    })
    .await;
    let session = Arc::new(MemorySession::with_token("tok"));
    let api = client(&base, session.clone());

    assert_eq!(api.check_backend().await, Ok(()));
    assert!(session.is_authenticated());
    assert_eq!(session.auth_token().as_deref(), Some("tok"));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let (base, _mock) = spawn_mock(Mock {
        history_delay: Some(Duration::from_secs(3)),
        ..Default::default()
    })
    .await;
    let session = Arc::new(MemorySession::with_token("tok"));
    let config = ClientConfig::new(&base).with_timeout(Duration::from_millis(200));
    let api = ApiClient::new(config, session.clone());

    let err = api.fetch_history(&HistoryQuery::recent(50)).await.unwrap_err();

    assert_eq!(err, ApiError::Timeout { millis: 200 });
    assert_eq!(
        err.user_message(),
        "Request timed out. The server may be slow or unreachable."
    );
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_server_error_is_classified() {
    let (base, _mock) = spawn_mock(Mock {
        history_crash: true,
        ..Default::default()
    })
    .await;
    let session = Arc::new(MemorySession::with_token("tok"));
    let api = client(&base, session.clone());

    let err = api.fetch_history(&HistoryQuery::recent(50)).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(err.user_message(), "Server error. Please try again later.");
    assert!(session.is_authenticated());
}
