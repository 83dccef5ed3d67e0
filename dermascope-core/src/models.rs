use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One class score from the model output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Probability {
    pub label: String,
    pub score: f64,
}

/// Response of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    #[serde(default)]
    pub id: Option<i64>,
    pub predicted_class: String,
    pub confidence: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub heatmap_url: Option<String>,
    /// Server-side storage path, only returned by some deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub probabilities: Vec<Probability>,
}

/// A saved prediction as listed by `GET /history`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub id: i64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    pub predicted_class: String,
    pub confidence: f64,
}

impl HistoryRecord {
    pub fn image_ref(&self) -> Option<&str> {
        self.image_url.as_deref().or(self.image_path.as_deref())
    }

    /// Timestamp as a naive date-time, accepting RFC 3339 and offset-less ISO forms.
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(self.timestamp.as_deref()?)
    }

    /// Table cell text for the timestamp column
    pub fn display_timestamp(&self) -> String {
        self.recorded_at()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| MISSING_TIMESTAMP.to_string())
    }
}

/// Shown in place of a timestamp that is absent or unreadable
pub const MISSING_TIMESTAMP: &str = "—";

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// The history endpoint answers with either a bare array or an `items` envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum HistoryPayload {
    List(Vec<HistoryRecord>),
    Wrapped { items: Vec<HistoryRecord> },
}

impl HistoryPayload {
    pub(crate) fn into_records(self) -> Vec<HistoryRecord> {
        match self {
            Self::List(records) | Self::Wrapped { items: records } => records,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Admins see every user's predictions
    pub all: bool,
    pub require_otp: bool,
    pub limit: Option<u32>,
}

impl HistoryQuery {
    pub fn admin(require_otp: bool) -> Self {
        Self {
            all: true,
            require_otp,
            limit: None,
        }
    }

    pub fn recent(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if self.all {
            params.push(("all", "true".to_string()));
        }
        if self.require_otp {
            params.push(("require_otp", "true".to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SaveResultRequest {
    pub predicted_class: String,
    pub confidence: f64,
    pub image_path: Option<String>,
}

impl From<&PredictionResult> for SaveResultRequest {
    fn from(result: &PredictionResult) -> Self {
        Self {
            predicted_class: result.predicted_class.clone(),
            confidence: result.confidence,
            image_path: result.image_path.clone().or_else(|| result.image_url.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SignupResponse {
    pub id: i64,
    pub email: String,
    pub role: String,
}

impl SignupResponse {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OtpRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct OtpVerifyRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

/// Channel the code was sent over (email, sms)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OtpDelivery {
    pub method: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OtpSession {
    pub session_token: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AccountSettings {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_payload_bare_array() {
        let json = r#"[{"id": 1, "predicted_class": "Melanoma", "confidence": 0.9}]"#;
        let payload: HistoryPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.into_records().len(), 1);
    }

    #[test]
    fn test_history_payload_items_envelope() {
        let json = r#"{"items": [
            {"id": 1, "predicted_class": "Melanoma", "confidence": 0.9, "image_path": "a.jpg"},
            {"id": 2, "predicted_class": "Nevus", "confidence": 0.3}
        ], "count": 2}"#;
        let records = serde_json::from_str::<HistoryPayload>(json)
            .unwrap()
            .into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].image_ref(), Some("a.jpg"));
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDateTime::parse_from_str("2024-01-15 10:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parse_timestamp("2024-01-15T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T10:30:00.000000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_display_timestamp() {
        let mut record: HistoryRecord = serde_json::from_str(
            r#"{"id": 1, "timestamp": "2024-01-15T10:30:00Z", "predicted_class": "Nevus", "confidence": 0.3}"#,
        )
        .unwrap();
        assert_eq!(record.display_timestamp(), "2024-01-15 10:30");

        record.timestamp = Some("garbage".to_string());
        assert_eq!(record.display_timestamp(), MISSING_TIMESTAMP);
    }

    #[test]
    fn test_history_query_params() {
        let params = HistoryQuery::admin(true).params();
        assert_eq!(
            params,
            vec![("all", "true".to_string()), ("require_otp", "true".to_string())]
        );
        assert_eq!(HistoryQuery::recent(50).params(), vec![("limit", "50".to_string())]);
    }

    #[test]
    fn test_save_request_prefers_image_path() {
        let result = PredictionResult {
            id: None,
            predicted_class: "Nevus".to_string(),
            confidence: 0.5,
            image_url: Some("/static/u.jpg".to_string()),
            heatmap_url: None,
            image_path: Some("uploads/u.jpg".to_string()),
            timestamp: None,
            probabilities: vec![],
        };
        let request = SaveResultRequest::from(&result);
        assert_eq!(request.image_path.as_deref(), Some("uploads/u.jpg"));
    }
}
