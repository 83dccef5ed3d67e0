use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::{debug, info, warn};

use crate::client::{AuthApi, HistoryApi};
use crate::error::{ApiError, ApiResult};
use crate::models::{HistoryQuery, HistoryRecord};
use crate::session::{SessionKey, SessionStore};

/// Number of weekly buckets charted on the admin dashboard
pub const WEEKS_SHOWN: usize = 8;
pub const DELETE_FAILED_ALERT: &str = "Failed to delete record";

/// Predictions per class, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCounts(Vec<(String, usize)>);

impl ClassCounts {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for record in records {
            match counts.iter_mut().find(|(class, _)| *class == record.predicted_class) {
                Some((_, n)) => *n += 1,
                None => counts.push((record.predicted_class.clone(), 1)),
            }
        }
        Self(counts)
    }

    pub fn get(&self, class: &str) -> Option<usize> {
        self.0.iter().find(|(c, _)| c == class).map(|(_, n)| *n)
    }

    /// Number of distinct classes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.0
    }
}

pub fn mean_confidence(records: &[HistoryRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.confidence).sum::<f64>() / records.len() as f64
}

/// Week-of-month bucket key: `(year, ceil(day / 7))`
fn week_key(record: &HistoryRecord) -> Option<(i32, u32)> {
    let at = record.recorded_at()?;
    Some((at.year(), (at.day() + 6) / 7))
}

/// Record counts for the last [`WEEKS_SHOWN`] week buckets, oldest first.
///
/// Records without a readable timestamp are skipped. Fewer buckets are
/// padded with leading zeros.
pub fn weekly_counts(records: &[HistoryRecord]) -> Vec<usize> {
    let mut buckets: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for record in records {
        match week_key(record) {
            Some(key) => *buckets.entry(key).or_insert(0) += 1,
            None => debug!("Record {} has no usable timestamp", record.id),
        }
    }

    let counts: Vec<usize> = buckets.into_values().collect();
    let recent = &counts[counts.len().saturating_sub(WEEKS_SHOWN)..];

    let mut padded = vec![0; WEEKS_SHOWN - recent.len()];
    padded.extend_from_slice(recent);
    padded
}

/// Figures for the admin statistics cards and charts
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub total: usize,
    pub classes: ClassCounts,
    pub mean_confidence: f64,
    pub weekly: Vec<usize>,
}

impl HistoryStats {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        Self {
            total: records.len(),
            classes: ClassCounts::from_records(records),
            mean_confidence: mean_confidence(records),
            weekly: weekly_counts(records),
        }
    }

    pub fn distinct_classes(&self) -> usize {
        self.classes.len()
    }

    /// Count in the most recent bucket
    pub fn this_week(&self) -> usize {
        self.weekly.last().copied().unwrap_or(0)
    }

    pub fn mean_confidence_label(&self) -> String {
        if self.total == 0 {
            "0%".to_string()
        } else {
            format!("{:.1}%", self.mean_confidence * 100.0)
        }
    }
}

/// Outcome of loading the admin table
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryLoad {
    Records(Vec<HistoryRecord>),
    /// Data stays hidden until an OTP session token is obtained
    NeedsOtp,
}

/// Load every user's predictions for the admin dashboard.
///
/// With `require_otp` and no OTP session the call is not made at all. A 403
/// asking for OTP is turned into [`HistoryLoad::NeedsOtp`].
pub async fn load_admin_history<A: HistoryApi>(
    api: &A,
    session: &dyn SessionStore,
    require_otp: bool,
) -> ApiResult<HistoryLoad> {
    if !session.is_authenticated() {
        return Err(ApiError::Auth {
            status: 401,
            message: "Please login to access admin dashboard".to_string(),
        });
    }
    if require_otp && session.otp_session().is_none() {
        info!("Secure reload requested without an OTP session");
        return Ok(HistoryLoad::NeedsOtp);
    }

    match api.fetch_history(&HistoryQuery::admin(require_otp)).await {
        Ok(records) => Ok(HistoryLoad::Records(records)),
        Err(ApiError::OtpRequired(detail)) => {
            info!("History requires OTP: {}", detail);
            Ok(HistoryLoad::NeedsOtp)
        }
        Err(err) => Err(err),
    }
}

/// Delete a record, then reload the whole list.
///
/// There is no optimistic removal: on failure the caller keeps its current
/// list and shows [`DELETE_FAILED_ALERT`].
pub async fn delete_then_reload<A: HistoryApi>(
    api: &A,
    id: i64,
    query: &HistoryQuery,
) -> ApiResult<Vec<HistoryRecord>> {
    if let Err(err) = api.delete_history_record(id).await {
        warn!("Delete of record {} failed: {}", id, err);
        return Err(err);
    }
    api.fetch_history(query).await
}

/// Email the OTP is sent to: the login email, else the account settings.
pub async fn otp_identifier<A: AuthApi>(api: &A, session: &dyn SessionStore) -> ApiResult<String> {
    if let Some(email) = session.get(SessionKey::AccountEmail).filter(|e| !e.is_empty()) {
        return Ok(email);
    }
    let settings = api.account_settings().await?;
    session.set(SessionKey::AccountEmail, &settings.email);
    Ok(settings.email)
}
