use tracing::{debug, info, warn};

use crate::client::PredictionApi;
use crate::error::{ApiError, ApiResult, InputError};
use crate::models::{PredictionResult, SaveResultRequest};
use crate::session::SessionStore;
use crate::upload::{PreviewUrls, UploadSelection, UploadSource};

pub const PROGRESS_CAP: u8 = 90;
pub const PROGRESS_STEP: u8 = 10;
pub const PROGRESS_TICK_MS: u64 = 200;

/// Upload progress shown while a prediction is running.
///
/// Never decreases while a request is outstanding and stays below 100 until
/// the response arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress(u8);

impl Progress {
    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Timer-driven advance used when the transport reports no upload events.
    pub fn tick(&mut self) {
        self.advance_to(self.0.saturating_add(PROGRESS_STEP));
    }

    /// Upload events cover the first half of the bar; inference covers the rest.
    pub fn observe_upload(&mut self, loaded: u64, total: u64) {
        if total == 0 {
            return;
        }
        let pct = ((loaded.min(total) as f64 * 0.5) / total as f64 * 100.0).round() as u8;
        self.advance_to(pct);
    }

    pub fn advance_to(&mut self, pct: u8) {
        self.0 = self.0.max(pct.min(PROGRESS_CAP));
    }

    pub fn complete(&mut self) {
        self.0 = 100;
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    Analyzing,
    ResultReady,
}

/// Upload → analyze → result state machine behind the upload and dashboard views.
///
/// A failed analysis lands back in [`Phase::FileSelected`] with
/// [`PredictionFlow::error`] set, so the user can retry with the same file.
#[derive(Debug, Clone)]
pub struct PredictionFlow<F> {
    selection: UploadSelection<F>,
    phase: Phase,
    result: Option<PredictionResult>,
    error: Option<String>,
    progress: Progress,
}

impl<F> Default for PredictionFlow<F> {
    fn default() -> Self {
        Self {
            selection: UploadSelection::default(),
            phase: Phase::Idle,
            result: None,
            error: None,
            progress: Progress::default(),
        }
    }
}

impl<F: UploadSource> PredictionFlow<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selection(&self) -> &UploadSelection<F> {
        &self.selection
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn is_analyzing(&self) -> bool {
        self.phase == Phase::Analyzing
    }

    /// Whether the analyze action is enabled.
    pub fn can_analyze(&self) -> bool {
        self.selection.has_file() && !self.is_analyzing()
    }

    /// Pick a new file. Rejected while an analysis is in flight.
    pub fn select(&mut self, file: F, previews: &impl PreviewUrls<F>) -> Result<(), InputError> {
        if self.is_analyzing() {
            return Err(InputError::AnalysisInFlight);
        }
        debug!("Selected {}", file.file_name());
        self.selection.select(file, previews);
        self.phase = Phase::FileSelected;
        self.result = None;
        self.error = None;
        self.progress.reset();
        Ok(())
    }

    pub fn clear(&mut self, previews: &impl PreviewUrls<F>) -> Result<(), InputError> {
        if self.is_analyzing() {
            return Err(InputError::AnalysisInFlight);
        }
        self.selection.clear(previews);
        self.phase = Phase::Idle;
        self.result = None;
        self.error = None;
        self.progress.reset();
        Ok(())
    }

    /// Release the preview on view teardown, whatever the phase.
    pub fn teardown(&mut self, previews: &impl PreviewUrls<F>) {
        self.selection.clear(previews);
    }

    /// Enter [`Phase::Analyzing`] and hand back the file to upload.
    pub fn begin(&mut self) -> Result<F, InputError> {
        if self.is_analyzing() {
            return Err(InputError::AnalysisInFlight);
        }
        let file = match self.selection.file() {
            Some(file) => file.clone(),
            None => {
                self.error = Some(InputError::MissingFile.to_string());
                return Err(InputError::MissingFile);
            }
        };
        self.phase = Phase::Analyzing;
        self.error = None;
        self.progress.reset();
        Ok(file)
    }

    pub fn tick_progress(&mut self) {
        if self.is_analyzing() {
            self.progress.tick();
        }
    }

    /// Apply the outcome of the request started by [`begin`](Self::begin).
    ///
    /// Successful results are mirrored into the session store. Returns `false`
    /// when no analysis was in flight and the outcome was ignored.
    pub fn finish(&mut self, outcome: &ApiResult<PredictionResult>, store: &dyn SessionStore) -> bool {
        if !self.is_analyzing() {
            warn!("Ignoring prediction outcome with no analysis in flight");
            return false;
        }
        match outcome {
            Ok(result) => {
                self.progress.complete();
                store.store_prediction(result);
                self.result = Some(result.clone());
                self.phase = Phase::ResultReady;
            }
            Err(err) => {
                self.progress.reset();
                self.error = Some(err.user_message());
                self.phase = Phase::FileSelected;
            }
        }
        true
    }

    /// Run a full analysis against `api`.
    pub async fn analyze<A: PredictionApi>(
        &mut self,
        api: &A,
        store: &dyn SessionStore,
    ) -> ApiResult<PredictionResult> {
        let file = self.begin().map_err(ApiError::from)?;
        info!("Analyzing {}", file.file_name());

        let outcome = match file.read_upload().await {
            Ok(upload) => api.predict(upload).await,
            Err(err) => Err(err),
        };
        self.finish(&outcome, store);
        outcome
    }

    pub fn save_request(&self) -> Option<SaveResultRequest> {
        self.result.as_ref().map(SaveResultRequest::from)
    }
}

pub fn saved_message(id: i64) -> String {
    format!("Saved prediction #{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryRecord;
    use crate::session::{MemorySession, SessionKey};
    use crate::upload::tests::{png, CountingPreviews};
    use crate::upload::ImageUpload;
    use async_trait::async_trait;
    use std::cell::Cell;

    struct FakePredictor {
        calls: Cell<usize>,
        fail: bool,
    }

    impl FakePredictor {
        fn ok() -> Self {
            Self { calls: Cell::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { calls: Cell::new(0), fail: true }
        }
    }

    #[async_trait(?Send)]
    impl PredictionApi for FakePredictor {
        async fn predict(&self, _image: ImageUpload) -> ApiResult<PredictionResult> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ApiError::from_status(500, ""));
            }
            Ok(PredictionResult {
                id: Some(1),
                predicted_class: "Melanoma".to_string(),
                confidence: 0.92,
                image_url: Some("/static/test.jpg".to_string()),
                heatmap_url: Some("/static/heatmap.jpg".to_string()),
                image_path: None,
                timestamp: None,
                probabilities: vec![],
            })
        }

        async fn save_result(&self, _request: &SaveResultRequest) -> ApiResult<HistoryRecord> {
            unreachable!("not used by the flow")
        }
    }

    #[test]
    fn test_analyze_disabled_without_file() {
        let flow: PredictionFlow<ImageUpload> = PredictionFlow::new();
        assert_eq!(flow.phase(), Phase::Idle);
        assert!(!flow.can_analyze());
    }

    #[test]
    fn test_selecting_file_enables_analyze() {
        let previews = CountingPreviews::default();
        let mut flow = PredictionFlow::new();
        flow.select(png("lesion.png"), &previews).unwrap();

        assert_eq!(flow.phase(), Phase::FileSelected);
        assert!(flow.can_analyze());
        assert!(flow.selection().preview_url().is_some());
    }

    #[test]
    fn test_begin_without_file_fails_fast() {
        let mut flow: PredictionFlow<ImageUpload> = PredictionFlow::new();
        assert_eq!(flow.begin().unwrap_err(), InputError::MissingFile);
        assert_eq!(flow.phase(), Phase::Idle);
        assert_eq!(flow.error(), Some("Please select an image first."));
    }

    #[test]
    fn test_second_begin_is_rejected_while_analyzing() {
        let previews = CountingPreviews::default();
        let mut flow = PredictionFlow::new();
        flow.select(png("lesion.png"), &previews).unwrap();

        assert!(flow.begin().is_ok());
        assert_eq!(flow.begin().unwrap_err(), InputError::AnalysisInFlight);
        assert!(!flow.can_analyze());
        assert_eq!(
            flow.select(png("other.png"), &previews),
            Err(InputError::AnalysisInFlight)
        );
    }

    #[tokio::test]
    async fn test_success_stores_result_in_session() {
        let previews = CountingPreviews::default();
        let session = MemorySession::new();
        let api = FakePredictor::ok();
        let mut flow = PredictionFlow::new();
        flow.select(png("lesion.png"), &previews).unwrap();

        let result = flow.analyze(&api, &session).await.unwrap();

        assert_eq!(flow.phase(), Phase::ResultReady);
        assert_eq!(flow.progress().percent(), 100);
        assert_eq!(session.last_prediction(), Some(result));
        assert!(session.get(SessionKey::LastPrediction).is_some());
        assert_eq!(api.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_failure_returns_to_file_selected() {
        let previews = CountingPreviews::default();
        let session = MemorySession::new();
        let api = FakePredictor::failing();
        let mut flow = PredictionFlow::new();
        flow.select(png("lesion.png"), &previews).unwrap();

        assert!(flow.analyze(&api, &session).await.is_err());

        assert_eq!(flow.phase(), Phase::FileSelected);
        assert_eq!(flow.error(), Some("Server error. Please try again later."));
        assert_eq!(flow.progress().percent(), 0);
        assert!(flow.can_analyze());
        assert_eq!(session.last_prediction(), None);
    }

    #[tokio::test]
    async fn test_no_network_call_without_file() {
        let session = MemorySession::new();
        let api = FakePredictor::ok();
        let mut flow: PredictionFlow<ImageUpload> = PredictionFlow::new();

        assert!(flow.analyze(&api, &session).await.is_err());
        assert_eq!(api.calls.get(), 0);
    }

    #[test]
    fn test_stale_finish_is_ignored() {
        let session = MemorySession::new();
        let mut flow: PredictionFlow<ImageUpload> = PredictionFlow::new();
        let outcome = Err(ApiError::from_status(500, ""));
        assert!(!flow.finish(&outcome, &session));
        assert_eq!(flow.phase(), Phase::Idle);
    }

    #[test]
    fn test_progress_is_monotonic_and_capped() {
        let mut progress = Progress::default();
        progress.observe_upload(50, 100);
        assert_eq!(progress.percent(), 25);

        progress.observe_upload(10, 100);
        assert_eq!(progress.percent(), 25);

        for _ in 0..20 {
            progress.tick();
        }
        assert_eq!(progress.percent(), PROGRESS_CAP);

        progress.observe_upload(100, 100);
        assert_eq!(progress.percent(), PROGRESS_CAP);

        progress.complete();
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_clear_releases_preview() {
        let previews = CountingPreviews::default();
        let mut flow = PredictionFlow::new();
        flow.select(png("a.png"), &previews).unwrap();
        flow.select(png("b.png"), &previews).unwrap();
        flow.clear(&previews).unwrap();

        assert_eq!(previews.live(), 0);
        assert_eq!(flow.phase(), Phase::Idle);
    }
}
