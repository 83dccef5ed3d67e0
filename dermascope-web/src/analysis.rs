use std::sync::{Arc, Mutex};
use std::time::Duration;

use dermascope_core::flow::{PredictionFlow, PROGRESS_TICK_MS};
use dermascope_core::liveness::LiveFlag;
use dermascope_core::upload::UploadSource;
use dermascope_core::{ApiResult, PredictionApi, PredictionResult};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::{debug, warn};

use crate::browser::{BrowserFile, ObjectUrls};
use crate::AppServices;

pub type FlowSignal = RwSignal<PredictionFlow<BrowserFile>, LocalStorage>;

/// Owns the prediction flow of one view.
///
/// The preview URL is revoked, the progress timer stopped and in-flight
/// responses dropped when the owning view is torn down.
#[derive(Clone)]
pub struct AnalysisController {
    pub flow: FlowSignal,
    live: LiveFlag,
    ticker: Arc<Mutex<Option<IntervalHandle>>>,
}

impl AnalysisController {
    pub fn new() -> Self {
        let flow: FlowSignal = RwSignal::new_local(PredictionFlow::new());
        let live = LiveFlag::new();
        let ticker = Arc::new(Mutex::new(None));

        let (on_teardown, teardown_ticker) = (live.clone(), ticker.clone());
        on_cleanup(move || {
            on_teardown.cancel();
            stop_ticker(&teardown_ticker);
            flow.try_update(|f| f.teardown(&ObjectUrls));
        });

        Self { flow, live, ticker }
    }

    pub fn is_analyzing(&self) -> bool {
        self.flow.with(|f| f.is_analyzing())
    }

    pub fn select(&self, file: web_sys::File) {
        self.flow.update(|f| {
            if let Err(err) = f.select(BrowserFile(file), &ObjectUrls) {
                debug!("Selection ignored: {}", err);
            }
        });
    }

    pub fn clear(&self) {
        self.flow.update(|f| {
            if let Err(err) = f.clear(&ObjectUrls) {
                debug!("Clear ignored: {}", err);
            }
        });
    }

    /// Start an analysis of the selected file.
    ///
    /// A no-op while one is already running. `on_done` sees the outcome after
    /// the flow has been updated, unless the view is gone by then.
    pub fn analyze(
        &self,
        services: AppServices,
        on_done: impl FnOnce(ApiResult<PredictionResult>) + 'static,
    ) {
        let file = match self.flow.try_update(|f| f.begin()) {
            Some(Ok(file)) => file,
            Some(Err(err)) => {
                debug!("Analysis not started: {}", err);
                return;
            }
            None => return,
        };

        let flow = self.flow;
        match set_interval_with_handle(
            move || {
                flow.try_update(|f| f.tick_progress());
            },
            Duration::from_millis(PROGRESS_TICK_MS),
        ) {
            Ok(handle) => {
                let stale = self.ticker.lock().ok().and_then(|mut slot| slot.replace(handle));
                if let Some(stale) = stale {
                    stale.clear();
                }
            }
            Err(_) => warn!("Could not start the progress timer"),
        }

        let (live, ticker) = (self.live.clone(), self.ticker.clone());
        spawn_local(async move {
            let api = services.api();
            let outcome = live
                .guard(async {
                    match file.read_upload().await {
                        Ok(upload) => api.predict(upload).await,
                        Err(err) => Err(err),
                    }
                })
                .await;

            stop_ticker(&ticker);
            let Some(outcome) = outcome else {
                return;
            };

            flow.update(|f| {
                f.finish(&outcome, services.session.as_ref());
            });
            if let Err(err) = &outcome {
                services.note_failure(err);
            }
            on_done(outcome);
        });
    }
}

fn stop_ticker(ticker: &Mutex<Option<IntervalHandle>>) {
    if let Some(handle) = take_pending(ticker) {
        handle.clear();
    }
}

fn take_pending<T>(slot: &Mutex<Option<T>>) -> Option<T> {
    slot.lock().ok().and_then(|mut slot| slot.take())
}
