use std::time::Duration;

use dermascope_core::config::RESULT_REDIRECT_DELAY_MS;
use dermascope_core::routes::AppRoute;
use leptos::prelude::*;
use leptos_meta::Title;
use leptos_router::hooks::use_navigate;

use crate::analysis::AnalysisController;
use crate::components::{AnalyzeButton, UploadCard};
use crate::{use_live_flag, use_services};

/// Consumer flow: pick an image, analyze, then move on to the result page
#[component]
pub fn UploadPage() -> impl IntoView {
    let services = use_services();
    let navigate = use_navigate();
    let controller = AnalysisController::new();
    let live = use_live_flag();

    let on_analyze = {
        let controller = controller.clone();
        move || {
            let (navigate, live) = (navigate.clone(), live.clone());
            controller.analyze(services.clone(), move |outcome| {
                if outcome.is_ok() {
                    set_timeout(
                        move || {
                            live.run(|| navigate(AppRoute::Result.path(), Default::default()));
                        },
                        Duration::from_millis(RESULT_REDIRECT_DELAY_MS),
                    );
                }
            });
        }
    };

    view! {
        <Title text="Upload | Dermascope"/>
        <section class="upload-page">
            <h1>"Analyze a skin image"</h1>
            <UploadCard controller=controller.clone()/>
            <AnalyzeButton controller=controller on_click=on_analyze/>
        </section>
    }
}
