use dermascope_core::result::ResultSummary;
use dermascope_core::routes::AppRoute;
use dermascope_core::SessionStore;
use leptos::prelude::*;
use leptos_meta::Title;
use leptos_router::components::{Redirect, A};
use tracing::debug;

use crate::components::{HeatmapSlider, PredictionCard, ProbabilityChart};
use crate::use_services;

/// Last prediction, recovered from session storage so a reload keeps it
#[component]
pub fn ResultPage() -> impl IntoView {
    let services = use_services();

    let Some(result) = services.session.last_prediction() else {
        debug!("No stored prediction, back to upload");
        return view! { <Redirect path=AppRoute::Upload.path()/> }.into_any();
    };
    let summary = ResultSummary::new(&result, services.config.media_base());

    view! {
        <Title text="Result | Dermascope"/>
        <section class="result-page">
            <h1>"Analysis result"</h1>
            <div class="result-grid">
                <HeatmapSlider
                    image_url=summary.image_url.clone()
                    heatmap_url=summary.heatmap_url.clone()
                />
                <PredictionCard summary=summary/>
            </div>
            <ProbabilityChart probabilities=result.probabilities/>
            <A href=AppRoute::Upload.path()>"Analyze another image"</A>
        </section>
    }
        .into_any()
}
