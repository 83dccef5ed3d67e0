use dermascope_core::flow::saved_message;
use dermascope_core::result::ResultSummary;
use dermascope_core::routes::AppRoute;
use dermascope_core::PredictionApi;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::Title;
use leptos_router::components::A;

use crate::analysis::AnalysisController;
use crate::components::{AnalyzeButton, HeatmapSlider, PredictionCard, ProbabilityChart, UploadCard};
use crate::{use_live_flag, use_services};

/// Upload, analyze and review on one screen, with an option to save the result
#[component]
pub fn DashboardPage() -> impl IntoView {
    let services = use_services();
    let controller = AnalysisController::new();
    let flow = controller.flow;
    let saved = RwSignal::new(Option::<String>::None);
    let saving = RwSignal::new(false);
    let live = use_live_flag();

    let on_analyze = {
        let (controller, services) = (controller.clone(), services.clone());
        move || {
            saved.set(None);
            controller.analyze(services.clone(), |_| {});
        }
    };

    let on_save = {
        let services = services.clone();
        move |_| {
            let Some(request) = flow.with_untracked(|f| f.save_request()) else {
                return;
            };
            let (services, live) = (services.clone(), live.clone());
            saving.set(true);
            spawn_local(async move {
                let api = services.api();
                let Some(outcome) = live.guard(api.save_result(&request)).await else {
                    return;
                };
                saving.set(false);
                match outcome {
                    Ok(record) => saved.set(Some(saved_message(record.id))),
                    Err(err) => {
                        services.note_failure(&err);
                        saved.set(Some(err.user_message()));
                    }
                }
            });
        }
    };

    let media_base = services.config.media_base().to_string();
    // Progress ticks update the flow too; only a new result should rebuild the card
    let latest = Memo::new(move |_| flow.with(|f| f.result().cloned()));
    let result_view = move || {
        latest.get().map(|result| {
            let summary = ResultSummary::new(&result, &media_base);
            view! {
                <div class="result-grid">
                    <HeatmapSlider
                        image_url=summary.image_url.clone()
                        heatmap_url=summary.heatmap_url.clone()
                    />
                    <PredictionCard summary=summary/>
                </div>
                <ProbabilityChart probabilities=result.probabilities/>
            }
        })
    };

    view! {
        <Title text="Dashboard | Dermascope"/>
        <section class="dashboard-page">
            <h1>"Dashboard"</h1>
            <div class="dashboard-grid">
                <div>
                    <UploadCard controller=controller.clone()/>
                    <AnalyzeButton controller=controller on_click=on_analyze/>
                </div>
                <div>{result_view}</div>
            </div>
            <Show when=move || latest.with(|r| r.is_some())>
                <div class="save-row">
                    <button on:click=on_save.clone() disabled=move || saving.get()>
                        "Save result"
                    </button>
                    {move || saved.get().map(|message| view! { <span class="muted">{message}</span> })}
                </div>
            </Show>
            <A href=AppRoute::History.path()>"View history"</A>
        </section>
    }
}
