use dermascope_core::result::{probability_bars, ConfidenceTier, ResultSummary};
use dermascope_core::Probability;
use leptos::prelude::*;

use crate::analysis::AnalysisController;

/// Predicted class, confidence bar and the severity advice
#[component]
pub fn PredictionCard(summary: ResultSummary) -> impl IntoView {
    let tier = ConfidenceTier::from_percent(summary.percent);
    let severity = summary.severity;
    let explanation = summary.explanation();

    view! {
        <section class="prediction-card">
            <h2 class="predicted-class">{summary.predicted_class}</h2>
            <div class="confidence">
                <span class="confidence-label">"Confidence"</span>
                <span class="confidence-value">{format!("{}%", summary.percent)}</span>
            </div>
            <div class="confidence-track">
                <div class=tier.bar_class() style=format!("width: {}%;", summary.percent)></div>
            </div>
            <p class="confidence-note">{tier.note()}</p>
            <div class="severity">
                <span class=severity.badge_class()>{format!("{} severity", severity.label())}</span>
                <p class="severity-advice">{severity.advice()}</p>
            </div>
            <p class="explanation">{explanation}</p>
        </section>
    }
}

/// Per-class scores, when the model returned them
#[component]
pub fn ProbabilityChart(probabilities: Vec<Probability>) -> impl IntoView {
    let bars = probability_bars(&probabilities);
    (!bars.is_empty()).then(|| {
        view! {
            <section class="probability-chart">
                <h3>"Probability distribution"</h3>
                {bars
                    .into_iter()
                    .map(|bar| {
                        view! {
                            <div class="probability-row">
                                <span class="probability-label">{bar.label}</span>
                                <div class="probability-track">
                                    <div
                                        class="probability-bar"
                                        style=format!("width: {}%;", bar.width)
                                    ></div>
                                </div>
                                <span class="probability-value">{format!("{:.1}%", bar.percent)}</span>
                            </div>
                        }
                    })
                    .collect_view()}
            </section>
        }
    })
}

/// Analyze action with the progress bar and inline error of the flow
#[component]
pub fn AnalyzeButton(
    controller: AnalysisController,
    on_click: impl Fn() + 'static,
) -> impl IntoView {
    let flow = controller.flow;
    let enabled = move || flow.with(|f| f.can_analyze());
    let analyzing = move || flow.with(|f| f.is_analyzing());
    let progress = move || flow.with(|f| f.progress().percent());
    let error = move || flow.with(|f| f.error().map(str::to_string));

    view! {
        <div class="analyze">
            <button class="analyze-button" disabled=move || !enabled() on:click=move |_| on_click()>
                {move || if analyzing() { "Analyzing..." } else { "Analyze" }}
            </button>
            <Show when=analyzing>
                <div class="progress-track">
                    <div class="progress-bar" style=move || format!("width: {}%;", progress())></div>
                </div>
                <p class="progress-label">{move || format!("{}%", progress())}</p>
            </Show>
            {move || error().map(|message| view! { <div class="error">{message}</div> })}
        </div>
    }
}
