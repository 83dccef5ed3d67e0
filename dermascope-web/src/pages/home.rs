use dermascope_core::routes::AppRoute;
use leptos::prelude::*;
use leptos_meta::Title;
use leptos_router::components::A;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <Title text="Dermascope"/>
        <section class="hero">
            <h1>"AI-assisted skin lesion screening"</h1>
            <p>
                "Upload a dermatoscopic image to get a predicted lesion class, a confidence score "
                "and a heatmap of the regions that drove the prediction."
            </p>
            <div class="hero-actions">
                <A href=AppRoute::Upload.path()>"Analyze an image"</A>
                <A href=AppRoute::Dashboard.path()>"Open dashboard"</A>
            </div>
            <p class="disclaimer">
                "This tool is for informational purposes only and does not replace professional medical advice."
            </p>
        </section>
    }
}

#[component]
pub fn NotFound() -> impl IntoView {
    view! {
        <section class="not-found">
            <h1>"Page not found"</h1>
            <A href=AppRoute::Home.path()>"Back to home"</A>
        </section>
    }
}
