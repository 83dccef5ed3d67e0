use dermascope_core::slider::{overlay_style, track_style, SliderState, SliderView, FALLBACK_TEXT};
use leptos::prelude::*;

/// Wipe comparison between the uploaded image and its Grad-CAM heatmap
#[component]
pub fn HeatmapSlider(
    #[prop(into)] image_url: Option<String>,
    #[prop(into)] heatmap_url: Option<String>,
) -> impl IntoView {
    let slider = RwSignal::new(SliderState::new());

    // Only changes when the fallback flips, so the images are not rebuilt on every drag
    let sources = Memo::new(move |_| {
        slider.with(|s| match s.view(image_url.as_deref(), heatmap_url.as_deref()) {
            SliderView::Compare {
                image_url,
                heatmap_url,
                ..
            } => Some((image_url.to_string(), heatmap_url.to_string())),
            SliderView::Fallback => None,
        })
    });

    let position = move || slider.with(|s| s.position());
    let on_error = move |_| slider.update(|s| s.mark_errored());

    move || match sources.get() {
        None => view! { <div class="heatmap-fallback">{FALLBACK_TEXT}</div> }.into_any(),
        Some((image, heatmap)) => {
            view! {
                <div class="heatmap-slider">
                    <div class="heatmap-stage">
                        <img class="heatmap-base" src=image alt="Original image" on:error=on_error/>
                        <img
                            class="heatmap-overlay"
                            src=heatmap
                            alt="Grad-CAM heatmap"
                            style=move || overlay_style(position())
                            on:error=on_error
                        />
                    </div>
                    <input
                        type="range"
                        min="0"
                        max="100"
                        class="heatmap-range"
                        prop:value=move || position().to_string()
                        style=move || track_style(position())
                        on:input=move |ev| {
                            let raw = event_target_value(&ev);
                            slider.update(|s| s.set_from_input(&raw));
                        }
                    />
                    <div class="heatmap-labels">
                        <span>"Original"</span>
                        <span>{move || format!("{}%", position())}</span>
                        <span>"Heatmap"</span>
                    </div>
                </div>
            }
                .into_any()
        }
    }
}
