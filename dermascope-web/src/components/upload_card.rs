use leptos::prelude::*;
use web_sys::DragEvent;

use crate::analysis::AnalysisController;

/// Drop zone and file picker with a preview of the current selection.
///
/// Both entry points go through the same selection path. Input is disabled
/// while an analysis is running.
#[component]
pub fn UploadCard(controller: AnalysisController) -> impl IntoView {
    let input_ref = NodeRef::<leptos::html::Input>::new();
    let dragging = RwSignal::new(false);
    let flow = controller.flow;
    let busy = move || flow.with(|f| f.is_analyzing());

    let on_pick = {
        let controller = controller.clone();
        move |_| {
            if let Some(input) = input_ref.get() {
                if let Some(file) = input.files().and_then(|files| files.get(0)) {
                    controller.select(file);
                }
                // lets the same file be picked again after a clear
                input.set_value("");
            }
        }
    };

    let on_drop = {
        let controller = controller.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            dragging.set(false);
            if controller.is_analyzing() {
                return;
            }
            let file = ev
                .data_transfer()
                .and_then(|transfer| transfer.files())
                .and_then(|files| files.get(0));
            if let Some(file) = file {
                controller.select(file);
            }
        }
    };

    let on_clear = move |_| controller.clear();

    let preview = move || flow.with(|f| f.selection().preview_url().map(str::to_string));
    let file_name = move || flow.with(|f| f.selection().file().map(|file| file.0.name()));

    view! {
        <div
            class="upload-card"
            class:dragging=move || dragging.get()
            class:disabled=busy
            on:dragover=move |ev: DragEvent| {
                ev.prevent_default();
                dragging.set(true);
            }
            on:dragleave=move |_| dragging.set(false)
            on:drop=on_drop
        >
            {move || match preview() {
                Some(url) => {
                    view! { <img class="upload-preview" src=url alt="Selected image preview"/> }
                        .into_any()
                }
                None => {
                    view! {
                        <p class="upload-hint">"Drag and drop a skin image here, or choose a file"</p>
                    }
                        .into_any()
                }
            }}
            <label class="file-button">
                "Choose image"
                <input
                    type="file"
                    accept="image/*"
                    node_ref=input_ref
                    on:change=on_pick
                    disabled=busy
                />
            </label>
            {move || {
                file_name()
                    .map(|name| {
                        view! {
                            <div class="upload-selected">
                                <span>{name}</span>
                                <button class="link-button" on:click=on_clear.clone() disabled=busy>
                                    "Remove"
                                </button>
                            </div>
                        }
                    })
            }}
        </div>
    }
}
