use dermascope_core::result::{confidence_percent, resolve_media_url};
use dermascope_core::HistoryRecord;
use leptos::prelude::*;

#[component]
pub fn HistoryTable(
    #[prop(into)] records: Signal<Vec<HistoryRecord>>,
    media_base: String,
    #[prop(optional)] on_delete: Option<Callback<i64>>,
) -> impl IntoView {
    view! {
        <table class="history-table">
            <thead>
                <tr>
                    <th>"ID"</th>
                    <th>"Date"</th>
                    <th>"Image"</th>
                    <th>"Prediction"</th>
                    <th>"Confidence"</th>
                    {on_delete.is_some().then(|| view! { <th></th> })}
                </tr>
            </thead>
            <tbody>
                <For
                    each=move || records.get()
                    key=|record| record.id
                    let:record
                >
                    {
                        let image = resolve_media_url(&media_base, record.image_ref());
                        let id = record.id;
                        view! {
                            <tr>
                                <td>{id.to_string()}</td>
                                <td>{record.display_timestamp()}</td>
                                <td>
                                    {match image {
                                        Some(src) => {
                                            view! { <img class="history-thumb" src=src alt="Lesion"/> }
                                                .into_any()
                                        }
                                        None => view! { <span class="muted">"—"</span> }.into_any(),
                                    }}
                                </td>
                                <td>{record.predicted_class.clone()}</td>
                                <td>{format!("{}%", confidence_percent(record.confidence))}</td>
                                {on_delete
                                    .map(|on_delete| {
                                        view! {
                                            <td>
                                                <button
                                                    class="delete-button"
                                                    on:click=move |_| on_delete.run(id)
                                                >
                                                    "Delete"
                                                </button>
                                            </td>
                                        }
                                    })}
                            </tr>
                        }
                    }
                </For>
            </tbody>
        </table>
        <Show when=move || records.with(|r| r.is_empty())>
            <p class="muted">"No predictions yet."</p>
        </Show>
    }
}
