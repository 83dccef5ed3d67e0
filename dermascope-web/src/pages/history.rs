use dermascope_core::config::HISTORY_PAGE_LIMIT;
use dermascope_core::history::{delete_then_reload, DELETE_FAILED_ALERT};
use dermascope_core::{HistoryApi, HistoryQuery, HistoryRecord};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::Title;

use crate::components::HistoryTable;
use crate::{use_live_flag, use_services};

/// The signed-in user's recent predictions
#[component]
pub fn HistoryPage() -> impl IntoView {
    let services = use_services();
    let records = RwSignal::new(Vec::<HistoryRecord>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(Option::<String>::None);
    let query = HistoryQuery::recent(HISTORY_PAGE_LIMIT);

    let live = use_live_flag();

    {
        let services = services.clone();
        let query = query.clone();
        let live = live.clone();
        spawn_local(async move {
            let api = services.api();
            let Some(outcome) = live.guard(api.fetch_history(&query)).await else {
                return;
            };
            loading.set(false);
            match outcome {
                Ok(rows) => records.set(rows),
                Err(err) => {
                    services.note_failure(&err);
                    error.set(Some(err.user_message()));
                }
            }
        });
    }

    let on_delete = Callback::new({
        let services = services.clone();
        move |id: i64| {
            let services = services.clone();
            let query = query.clone();
            let live = live.clone();
            spawn_local(async move {
                let api = services.api();
                let Some(outcome) = live.guard(delete_then_reload(&api, id, &query)).await else {
                    return;
                };
                match outcome {
                    Ok(rows) => records.set(rows),
                    Err(err) => {
                        services.note_failure(&err);
                        let _ = window().alert_with_message(DELETE_FAILED_ALERT);
                    }
                }
            });
        }
    });

    view! {
        <Title text="History | Dermascope"/>
        <section class="history-page">
            <h1>"Prediction history"</h1>
            {move || error.get().map(|message| view! { <div class="error">{message}</div> })}
            <Show when=move || !loading.get() fallback=|| view! { <p class="muted">"Loading..."</p> }>
                <HistoryTable
                    records=records
                    media_base=services.config.media_base().to_string()
                    on_delete=on_delete
                />
            </Show>
        </section>
    }
}
