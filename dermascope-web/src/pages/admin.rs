use dermascope_core::history::{
    delete_then_reload, load_admin_history, HistoryLoad, HistoryStats, DELETE_FAILED_ALERT,
};
use dermascope_core::liveness::LiveFlag;
use dermascope_core::routes::{guard, AppRoute, RouteDecision};
use dermascope_core::{HistoryQuery, HistoryRecord};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::Title;
use leptos_router::components::Redirect;
use tracing::info;

use crate::components::{BarChart, HistoryTable, LineChart, OtpModal};
use crate::{use_live_flag, use_services, AppServices};

#[derive(Clone, Copy)]
struct AdminState {
    records: RwSignal<Vec<HistoryRecord>>,
    loading: RwSignal<bool>,
    error: RwSignal<Option<String>>,
    needs_otp: RwSignal<bool>,
    /// Whether the last load asked for OTP-protected data
    secure: RwSignal<bool>,
}

impl AdminState {
    fn new() -> Self {
        Self {
            records: RwSignal::new(Vec::new()),
            loading: RwSignal::new(false),
            error: RwSignal::new(None),
            needs_otp: RwSignal::new(false),
            secure: RwSignal::new(false),
        }
    }

    fn query(&self) -> HistoryQuery {
        HistoryQuery::admin(self.secure.get_untracked())
    }
}

fn reload(services: AppServices, live: LiveFlag, state: AdminState) {
    let require_otp = state.secure.get_untracked();
    state.loading.set(true);
    state.error.set(None);

    spawn_local(async move {
        let api = services.api();
        let Some(outcome) = live
            .guard(load_admin_history(&api, services.session.as_ref(), require_otp))
            .await
        else {
            return;
        };
        state.loading.set(false);
        match outcome {
            Ok(HistoryLoad::Records(rows)) => {
                info!("Admin dashboard loaded {} records", rows.len());
                state.needs_otp.set(false);
                state.records.set(rows);
            }
            Ok(HistoryLoad::NeedsOtp) => state.needs_otp.set(true),
            Err(err) => {
                services.note_failure(&err);
                state.error.set(Some(err.user_message()));
            }
        }
    });
}

/// Every user's predictions with summary statistics. Requires a login token.
#[component]
pub fn AdminPage() -> impl IntoView {
    let services = use_services();
    if let RouteDecision::Redirect(to) = guard(AppRoute::Admin, services.session.as_ref()) {
        return view! { <Redirect path=to.path()/> }.into_any();
    }

    let state = AdminState::new();
    let live = use_live_flag();
    reload(services.clone(), live.clone(), state);

    let stats = Memo::new(move |_| state.records.with(|r| HistoryStats::from_records(r)));
    let class_data = Signal::derive(move || stats.with(|s| s.classes.entries().to_vec()));
    let weekly_data = Signal::derive(move || stats.with(|s| s.weekly.clone()));

    let on_refresh = {
        let (services, live) = (services.clone(), live.clone());
        move |_| {
            state.secure.set(false);
            reload(services.clone(), live.clone(), state);
        }
    };

    let on_secure_reload = {
        let (services, live) = (services.clone(), live.clone());
        move |_| {
            state.secure.set(true);
            reload(services.clone(), live.clone(), state);
        }
    };

    let on_verified = Callback::new({
        let (services, live) = (services.clone(), live.clone());
        move |_: ()| {
            state.needs_otp.set(false);
            reload(services.clone(), live.clone(), state);
        }
    });

    let on_cancel_otp = Callback::new(move |_: ()| {
        state.needs_otp.set(false);
        state.secure.set(false);
    });

    let on_delete = Callback::new({
        let (services, live) = (services.clone(), live.clone());
        move |id: i64| {
            let (services, live) = (services.clone(), live.clone());
            let query = state.query();
            spawn_local(async move {
                let api = services.api();
                let Some(outcome) = live.guard(delete_then_reload(&api, id, &query)).await else {
                    return;
                };
                match outcome {
                    Ok(rows) => state.records.set(rows),
                    Err(err) => {
                        services.note_failure(&err);
                        let _ = window().alert_with_message(DELETE_FAILED_ALERT);
                    }
                }
            });
        }
    });

    let on_logout = {
        let services = services.clone();
        move |_| services.logout()
    };

    view! {
        <Title text="Admin | Dermascope"/>
        <section class="admin-page">
            <header class="admin-header">
                <h1>"Admin dashboard"</h1>
                <div class="admin-actions">
                    <button on:click=on_refresh disabled=move || state.loading.get()>
                        "Refresh"
                    </button>
                    <button
                        class="secondary"
                        on:click=on_secure_reload
                        disabled=move || state.loading.get()
                    >
                        "Secure reload"
                    </button>
                    <button class="link-button" on:click=on_logout>
                        "Logout"
                    </button>
                </div>
            </header>

            {move || state.error.get().map(|message| view! { <div class="error">{message}</div> })}

            <Show when=move || state.needs_otp.get()>
                <OtpModal on_verified=on_verified on_cancel=on_cancel_otp/>
            </Show>

            <div class="stat-cards">
                <div class="stat-card">
                    <span class="stat-label">"Total predictions"</span>
                    <span class="stat-value">{move || stats.with(|s| s.total.to_string())}</span>
                </div>
                <div class="stat-card">
                    <span class="stat-label">"Classes"</span>
                    <span class="stat-value">
                        {move || stats.with(|s| s.distinct_classes().to_string())}
                    </span>
                </div>
                <div class="stat-card">
                    <span class="stat-label">"Average confidence"</span>
                    <span class="stat-value">{move || stats.with(|s| s.mean_confidence_label())}</span>
                </div>
                <div class="stat-card">
                    <span class="stat-label">"This week"</span>
                    <span class="stat-value">{move || stats.with(|s| s.this_week().to_string())}</span>
                </div>
            </div>

            <div class="charts">
                <figure>
                    <figcaption>"Predictions by class"</figcaption>
                    <BarChart data=class_data/>
                </figure>
                <figure>
                    <figcaption>"Predictions per week"</figcaption>
                    <LineChart data=weekly_data/>
                </figure>
            </div>

            <Show
                when=move || !state.needs_otp.get()
                fallback=|| view! { <p class="muted">"Verify your one-time code to view records."</p> }
            >
                <HistoryTable
                    records=state.records
                    media_base=services.config.media_base().to_string()
                    on_delete=on_delete
                />
            </Show>
        </section>
    }
        .into_any()
}
