use std::time::Duration;

use dermascope_core::auth::{signup_success_message, MIN_PASSWORD_LEN};
use dermascope_core::config::SIGNUP_REDIRECT_DELAY_MS;
use dermascope_core::routes::AppRoute;
use dermascope_core::AuthApi;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::Title;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;
use tracing::info;

use crate::{use_live_flag, use_services};

#[component]
pub fn SignupPage() -> impl IntoView {
    let services = use_services();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(Option::<String>::None);
    let success = RwSignal::new(Option::<String>::None);
    let loading = RwSignal::new(false);
    let live = use_live_flag();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() || success.get_untracked().is_some() {
            return;
        }
        let (services, live) = (services.clone(), live.clone());
        let navigate = navigate.clone();
        let (email_value, password_value) = (email.get_untracked(), password.get_untracked());

        loading.set(true);
        error.set(None);
        spawn_local(async move {
            let api = services.api();
            let Some(outcome) = live.guard(api.signup(&email_value, &password_value)).await else {
                return;
            };
            loading.set(false);
            match outcome {
                Ok(account) => {
                    info!("Created account {} ({})", account.email, account.role);
                    success.set(Some(signup_success_message(account.is_admin())));
                    set_timeout(
                        move || {
                            live.run(|| navigate(AppRoute::Login.path(), Default::default()));
                        },
                        Duration::from_millis(SIGNUP_REDIRECT_DELAY_MS),
                    );
                }
                Err(err) => error.set(Some(err.user_message())),
            }
        });
    };

    view! {
        <Title text="Sign up | Dermascope"/>
        <section class="auth-page">
            <h1>"Create an account"</h1>
            <form class="auth-form" on:submit=on_submit>
                <label>
                    "Email"
                    <input
                        type="email"
                        autocomplete="username"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                </label>
                <label>
                    "Password"
                    <input
                        type="password"
                        autocomplete="new-password"
                        placeholder=format!("At least {} characters", MIN_PASSWORD_LEN)
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </label>
                {move || error.get().map(|message| view! { <div class="error">{message}</div> })}
                {move || success.get().map(|message| view! { <div class="success">{message}</div> })}
                <button type="submit" disabled=move || loading.get() || success.get().is_some()>
                    {move || if loading.get() { "Creating account..." } else { "Sign up" }}
                </button>
            </form>
            <p>"Already registered? " <A href=AppRoute::Login.path()>"Login"</A></p>
        </section>
    }
}
