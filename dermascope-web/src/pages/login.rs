use dermascope_core::auth::login_error_message;
use dermascope_core::routes::AppRoute;
use dermascope_core::AuthApi;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::Title;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;
use tracing::warn;

use crate::{use_live_flag, use_services};

#[component]
pub fn LoginPage() -> impl IntoView {
    let services = use_services();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(Option::<String>::None);
    let backend_down = RwSignal::new(Option::<String>::None);
    let loading = RwSignal::new(false);
    let live = use_live_flag();

    {
        let (services, live) = (services.clone(), live.clone());
        spawn_local(async move {
            let api = services.api();
            if let Some(Err(err)) = live.guard(api.check_backend()).await {
                warn!("Backend connectivity check failed: {}", err);
                backend_down.set(Some(err.user_message()));
            }
        });
    }

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let (services, live) = (services.clone(), live.clone());
        let navigate = navigate.clone();
        let (email_value, password_value) = (email.get_untracked(), password.get_untracked());

        loading.set(true);
        error.set(None);
        spawn_local(async move {
            let api = services.api();
            let outcome = live.guard(api.login(&email_value, &password_value)).await;
            services.refresh_auth();
            let Some(outcome) = outcome else {
                return;
            };
            loading.set(false);
            match outcome {
                Ok(_) => navigate(AppRoute::Admin.path(), Default::default()),
                Err(err) => error.set(Some(login_error_message(&err))),
            }
        });
    };

    view! {
        <Title text="Login | Dermascope"/>
        <section class="auth-page">
            <h1>"Login"</h1>
            {move || backend_down.get().map(|message| view! { <div class="warning">{message}</div> })}
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
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </label>
                {move || error.get().map(|message| view! { <div class="error">{message}</div> })}
                <button type="submit" disabled=move || loading.get()>
                    {move || if loading.get() { "Signing in..." } else { "Login" }}
                </button>
            </form>
            <p>"No account yet? " <A href=AppRoute::Signup.path()>"Sign up"</A></p>
        </section>
    }
}
