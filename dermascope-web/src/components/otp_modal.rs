use dermascope_core::auth::{sanitize_otp_input, validate_otp, OTP_LENGTH};
use dermascope_core::history::otp_identifier;
use dermascope_core::AuthApi;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::info;

use crate::{use_live_flag, use_services};

/// Second-factor prompt shown before sensitive history data is loaded.
#[component]
pub fn OtpModal(on_verified: Callback<()>, on_cancel: Callback<()>) -> impl IntoView {
    let services = use_services();
    let code = RwSignal::new(String::new());
    let sent_via = RwSignal::new(Option::<String>::None);
    let error = RwSignal::new(Option::<String>::None);
    let busy = RwSignal::new(false);
    let live = use_live_flag();

    let on_send = {
        let (services, live) = (services.clone(), live.clone());
        move |_| {
            let (services, live) = (services.clone(), live.clone());
            busy.set(true);
            error.set(None);
            spawn_local(async move {
                let api = services.api();
                let sent = live
                    .guard(async {
                        match otp_identifier(&api, services.session.as_ref()).await {
                            Ok(email) => api.request_otp(&email).await,
                            Err(err) => Err(err),
                        }
                    })
                    .await;
                let Some(sent) = sent else {
                    return;
                };
                busy.set(false);
                match sent {
                    Ok(delivery) => {
                        info!("OTP sent via {}", delivery.method);
                        sent_via.set(Some(delivery.method));
                    }
                    Err(err) => {
                        services.note_failure(&err);
                        error.set(Some(err.user_message()));
                    }
                }
            });
        }
    };

    let on_verify = move |_| {
        let entered = code.get_untracked();
        if let Err(err) = validate_otp(&entered) {
            error.set(Some(err.to_string()));
            return;
        }
        let (services, live) = (services.clone(), live.clone());
        busy.set(true);
        error.set(None);
        spawn_local(async move {
            let api = services.api();
            let verified = live
                .guard(async {
                    match otp_identifier(&api, services.session.as_ref()).await {
                        Ok(email) => api.verify_otp(&email, &entered).await,
                        Err(err) => Err(err),
                    }
                })
                .await;
            let Some(verified) = verified else {
                return;
            };
            busy.set(false);
            match verified {
                Ok(_) => on_verified.run(()),
                Err(err) => {
                    services.note_failure(&err);
                    error.set(Some(err.user_message()));
                }
            }
        });
    };

    view! {
        <div class="modal-backdrop">
            <div class="modal otp-modal">
                <h3>"Verify it's you"</h3>
                <p>"Sensitive records require a one-time code."</p>
                <button class="secondary" on:click=on_send disabled=move || busy.get()>
                    {move || if sent_via.get().is_some() { "Resend code" } else { "Send code" }}
                </button>
                {move || {
                    sent_via
                        .get()
                        .map(|method| view! { <p class="muted">{format!("Code sent via {}", method)}</p> })
                }}
                <input
                    class="otp-input"
                    type="text"
                    inputmode="numeric"
                    autocomplete="one-time-code"
                    placeholder="000000"
                    maxlength=OTP_LENGTH.to_string()
                    prop:value=move || code.get()
                    on:input=move |ev| code.set(sanitize_otp_input(&event_target_value(&ev)))
                />
                {move || error.get().map(|message| view! { <div class="error">{message}</div> })}
                <div class="modal-actions">
                    <button class="link-button" on:click=move |_| on_cancel.run(())>
                        "Cancel"
                    </button>
                    <button
                        on:click=on_verify
                        disabled=move || busy.get() || code.with(|c| c.len() != OTP_LENGTH)
                    >
                        "Verify"
                    </button>
                </div>
            </div>
        </div>
    }
}
