use dermascope_core::routes::AppRoute;
use leptos::prelude::*;
use leptos_router::components::A;

use crate::use_services;

#[component]
pub fn Navbar() -> impl IntoView {
    let services = use_services();
    let signed_in = services.signed_in;

    let links = [
        AppRoute::Home,
        AppRoute::Upload,
        AppRoute::Dashboard,
        AppRoute::History,
        AppRoute::Admin,
    ];

    view! {
        <nav class="navbar">
            <span class="brand">"Dermascope"</span>
            <ul class="nav-links">
                {links
                    .into_iter()
                    .map(|route| view! { <li><A href=route.path()>{route.title()}</A></li> })
                    .collect_view()}
            </ul>
            <div class="nav-auth">
                {move || {
                    if signed_in.get() {
                        let services = services.clone();
                        view! {
                            <button class="link-button" on:click=move |_| services.logout()>
                                "Logout"
                            </button>
                        }
                            .into_any()
                    } else {
                        view! {
                            <A href=AppRoute::Login.path()>"Login"</A>
                            " "
                            <A href=AppRoute::Signup.path()>"Sign up"</A>
                        }
                            .into_any()
                    }
                }}
            </div>
        </nav>
    }
}
