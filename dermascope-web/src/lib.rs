use std::sync::Arc;

use dermascope_core::liveness::LiveFlag;
use dermascope_core::routes::AppRoute;
use dermascope_core::{ApiClient, ApiError, ClientConfig, SessionStore};
use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::hooks::use_navigate;
use leptos_router::path;
use tracing::info;
use wasm_bindgen::prelude::*;

mod analysis;
mod browser;
mod components;
mod logging;
mod pages;

use browser::BrowserSession;
use components::Navbar;
use pages::*;

/// Shared handles every view reaches through context
#[derive(Clone)]
pub struct AppServices {
    pub config: ClientConfig,
    pub session: Arc<BrowserSession>,
    /// Mirrors whether an auth token is stored, so the shell can react
    pub signed_in: RwSignal<bool>,
}

impl AppServices {
    pub fn new() -> Self {
        let session = Arc::new(BrowserSession);
        let signed_in = RwSignal::new(session.is_authenticated());
        Self {
            config: ClientConfig::from_build_env(),
            session,
            signed_in,
        }
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.config.clone(), self.session.clone())
    }

    pub fn refresh_auth(&self) {
        self.signed_in.set(self.session.is_authenticated());
    }

    /// Auth failures have already cleared the store; this propagates that to the UI.
    pub fn note_failure(&self, err: &ApiError) {
        if err.is_auth() {
            self.refresh_auth();
        }
    }

    pub fn logout(&self) {
        self.api().logout();
        self.refresh_auth();
    }
}

impl Default for AppServices {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_services() -> AppServices {
    use_context::<AppServices>().unwrap_or_default()
}

/// Liveness flag cancelled when the calling view is torn down
pub fn use_live_flag() -> LiveFlag {
    let live = LiveFlag::new();
    let on_teardown = live.clone();
    on_cleanup(move || on_teardown.cancel());
    live
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    let services = AppServices::new();
    info!("API base: {}", services.config.api_base);
    provide_context(services);

    view! {
        <Stylesheet id="leptos" href="/pkg/dermascope-web.css"/>
        <Title text="Dermascope"/>
        <Router>
            <SessionWatcher/>
            <Navbar/>
            <main class="container">
                <Routes fallback=|| view! { <NotFound/> }>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/upload") view=UploadPage/>
                    <Route path=path!("/result") view=ResultPage/>
                    <Route path=path!("/login") view=LoginPage/>
                    <Route path=path!("/signup") view=SignupPage/>
                    <Route path=path!("/admin") view=AdminPage/>
                    <Route path=path!("/history") view=HistoryPage/>
                    <Route path=path!("/dashboard") view=DashboardPage/>
                </Routes>
            </main>
        </Router>
    }
}

/// Sends the user to login whenever the session goes from signed in to signed out.
#[component]
fn SessionWatcher() -> impl IntoView {
    let services = use_services();
    let navigate = use_navigate();

    Effect::new(move |was_signed_in: Option<bool>| {
        let signed_in = services.signed_in.get();
        if was_signed_in == Some(true) && !signed_in {
            info!("Session ended, redirecting to login");
            navigate(AppRoute::Login.path(), Default::default());
        }
        signed_in
    });
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    leptos::mount::mount_to_body(App);
}
