use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRoute {
    Home,
    Upload,
    Result,
    Login,
    Signup,
    Admin,
    History,
    Dashboard,
}

impl AppRoute {
    pub const ALL: [AppRoute; 8] = [
        Self::Home,
        Self::Upload,
        Self::Result,
        Self::Login,
        Self::Signup,
        Self::Admin,
        Self::History,
        Self::Dashboard,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Upload => "/upload",
            Self::Result => "/result",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Admin => "/admin",
            Self::History => "/history",
            Self::Dashboard => "/dashboard",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Self::ALL.into_iter().find(|route| route.path() == trimmed)
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Upload => "Upload",
            Self::Result => "Result",
            Self::Login => "Login",
            Self::Signup => "Sign up",
            Self::Admin => "Admin",
            Self::History => "History",
            Self::Dashboard => "Dashboard",
        }
    }
}

/// Where navigation to a route should end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(AppRoute),
    Redirect(AppRoute),
}

/// Token-gated routes redirect to login when no auth token is stored.
pub fn guard(route: AppRoute, session: &dyn SessionStore) -> RouteDecision {
    if route.requires_auth() && !session.is_authenticated() {
        RouteDecision::Redirect(AppRoute::Login)
    } else {
        RouteDecision::Render(route)
    }
}
