// Route guard
//
// Pure decision function: given where the user wants to go and the
// current session, either allow it or name the redirect target.

use strum::{Display, EnumIter, EnumString};

use super::Session;

/// Destinations a front end can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    Customers,
    Settings,
}

impl Route {
    /// Routes that require a signed-in identity.
    pub fn is_protected(self) -> bool {
        matches!(self, Self::Dashboard | Self::Customers | Self::Settings)
    }

    /// Path the browser front end served this route on.
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Signup => "/signup",
            Self::Dashboard => "/dashboard",
            Self::Customers => "/dashboard/customers",
            Self::Settings => "/dashboard/settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(Route),
}

/// Protected routes bounce anonymous users to `Login`; the login and
/// signup pages bounce signed-in users to `Dashboard`.
pub fn guard(route: Route, session: &Session) -> RouteDecision {
    match (route.is_protected(), session.is_authenticated()) {
        (true, false) => RouteDecision::Redirect(Route::Login),
        (false, true) => RouteDecision::Redirect(Route::Dashboard),
        _ => RouteDecision::Allow,
    }
}
