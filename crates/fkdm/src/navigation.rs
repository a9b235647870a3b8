//! Routes and the navigation guard.
//!
//! Every route except login requires a logged-in user. The guard itself is
//! stateless: it looks at whether a session exists and either lets the
//! request through or names the route to go to instead.

use std::str::FromStr;

use crate::error::Error;

/// A navigable view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    Root,
    /// `/login`
    Login,
    /// `/dashboard`
    Dashboard,
    /// `/create-report`
    CreateReport,
    /// `/view-report/:id`
    ViewReport(String),
    /// `/profile`
    Profile,
}

impl Route {
    /// The view a logged-in user lands on.
    pub const DEFAULT: Route = Route::Dashboard;

    /// Whether this route needs a logged-in user.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Root | Self::Login)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "/"),
            Self::Login => write!(f, "/login"),
            Self::Dashboard => write!(f, "/dashboard"),
            Self::CreateReport => write!(f, "/create-report"),
            Self::ViewReport(id) => write!(f, "/view-report/{id}"),
            Self::Profile => write!(f, "/profile"),
        }
    }
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Ok(Self::Root),
            "/login" => Ok(Self::Login),
            "/dashboard" => Ok(Self::Dashboard),
            "/create-report" => Ok(Self::CreateReport),
            "/profile" => Ok(Self::Profile),
            _ => match trimmed.strip_prefix("/view-report/") {
                Some(id) if !id.is_empty() && !id.contains('/') => {
                    Ok(Self::ViewReport(id.to_string()))
                }
                _ => Err(Error::UnknownRoute(path.to_string())),
            },
        }
    }
}

/// Outcome of asking the guard for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Show the requested route.
    Allow(Route),
    /// Go to this route instead.
    Redirect(Route),
}

impl Navigation {
    /// The route that ends up displayed.
    #[must_use]
    pub fn route(&self) -> &Route {
        match self {
            Self::Allow(route) | Self::Redirect(route) => route,
        }
    }
}

/// Decide what happens when `route` is requested.
#[must_use]
pub fn guard(route: Route, authenticated: bool) -> Navigation {
    match route {
        Route::Root if authenticated => Navigation::Redirect(Route::DEFAULT),
        Route::Root => Navigation::Redirect(Route::Login),
        Route::Login if authenticated => Navigation::Redirect(Route::DEFAULT),
        route if route.is_protected() && !authenticated => Navigation::Redirect(Route::Login),
        route => Navigation::Allow(route),
    }
}
