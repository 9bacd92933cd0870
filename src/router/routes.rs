use std::borrow::Cow;
use std::fmt;

/// Where unauthenticated users are sent.
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
/// Public landing page.
pub const LANDING_PATH: &str = "/";
/// Default view for authenticated users.
pub const HOME_PATH: &str = "/dashboard";

/// Paths on which a 401 does not trigger a redirect to the login page.
pub const PUBLIC_PATHS: [&str; 3] = [LOGIN_PATH, REGISTER_PATH, LANDING_PATH];

/// How a route relates to authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Only reachable with a session.
    Protected,
    /// Only meaningful without a session (login, register, landing).
    PublicOnly,
    /// Reachable either way.
    Neutral,
}

/// Views are rendered elsewhere; the router only names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Landing,
    Login,
    Register,
    Dashboard,
    AgentChat,
    Opportunities,
    Mentor,
    Crm,
    Network,
    Interview,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub access: RouteAccess,
}

const fn route(path: &'static str, name: &'static str, view: View, access: RouteAccess) -> RouteRecord {
    RouteRecord {
        path,
        name,
        view,
        access,
    }
}

/// Static path table, immutable once built.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteRecord>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteRecord>) -> Self {
        RouteTable { routes }
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    pub fn resolve(&self, path: &str) -> Option<&RouteRecord> {
        let path = normalize_route_path(path);
        self.routes.iter().find(|r| r.path == path)
    }

    /// Unknown paths are neutral.
    pub fn access_for(&self, path: &str) -> RouteAccess {
        self.resolve(path)
            .map(|r| r.access)
            .unwrap_or(RouteAccess::Neutral)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        use RouteAccess::{Protected, PublicOnly};
        RouteTable::new(vec![
            route(LANDING_PATH, "Landing", View::Landing, PublicOnly),
            route(LOGIN_PATH, "Login", View::Login, PublicOnly),
            route(REGISTER_PATH, "Register", View::Register, PublicOnly),
            route(HOME_PATH, "Dashboard", View::Dashboard, Protected),
            route("/chat", "AgentChat", View::AgentChat, Protected),
            route("/opportunities", "Opportunities", View::Opportunities, Protected),
            route("/mentor", "Mentor", View::Mentor, Protected),
            route("/crm", "CRM", View::Crm, Protected),
            route("/network", "Network", View::Network, Protected),
            route("/interview", "Interview", View::Interview, Protected),
        ])
    }
}

/// Drops the query string, the fragment and any trailing slash, and makes
/// sure the result starts with a single slash.
pub fn normalize_route_path(path: &str) -> Cow<'_, str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        Cow::Borrowed(LANDING_PATH)
    } else if trimmed.starts_with('/') {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("/{trimmed}"))
    }
}

pub fn is_public_path(path: &str) -> bool {
    let path = normalize_route_path(path);
    PUBLIC_PATHS.iter().any(|public| *public == path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_access() {
        let table = RouteTable::default();
        for path in ["/", "/login", "/register"] {
            assert_eq!(table.access_for(path), RouteAccess::PublicOnly, "{path}");
        }
        for path in [
            "/dashboard",
            "/chat",
            "/opportunities",
            "/mentor",
            "/crm",
            "/network",
            "/interview",
        ] {
            assert_eq!(table.access_for(path), RouteAccess::Protected, "{path}");
        }
        assert_eq!(table.access_for("/nowhere"), RouteAccess::Neutral);
    }

    #[test]
    fn test_resolve_ignores_query_fragment_and_trailing_slash() {
        let table = RouteTable::default();
        let record = table.resolve("/crm/?tab=contacts#top").expect("route");
        assert_eq!(record.view, View::Crm);
        assert_eq!(record.name, "CRM");
        assert_eq!(table.resolve("").map(|r| r.view), Some(View::Landing));
    }

    #[test]
    fn test_normalize_route_path() {
        assert_eq!(normalize_route_path("/"), "/");
        assert_eq!(normalize_route_path("///"), "/");
        assert_eq!(normalize_route_path("/login?next=/crm"), "/login");
        assert_eq!(normalize_route_path("/chat#bottom"), "/chat");
        assert_eq!(normalize_route_path("dashboard"), "/dashboard");
        assert_eq!(normalize_route_path("crm/?tab=1"), "/crm");
    }

    #[test]
    fn test_relative_paths_keep_their_access() {
        let table = RouteTable::default();
        assert_eq!(table.access_for("dashboard"), RouteAccess::Protected);
        assert_eq!(table.access_for("login"), RouteAccess::PublicOnly);
        assert!(is_public_path("register"));
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/"));
        assert!(is_public_path("/login?expired=1"));
        assert!(is_public_path("/register/"));
        assert!(!is_public_path("/dashboard"));
    }
}
