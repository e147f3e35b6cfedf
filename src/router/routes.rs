use std::collections::BTreeMap;

/// What a route demands of the session before it may be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only with a valid session.
    RequiresAuth,
    /// Only without a session (e.g. the login page).
    RequiresGuest,
    Public,
}

/// The page a route renders. Views themselves live in the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Home,
    Users,
    AddUser,
    Orders,
    AddOrder,
    OrderDetail,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RouteDef {
    /// Pattern; `:name` segments capture a parameter.
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub access: Access,
}

/// The application's routes, matched in order.
pub static ROUTES: &[RouteDef] = &[
    RouteDef {
        path: "/login",
        name: "Login",
        view: View::Login,
        access: Access::RequiresGuest,
    },
    RouteDef {
        path: "/",
        name: "Home",
        view: View::Home,
        access: Access::RequiresAuth,
    },
    RouteDef {
        path: "/users",
        name: "Users",
        view: View::Users,
        access: Access::RequiresAuth,
    },
    RouteDef {
        path: "/users/add",
        name: "AddUser",
        view: View::AddUser,
        access: Access::RequiresAuth,
    },
    RouteDef {
        path: "/orders",
        name: "Orders",
        view: View::Orders,
        access: Access::RequiresAuth,
    },
    RouteDef {
        path: "/orders/add",
        name: "AddOrder",
        view: View::AddOrder,
        access: Access::RequiresAuth,
    },
    RouteDef {
        path: "/orders/:id",
        name: "OrderDetail",
        view: View::OrderDetail,
        access: Access::RequiresAuth,
    },
];

/// A concrete path resolved against a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static RouteDef,
    /// The normalized path that matched.
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Strips query string and fragment, and any trailing slash except the root's.
pub fn normalize(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match expected.strip_prefix(':') {
            Some(name) if !actual.is_empty() => {
                params.insert(name.to_string(), actual.to_string());
            }
            Some(_) => return None,
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

/// Resolve `path` against `routes`; the first matching route wins.
pub fn resolve_in(routes: &'static [RouteDef], path: &str) -> Option<RouteMatch> {
    let path = normalize(path);
    routes.iter().find_map(|route| {
        match_pattern(route.path, &path).map(|params| RouteMatch {
            route,
            path: path.clone(),
            params,
        })
    })
}

/// Resolve `path` against the application's routes.
pub fn resolve(path: &str) -> Option<RouteMatch> {
    resolve_in(ROUTES, path)
}

pub fn find_by_name(name: &str) -> Option<&'static RouteDef> {
    ROUTES.iter().find(|route| route.name == name)
}
