//! Route registration and lookup.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::handler::Argument;
use crate::path::RulePattern;
use crate::recovery::ErrorRoutes;
use crate::request::Method;

/// Response shaping applied before a route's handler runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptions {
    /// Content type to stage, e.g. `application/json`.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Status code to stage.
    #[serde(default)]
    pub status: Option<u16>,
}

impl RouteOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// A single registered route.
#[derive(Debug, Clone)]
pub struct Route<H> {
    /// HTTP method.
    pub method: Method,
    /// Compiled rule, normalized with the table prefix.
    pub pattern: RulePattern,
    /// Opaque handler reference.
    pub handler: H,
    /// Response options.
    pub options: RouteOptions,
}

impl<H> Route<H> {
    /// Returns the normalized rule.
    pub fn rule(&self) -> &str {
        self.pattern.rule()
    }
}

/// What an active route was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// A registered rule path.
    Path(String),
    /// A synthetic error route for the given code.
    Error(u16),
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.write_str(path),
            Self::Error(code) => write!(f, "{code}"),
        }
    }
}

/// The route resolved for the current request.
#[derive(Debug, Clone)]
pub struct ActiveRoute<H> {
    /// Request method the route serves.
    pub method: String,
    /// Rule the route was resolved from.
    pub rule: Rule,
    /// Handler to invoke.
    pub handler: H,
    /// Positional handler arguments.
    pub arguments: Vec<Argument>,
    /// Response options.
    pub options: RouteOptions,
}

impl<H> ActiveRoute<H> {
    /// Captured path parameters, in rule order.
    pub fn params(&self) -> Vec<&str> {
        self.arguments.iter().filter_map(Argument::as_str).collect()
    }

    /// Returns true if this is the error route for `code`.
    pub fn is_error_route(&self, code: u16) -> bool {
        self.rule == Rule::Error(code)
    }
}

/// One or more methods to register a rule under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Methods(Vec<Method>);

impl Methods {
    /// Iterates over the methods.
    pub fn iter(&self) -> impl Iterator<Item = Method> + '_ {
        self.0.iter().copied()
    }
}

impl From<Method> for Methods {
    fn from(method: Method) -> Self {
        Self(vec![method])
    }
}

impl From<Vec<Method>> for Methods {
    fn from(methods: Vec<Method>) -> Self {
        Self(methods)
    }
}

impl From<&[Method]> for Methods {
    fn from(methods: &[Method]) -> Self {
        Self(methods.to_vec())
    }
}

impl<const N: usize> From<[Method; N]> for Methods {
    fn from(methods: [Method; N]) -> Self {
        Self(methods.to_vec())
    }
}

/// Normalizes a path prefix to `/segment/.../` form.
pub(crate) fn normalize_prefix(path: &str) -> String {
    format!("/{}/", path.trim_matches('/')).replace("//", "/")
}

/// Registered routes, bucketed per method in registration order.
///
/// Built once at startup and read-only afterwards; share it by reference
/// or behind an `Arc` across requests.
///
/// # Example
///
/// ```
/// use orbital_router::{Method, RouteTable};
///
/// let table = RouteTable::new()
///     .get("/users/(:id)", "show_user")
///     .route([Method::Get, Method::Post], "/login", "login")
///     .error(404, "not_found");
///
/// let route = table.lookup("/users/42", "GET").unwrap();
/// assert_eq!(route.handler, "show_user");
/// assert_eq!(route.params(), vec!["42"]);
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    /// Prefix applied to rules at registration time.
    prefix: String,
    /// Routes per method.
    routes: HashMap<Method, Vec<Route<H>>>,
    /// Fallback handlers per error code.
    errors: ErrorRoutes<H>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouteTable<H> {
    /// Creates an empty table with the root prefix.
    pub fn new() -> Self {
        Self {
            prefix: "/".to_string(),
            routes: HashMap::new(),
            errors: ErrorRoutes::new(),
        }
    }

    /// Sets the prefix for routes registered from now on.
    pub fn set_prefix(&mut self, path: &str) {
        self.prefix = normalize_prefix(path);
        debug!(prefix = %self.prefix, "route prefix set");
    }

    /// Sets the prefix for routes registered from now on.
    #[must_use]
    pub fn with_prefix(mut self, path: &str) -> Self {
        self.set_prefix(path);
        self
    }

    /// Returns the current prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Applies the prefix to `rule` and normalizes separators.
    pub fn normalize(&self, rule: &str) -> String {
        let path = format!("{}{}", self.prefix, rule.trim_matches('/')).replace("//", "/");
        if path == "/" {
            path
        } else {
            path.trim_end_matches('/').to_string()
        }
    }

    /// Registers an error handler for `code`.
    pub fn set_error(&mut self, code: u16, handler: H) {
        self.errors.insert(code, handler);
    }

    /// Registers an error handler for `code`.
    #[must_use]
    pub fn error(mut self, code: u16, handler: H) -> Self {
        self.set_error(code, handler);
        self
    }

    /// Returns the error routes.
    pub fn error_routes(&self) -> &ErrorRoutes<H> {
        &self.errors
    }

    /// Returns the routes registered for `method`, in lookup order.
    pub fn routes(&self, method: Method) -> &[Route<H>] {
        self.routes
            .get(&method)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of registrations across all methods.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// Returns true if no route is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<H: Clone> RouteTable<H> {
    /// Registers `rule` for each of `methods`.
    ///
    /// Registering a (method, path) pair again replaces the handler and
    /// options but keeps the original position in lookup order.
    pub fn register(
        &mut self,
        methods: impl Into<Methods>,
        rule: &str,
        handler: H,
        options: RouteOptions,
    ) {
        let path = self.normalize(rule);
        let methods: Methods = methods.into();

        for method in methods.iter() {
            let route = Route {
                method,
                pattern: RulePattern::compile(&path),
                handler: handler.clone(),
                options: options.clone(),
            };

            let bucket = self.routes.entry(method).or_default();
            match bucket.iter_mut().find(|r| r.rule() == path) {
                Some(existing) => {
                    debug!(%method, rule = %path, "route replaced");
                    *existing = route;
                }
                None => {
                    debug!(%method, rule = %path, "route registered");
                    bucket.push(route);
                }
            }
        }
    }

    /// Adds a route with default options.
    #[must_use]
    pub fn route(mut self, methods: impl Into<Methods>, rule: &str, handler: H) -> Self {
        self.register(methods, rule, handler, RouteOptions::default());
        self
    }

    /// Adds a route with options.
    #[must_use]
    pub fn route_with(
        mut self,
        methods: impl Into<Methods>,
        rule: &str,
        handler: H,
        options: RouteOptions,
    ) -> Self {
        self.register(methods, rule, handler, options);
        self
    }

    /// Adds a GET route.
    #[must_use]
    pub fn get(self, rule: &str, handler: H) -> Self {
        self.route(Method::Get, rule, handler)
    }

    /// Adds a POST route.
    #[must_use]
    pub fn post(self, rule: &str, handler: H) -> Self {
        self.route(Method::Post, rule, handler)
    }

    /// Adds a PUT route.
    #[must_use]
    pub fn put(self, rule: &str, handler: H) -> Self {
        self.route(Method::Put, rule, handler)
    }

    /// Adds a DELETE route.
    #[must_use]
    pub fn delete(self, rule: &str, handler: H) -> Self {
        self.route(Method::Delete, rule, handler)
    }

    /// Finds the route serving `query` for `method`.
    ///
    /// Routes are tried in registration order and the first match wins,
    /// even when a later rule is more specific. Unsupported methods never
    /// match.
    pub fn lookup(&self, query: &str, method: &str) -> Option<ActiveRoute<H>> {
        let Some(parsed) = Method::from_str(method) else {
            trace!(method, "unsupported method");
            return None;
        };

        let found = self.routes(parsed).iter().find_map(|route| {
            let params = route.pattern.captures(query)?;
            Some(ActiveRoute {
                method: method.to_string(),
                rule: Rule::Path(route.rule().to_string()),
                handler: route.handler.clone(),
                arguments: params
                    .into_iter()
                    .map(|p| Argument::Segment(p.to_string()))
                    .collect(),
                options: route.options.clone(),
            })
        });

        match &found {
            Some(route) => trace!(method, query, rule = %route.rule, "route matched"),
            None => trace!(method, query, "no route matched"),
        }

        found
    }
}
