//! Request side of routing: methods, request info and the derived context.

use std::fmt;

use tracing::trace;

/// Script name stripped from the reported script path by default.
pub const DEFAULT_SCRIPT_NAME: &str = "/index.php";

/// HTTP and WebDAV methods that routes can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    /// GET method (also serves HEAD)
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// DELETE method
    Delete,
    /// CONNECT method
    Connect,
    /// OPTIONS method
    Options,
    /// TRACE method
    Trace,
    /// WebDAV COPY
    Copy,
    /// WebDAV LOCK
    Lock,
    /// WebDAV MKCOL
    Mkcol,
    /// WebDAV MOVE
    Move,
    /// WebDAV PROPFIND
    Propfind,
    /// WebDAV PROPPATCH
    Proppatch,
    /// WebDAV UNLOCK
    Unlock,
    /// WebDAV REPORT
    Report,
    /// WebDAV MKACTIVITY
    Mkactivity,
    /// WebDAV CHECKOUT
    Checkout,
    /// WebDAV MERGE
    Merge,
}

impl Method {
    /// Every supported method, in table order.
    pub const ALL: [Self; 18] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Connect,
        Self::Options,
        Self::Trace,
        Self::Copy,
        Self::Lock,
        Self::Mkcol,
        Self::Move,
        Self::Propfind,
        Self::Proppatch,
        Self::Unlock,
        Self::Report,
        Self::Mkactivity,
        Self::Checkout,
        Self::Merge,
    ];

    /// Parses a method from a string.
    ///
    /// Method tokens are case-sensitive: only the uppercase names parse.
    /// Returns `None` for anything outside the supported set, `PATCH`
    /// included. `HEAD` maps onto `GET`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" | "HEAD" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "CONNECT" => Some(Self::Connect),
            "OPTIONS" => Some(Self::Options),
            "TRACE" => Some(Self::Trace),
            "COPY" => Some(Self::Copy),
            "LOCK" => Some(Self::Lock),
            "MKCOL" => Some(Self::Mkcol),
            "MOVE" => Some(Self::Move),
            "PROPFIND" => Some(Self::Propfind),
            "PROPPATCH" => Some(Self::Proppatch),
            "UNLOCK" => Some(Self::Unlock),
            "REPORT" => Some(Self::Report),
            "MKACTIVITY" => Some(Self::Mkactivity),
            "CHECKOUT" => Some(Self::Checkout),
            "MERGE" => Some(Self::Merge),
            _ => None,
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Connect => "CONNECT",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Copy => "COPY",
            Self::Lock => "LOCK",
            Self::Mkcol => "MKCOL",
            Self::Move => "MOVE",
            Self::Propfind => "PROPFIND",
            Self::Proppatch => "PROPPATCH",
            Self::Unlock => "UNLOCK",
            Self::Report => "REPORT",
            Self::Mkactivity => "MKACTIVITY",
            Self::Checkout => "CHECKOUT",
            Self::Merge => "MERGE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the router needs to know about the incoming request.
pub trait RequestInfo {
    /// The raw request method, e.g. `"GET"`.
    fn method(&self) -> &str;

    /// Path of the executing entry script as reported by the server,
    /// e.g. `"/blog/index.php"`.
    fn script_path(&self) -> &str;

    /// The raw request target, including any query string.
    fn request_uri(&self) -> Option<&str>;
}

/// A plain request description.
#[derive(Debug, Clone)]
pub struct Request {
    /// Raw method string.
    pub method: String,
    /// Script path reported by the server.
    pub script_path: String,
    /// Raw request target.
    pub uri: Option<String>,
}

impl Request {
    /// Creates a request for `uri` served by `/index.php` at the web root.
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            script_path: DEFAULT_SCRIPT_NAME.to_string(),
            uri: Some(uri.into()),
        }
    }

    /// Creates a GET request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new("GET", uri)
    }

    /// Creates a POST request.
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new("POST", uri)
    }

    /// Sets the script path.
    #[must_use]
    pub fn script(mut self, path: impl Into<String>) -> Self {
        self.script_path = path.into();
        self
    }

    /// Drops the request target, as happens when running outside a server.
    #[must_use]
    pub fn without_uri(mut self) -> Self {
        self.uri = None;
        self
    }
}

impl RequestInfo for Request {
    fn method(&self) -> &str {
        &self.method
    }

    fn script_path(&self) -> &str {
        &self.script_path
    }

    fn request_uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

/// Values derived once from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Uppercased request method.
    pub method: String,
    /// Served path relative to the application root, query string included,
    /// case preserved.
    pub url: String,
    /// Lowercased path used for route lookup.
    pub query: String,
}

impl RequestContext {
    /// Derives the context for `request`, stripping `script_name` from the
    /// script path to find the application root.
    pub fn derive(request: &impl RequestInfo, script_name: &str) -> Self {
        let mut url = request.script_path().replace(script_name, "");

        if let Some(uri) = request.request_uri() {
            url = if url.is_empty() {
                uri.to_string()
            } else {
                uri.replace(&url, "")
            };
        }

        let path = url.split('?').next().unwrap_or_default();
        let path = if path == "/" {
            path
        } else {
            path.trim_end_matches('/')
        };
        let query = path.to_ascii_lowercase();

        trace!(url = %url, query = %query, "derived request context");

        Self {
            method: request.method().to_uppercase(),
            url,
            query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!(Method::from_str("GET"), Some(Method::Get));
        assert_eq!(Method::from_str("POST"), Some(Method::Post));
        assert_eq!(Method::from_str("post"), None);
        assert_eq!(Method::from_str("Get"), None);
        assert_eq!(Method::from_str("PROPFIND"), Some(Method::Propfind));
        assert_eq!(Method::from_str("HEAD"), Some(Method::Get));
        assert_eq!(Method::from_str("PATCH"), None);
        assert_eq!(Method::from_str("INVALID"), None);
    }

    #[test]
    fn test_method_round_trips_through_str() {
        for method in Method::ALL {
            assert_eq!(Method::from_str(method.as_str()), Some(method));
        }
    }

    #[test]
    fn test_context_at_web_root() {
        let ctx = RequestContext::derive(&Request::get("/Users/42/"), DEFAULT_SCRIPT_NAME);
        assert_eq!(ctx.method, "GET");
        assert_eq!(ctx.url, "/Users/42/");
        assert_eq!(ctx.query, "/users/42");
    }

    #[test]
    fn test_context_strips_query_string() {
        let ctx = RequestContext::derive(&Request::get("/search/?q=Rust"), DEFAULT_SCRIPT_NAME);
        assert_eq!(ctx.url, "/search/?q=Rust");
        assert_eq!(ctx.query, "/search");
    }

    #[test]
    fn test_context_keeps_root() {
        let ctx = RequestContext::derive(&Request::get("/"), DEFAULT_SCRIPT_NAME);
        assert_eq!(ctx.query, "/");

        let ctx = RequestContext::derive(&Request::get("/?page=2"), DEFAULT_SCRIPT_NAME);
        assert_eq!(ctx.query, "/");
    }

    #[test]
    fn test_context_in_subdirectory() {
        let request = Request::get("/blog/posts/Hello").script("/blog/index.php");
        let ctx = RequestContext::derive(&request, DEFAULT_SCRIPT_NAME);
        assert_eq!(ctx.url, "/posts/Hello");
        assert_eq!(ctx.query, "/posts/hello");
    }

    #[test]
    fn test_context_without_request_uri() {
        let request = Request::new("get", "/ignored")
            .script("/app/index.php")
            .without_uri();
        let ctx = RequestContext::derive(&request, DEFAULT_SCRIPT_NAME);
        assert_eq!(ctx.method, "GET");
        assert_eq!(ctx.url, "/app");
        assert_eq!(ctx.query, "/app");
    }

    #[test]
    fn test_query_lowercases_ascii_only() {
        let ctx = RequestContext::derive(&Request::get("/Café/ÉTÉ"), DEFAULT_SCRIPT_NAME);
        assert_eq!(ctx.url, "/Café/ÉTÉ");
        assert_eq!(ctx.query, "/café/ÉtÉ");
    }

    #[test]
    fn test_custom_script_name() {
        let request = Request::get("/shop/cart").script("/shop/app.php");
        let ctx = RequestContext::derive(&request, "/app.php");
        assert_eq!(ctx.query, "/cart");
    }
}
