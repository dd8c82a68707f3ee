//! # orbital-router
//!
//! Ordered, rule-based request routing with error-route recovery.
//!
//! This crate provides:
//! - Rule patterns with positional `(:name)` parameters
//! - Per-method route tables with first-match-wins lookup
//! - Error routes (404, 500, ...) with cycle protection
//! - A per-request dispatcher that owns all request state
//! - URL and slug helpers
//! - Session data and scoped view data helpers
//!
//! ## Quick Start
//!
//! ```
//! use orbital_router::{handler, Argument, DirectInvoker, Request, RequestDispatcher, Response, RouteTable};
//!
//! let table = RouteTable::new()
//!     .get("/", handler(|_: &[Argument]| Ok("Hello, World!".to_string())))
//!     .get("/users/(:id)", handler(|args: &[Argument]| {
//!         Ok(format!("User: {}", args[0].as_str().unwrap_or("unknown")))
//!     }))
//!     .error(404, handler(|_: &[Argument]| Ok("Not Found".to_string())));
//!
//! let mut response = Response::default();
//! let body = RequestDispatcher::new(&table, Request::get("/users/123"))
//!     .dispatch(&mut DirectInvoker, &mut response)
//!     .unwrap();
//! assert_eq!(body, "User: 123");
//! ```
//!
//! ## Rules
//!
//! Rules are `/`-separated paths. A `(:name)` placeholder captures one or
//! more of `[a-z0-9-_]`, case-insensitively:
//!
//! ```ignore
//! table.get("/posts/(:post)/comments/(:comment)", handler)
//! ```
//!
//! Parameters are positional: the handler receives them in the order the
//! placeholders appear, the names are documentation only.
//!
//! ## Ordering
//!
//! Routes are tried in registration order and the first match wins.
//! Register `/item/new` before `/item/(:id)` if both should be reachable.
//!
//! ## Error routes
//!
//! ```ignore
//! let table = RouteTable::new()
//!     .get("/", home)
//!     .error(404, not_found)
//!     .error(500, server_error);
//! ```
//!
//! Unmatched requests go to the 404 route. A failing handler goes to the
//! 500 route, which receives the failure as its only argument. If the 500
//! route fails too, the failure is returned to the caller instead of
//! looping.
//!
//! ## Sharing
//!
//! Build the [`RouteTable`] once at startup and share it (by reference or
//! `Arc`). Create a [`RequestDispatcher`] per request.

mod config;
mod dispatch;
mod error;
mod handler;
mod path;
mod recovery;
mod request;
mod response;
mod router;
mod session;
mod url;
mod view;

pub use config::{MethodNames, RouteEntry, RouteManifest, RouterConfig};
pub use dispatch::RequestDispatcher;
pub use error::{DispatchError, HandlerError, Result, RouterError};
pub use handler::{handler, Argument, DirectInvoker, Handler, Invoker};
pub use path::RulePattern;
pub use recovery::{ErrorRoutes, INTERNAL_ERROR, NOT_FOUND};
pub use request::{Method, Request, RequestContext, RequestInfo, DEFAULT_SCRIPT_NAME};
pub use response::{Response, ResponseHeaders};
pub use router::{ActiveRoute, Methods, Route, RouteOptions, RouteTable, Rule};
pub use session::{MemoryStore, Session, SessionStore};
pub use url::{create_uri, create_url, UrlBuilder};
pub use view::{Renderer, ViewError, ViewStack};
