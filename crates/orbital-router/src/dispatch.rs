//! Per-request dispatch.
//!
//! A [`RequestDispatcher`] is created for every incoming request. It borrows
//! the shared, read-only [`RouteTable`] and owns everything that belongs to
//! the request: the derived [`RequestContext`] and the resolved
//! [`ActiveRoute`]. Nothing mutable is shared between requests.
//!
//! Dispatch runs as a small state machine:
//!
//! ```text
//! Dispatching(route) --ok--> done
//!        |
//!      failure
//!        v
//! Failed { code, cause, last } --recover--> Dispatching(error route)
//!        |
//!     refused
//!        v
//!   DispatchError
//! ```
//!
//! Recovery is refused when the route that just failed is already the error
//! route for the same code, so an error handler that keeps failing runs at
//! most once per code.

use std::cell::OnceCell;

use tracing::{debug, warn};

use crate::error::{DispatchError, HandlerError};
use crate::handler::Invoker;
use crate::recovery::{INTERNAL_ERROR, NOT_FOUND};
use crate::request::{DEFAULT_SCRIPT_NAME, RequestContext, RequestInfo};
use crate::response::ResponseHeaders;
use crate::router::{ActiveRoute, RouteTable};
use crate::url::UrlBuilder;

/// Where a dispatch currently stands.
enum State<H> {
    /// About to run a route's handler.
    Dispatching(ActiveRoute<H>),
    /// The previous step failed with `code`.
    Failed {
        code: u16,
        cause: Option<HandlerError>,
        last: Option<ActiveRoute<H>>,
    },
}

/// Routes and dispatches a single request.
///
/// # Example
///
/// ```
/// use orbital_router::{handler, Argument, DirectInvoker, Request, RequestDispatcher, Response, RouteTable};
///
/// let table = RouteTable::new()
///     .get("/hello/(:name)", handler(|args: &[Argument]| {
///         Ok(format!("Hello, {}!", args[0].as_str().unwrap_or("nobody")))
///     }));
///
/// let mut response = Response::default();
/// let mut dispatcher = RequestDispatcher::new(&table, Request::get("/hello/ferris"));
/// let body = dispatcher.dispatch(&mut DirectInvoker, &mut response).unwrap();
/// assert_eq!(body, "Hello, ferris!");
/// ```
pub struct RequestDispatcher<'t, H, R> {
    table: &'t RouteTable<H>,
    request: R,
    script_name: String,
    context: OnceCell<RequestContext>,
    active: Option<Option<ActiveRoute<H>>>,
}

impl<'t, H, R> RequestDispatcher<'t, H, R>
where
    H: Clone,
    R: RequestInfo,
{
    /// Creates a dispatcher for `request` against `table`.
    pub fn new(table: &'t RouteTable<H>, request: R) -> Self {
        Self {
            table,
            request,
            script_name: DEFAULT_SCRIPT_NAME.to_string(),
            context: OnceCell::new(),
            active: None,
        }
    }

    /// Sets the entry script name stripped from the script path.
    #[must_use]
    pub fn script_name(mut self, script_name: impl Into<String>) -> Self {
        self.script_name = script_name.into();
        self.context = OnceCell::new();
        self
    }

    /// Returns the request.
    pub fn request(&self) -> &R {
        &self.request
    }

    /// Returns the derived request context, computing it on first use.
    pub fn context(&self) -> &RequestContext {
        self.context
            .get_or_init(|| RequestContext::derive(&self.request, &self.script_name))
    }

    /// The served path, query string included, case preserved.
    pub fn active_url(&self) -> &str {
        &self.context().url
    }

    /// The lowercased path used for route lookup.
    pub fn active_query(&self) -> &str {
        &self.context().query
    }

    /// Resolves the active route, looking it up on first use.
    ///
    /// After an error recovery this returns the error route being served.
    pub fn active_route(&mut self) -> Option<&ActiveRoute<H>> {
        if self.active.is_none() {
            let context = self.context();
            let route = self.table.lookup(&context.query, &context.method);
            self.active = Some(route);
        }

        self.active.as_ref().and_then(Option::as_ref)
    }

    /// Dispatches the request to its route.
    ///
    /// A request without a route goes to the 404 error route; a failing
    /// handler goes to the 500 error route with the failure as its only
    /// argument.
    pub fn dispatch<I, S>(
        &mut self,
        invoker: &mut I,
        headers: &mut S,
    ) -> Result<I::Output, DispatchError>
    where
        I: Invoker<H>,
        S: ResponseHeaders,
    {
        let state = match self.active_route() {
            Some(route) => State::Dispatching(route.clone()),
            None => {
                debug!(query = %self.active_query(), "no route for request");
                State::Failed {
                    code: NOT_FOUND,
                    cause: None,
                    last: None,
                }
            }
        };

        self.run(state, invoker, headers)
    }

    /// Forces the request onto the error route for `code`.
    pub fn dispatch_error<I, S>(
        &mut self,
        code: u16,
        cause: Option<HandlerError>,
        invoker: &mut I,
        headers: &mut S,
    ) -> Result<I::Output, DispatchError>
    where
        I: Invoker<H>,
        S: ResponseHeaders,
    {
        let state = State::Failed {
            code,
            cause,
            last: None,
        };
        self.run(state, invoker, headers)
    }

    /// Builds the URL of the current request. `use_query` selects the
    /// lowercased lookup path instead of the raw served URL.
    pub fn current_url(&self, urls: &UrlBuilder, use_query: bool) -> String {
        let location = if use_query {
            self.active_query()
        } else {
            self.active_url()
        };
        urls.url(location, None, true)
    }

    fn run<I, S>(
        &mut self,
        mut state: State<H>,
        invoker: &mut I,
        headers: &mut S,
    ) -> Result<I::Output, DispatchError>
    where
        I: Invoker<H>,
        S: ResponseHeaders,
    {
        loop {
            state = match state {
                State::Dispatching(route) => {
                    if let Some(content_type) = &route.options.content_type {
                        headers.content_type(content_type);
                    }
                    if let Some(status) = route.options.status {
                        headers.status(status);
                    }
                    headers.send();

                    debug!(method = %route.method, rule = %route.rule, "invoking handler");
                    match invoker.invoke(&route.handler, &route.arguments) {
                        Ok(output) => return Ok(output),
                        Err(cause) => {
                            warn!(rule = %route.rule, error = %cause, "handler failed");
                            State::Failed {
                                code: INTERNAL_ERROR,
                                cause: Some(cause),
                                last: Some(route),
                            }
                        }
                    }
                }
                State::Failed { code, cause, last } => {
                    let method = self.context().method.clone();
                    let route = self
                        .table
                        .error_routes()
                        .recover(code, cause, last.as_ref(), &method)?;
                    self.active = Some(Some(route.clone()));
                    State::Dispatching(route)
                }
            };
        }
    }
}
