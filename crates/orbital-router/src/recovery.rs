//! Error routes and recovery from failed dispatches.

use std::collections::BTreeMap;

use tracing::{debug, error, warn};

use crate::error::{DispatchError, HandlerError};
use crate::handler::Argument;
use crate::router::{ActiveRoute, Rule, RouteOptions};

/// Status used when no route matches the request.
pub const NOT_FOUND: u16 = 404;

/// Status used when a handler fails.
pub const INTERNAL_ERROR: u16 = 500;

/// Fallback handlers keyed by error code.
#[derive(Debug, Clone)]
pub struct ErrorRoutes<H> {
    handlers: BTreeMap<u16, H>,
}

impl<H> Default for ErrorRoutes<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ErrorRoutes<H> {
    /// Creates an empty set of error routes.
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Registers the handler for `code`, replacing any previous one.
    pub fn insert(&mut self, code: u16, handler: H) {
        debug!(code, "error route registered");
        self.handlers.insert(code, handler);
    }

    /// Returns the handler for `code`.
    pub fn get(&self, code: u16) -> Option<&H> {
        self.handlers.get(&code)
    }

    /// Iterates over registered codes and handlers, lowest code first.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &H)> {
        self.handlers.iter().map(|(code, h)| (*code, h))
    }

    /// Number of registered error routes.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no error route is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<H: Clone> ErrorRoutes<H> {
    /// Builds the error route that takes over after a failure with `code`.
    ///
    /// `last` is the route whose dispatch just failed, if any. Recovery is
    /// refused when no handler exists for `code`, or when `last` is already
    /// the error route for `code`: an error handler failing with its own
    /// code is not retried. A refused recovery hands back `cause` when
    /// there is one, and a terminal error otherwise.
    pub fn recover(
        &self,
        code: u16,
        cause: Option<HandlerError>,
        last: Option<&ActiveRoute<H>>,
        request_method: &str,
    ) -> Result<ActiveRoute<H>, DispatchError> {
        let handler = match self.get(code) {
            Some(handler) if !last.is_some_and(|route| route.is_error_route(code)) => handler,
            _ => {
                return Err(match cause {
                    Some(cause) => {
                        warn!(code, error = %cause, "no recovery, propagating handler error");
                        DispatchError::Handler(cause)
                    }
                    None => {
                        error!(code, "no recovery, terminating request");
                        DispatchError::Terminated { code }
                    }
                });
            }
        };

        let method = last.map_or_else(|| request_method.to_uppercase(), |r| r.method.clone());
        debug!(code, %method, "dispatching error route");

        Ok(ActiveRoute {
            method,
            rule: Rule::Error(code),
            handler: handler.clone(),
            arguments: vec![Argument::Failure(cause)],
            options: RouteOptions::new().status(code),
        })
    }
}
