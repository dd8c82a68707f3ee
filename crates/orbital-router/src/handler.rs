//! Handler arguments and the invoker seam.

use std::sync::Arc;

use crate::error::HandlerError;

/// A single positional argument passed to a handler.
#[derive(Debug, Clone)]
pub enum Argument {
    /// A path segment captured by a rule placeholder.
    Segment(String),
    /// The failure that sent the request to an error route. `None` when
    /// the error route was reached without a handler failure, e.g. a 404.
    Failure(Option<HandlerError>),
}

impl Argument {
    /// Returns the captured segment, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Segment(s) => Some(s),
            Self::Failure(_) => None,
        }
    }

    /// Returns the carried failure, if any.
    pub fn failure(&self) -> Option<&HandlerError> {
        match self {
            Self::Failure(e) => e.as_ref(),
            Self::Segment(_) => None,
        }
    }
}

/// Runs the handler referenced by a route.
///
/// The router never calls handlers itself; it hands the opaque handler
/// reference and the ordered arguments to an invoker. Any error returned
/// here is routed to the 500 error route.
///
/// # Example
///
/// ```
/// use orbital_router::{Argument, HandlerError, Invoker};
///
/// struct Echo;
///
/// impl Invoker<&'static str> for Echo {
///     type Output = String;
///
///     fn invoke(&mut self, handler: &&'static str, args: &[Argument]) -> Result<String, HandlerError> {
///         let args: Vec<_> = args.iter().filter_map(Argument::as_str).collect();
///         Ok(format!("{handler}({})", args.join(", ")))
///     }
/// }
/// ```
pub trait Invoker<H> {
    /// What a successful handler produces.
    type Output;

    /// Executes `handler` with `args`.
    fn invoke(&mut self, handler: &H, args: &[Argument]) -> Result<Self::Output, HandlerError>;
}

/// A handler closure producing `O`.
pub type Handler<O> = Arc<dyn Fn(&[Argument]) -> Result<O, HandlerError> + Send + Sync>;

/// Boxes a closure into a [`Handler`].
pub fn handler<O, F>(f: F) -> Handler<O>
where
    F: Fn(&[Argument]) -> Result<O, HandlerError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Invoker for [`Handler`] closures: calls them directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectInvoker;

impl<O> Invoker<Handler<O>> for DirectInvoker {
    type Output = O;

    fn invoke(&mut self, handler: &Handler<O>, args: &[Argument]) -> Result<O, HandlerError> {
        handler(args)
    }
}
