#![allow(dead_code)]

use orbital_router::{Argument, DispatchError, HandlerError, Invoker, Request, RequestDispatcher, Response, RouteTable};

/// Invokes handlers by name and records every call. Handlers whose name
/// starts with `fail` return an error.
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub handler: String,
    pub args: Vec<Argument>,
}

impl Call {
    pub fn params(&self) -> Vec<&str> {
        self.args.iter().filter_map(Argument::as_str).collect()
    }

    pub fn failure(&self) -> Option<&HandlerError> {
        self.args.first().and_then(Argument::failure)
    }
}

impl Invoker<&'static str> for Recorder {
    type Output = String;

    fn invoke(&mut self, handler: &&'static str, args: &[Argument]) -> Result<String, HandlerError> {
        self.calls.push(Call {
            handler: (*handler).to_string(),
            args: args.to_vec(),
        });
        if handler.starts_with("fail") {
            return Err(HandlerError::msg(format!("{handler} failed")));
        }
        Ok(format!("{handler} ok"))
    }
}

impl Recorder {
    pub fn handlers(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.handler.as_str()).collect()
    }
}

/// Outcome of one dispatched request.
pub struct Outcome {
    pub result: Result<String, DispatchError>,
    pub recorder: Recorder,
    pub response: Response,
}

pub fn dispatch(table: &RouteTable<&'static str>, method: &str, uri: &str) -> Outcome {
    let mut recorder = Recorder::default();
    let mut response = Response::default();
    let result = RequestDispatcher::new(table, Request::new(method, uri))
        .dispatch(&mut recorder, &mut response);
    Outcome {
        result,
        recorder,
        response,
    }
}
