//! End-to-end routing and dispatch behaviour.

mod common;

use common::dispatch;
use orbital_router::{
    create_uri, create_url, DispatchError, Method, Request, RequestDispatcher, Response,
    RouteOptions, RouteTable, Rule,
};

#[test]
fn test_param_route_reaches_handler() {
    let table = RouteTable::new().get("/users/(:id)", "show_user");

    let outcome = dispatch(&table, "GET", "/users/42");

    assert_eq!(outcome.result.unwrap(), "show_user ok");
    assert_eq!(outcome.recorder.handlers(), vec!["show_user"]);
    assert_eq!(outcome.recorder.calls[0].params(), vec!["42"]);
}

#[test]
fn test_second_registration_wins() {
    let table = RouteTable::new()
        .get("/users/(:id)", "old_handler")
        .get("/users/(:id)", "new_handler");

    assert_eq!(table.len(), 1);
    let outcome = dispatch(&table, "GET", "/users/7");
    assert_eq!(outcome.recorder.handlers(), vec!["new_handler"]);
}

#[test]
fn test_unsupported_method_goes_to_404() {
    let table = RouteTable::new()
        .route(Method::ALL, "/(:anything)", "catch_all")
        .error(404, "not_found");

    let outcome = dispatch(&table, "PATCH", "/users");

    assert_eq!(outcome.result.unwrap(), "not_found ok");
    assert_eq!(outcome.response.status, 404);

    let mut dispatcher = RequestDispatcher::new(&table, Request::new("PATCH", "/users"));
    assert!(dispatcher.active_route().is_none());
}

#[test]
fn test_params_are_positional() {
    let table = RouteTable::new().get("/a/(:x)/(:y)", "pair");

    let outcome = dispatch(&table, "GET", "/a/foo/bar");
    assert_eq!(outcome.recorder.calls[0].params(), vec!["foo", "bar"]);

    let outcome = dispatch(&table, "GET", "/a/foo");
    assert!(outcome.recorder.calls.is_empty());
    assert!(matches!(
        outcome.result,
        Err(DispatchError::Terminated { code: 404 })
    ));
}

#[test]
fn test_registration_order_breaks_ties() {
    let table = RouteTable::new()
        .get("/item/(:id)", "show_item")
        .get("/item/new", "new_item");

    let outcome = dispatch(&table, "GET", "/item/new");

    assert_eq!(outcome.recorder.handlers(), vec!["show_item"]);
    assert_eq!(outcome.recorder.calls[0].params(), vec!["new"]);
}

#[test]
fn test_missing_404_handler_terminates() {
    let table = RouteTable::new().get("/", "home");

    let outcome = dispatch(&table, "GET", "/nowhere");

    let err = outcome.result.unwrap_err();
    assert!(err.to_string().contains("404"));
    assert!(err.handler_error().is_none());
    assert!(outcome.recorder.calls.is_empty());
}

#[test]
fn test_failing_404_handler_propagates() {
    let table = RouteTable::new().get("/", "home").error(404, "fail_not_found");

    let outcome = dispatch(&table, "GET", "/nowhere");

    let err = outcome.result.unwrap_err();
    assert_eq!(err.to_string(), "fail_not_found failed");
    assert!(err.handler_error().is_some());
    assert_eq!(outcome.recorder.handlers(), vec!["fail_not_found"]);
}

#[test]
fn test_failing_404_handler_recovers_through_500() {
    let table = RouteTable::new()
        .error(404, "fail_not_found")
        .error(500, "server_error");

    let outcome = dispatch(&table, "GET", "/nowhere");

    assert_eq!(outcome.result.unwrap(), "server_error ok");
    assert_eq!(
        outcome.recorder.handlers(),
        vec!["fail_not_found", "server_error"]
    );
    let cause = outcome.recorder.calls[1].failure().unwrap();
    assert_eq!(cause.to_string(), "fail_not_found failed");
    assert_eq!(outcome.response.status, 500);
}

#[test]
fn test_failing_500_handler_runs_once() {
    let table = RouteTable::new()
        .get("/report", "fail_report")
        .error(500, "fail_server_error");

    let outcome = dispatch(&table, "GET", "/report");

    let err = outcome.result.unwrap_err();
    assert_eq!(err.to_string(), "fail_server_error failed");
    assert_eq!(
        outcome.recorder.handlers(),
        vec!["fail_report", "fail_server_error"]
    );
}

#[test]
fn test_handler_failure_without_500_route_returns_cause() {
    let table = RouteTable::new().get("/report", "fail_report");

    let outcome = dispatch(&table, "GET", "/report");

    let err = outcome.result.unwrap_err();
    assert_eq!(err.to_string(), "fail_report failed");
}

#[test]
fn test_error_route_becomes_active() {
    let table = RouteTable::new()
        .get("/broken", "fail_page")
        .error(500, "server_error");
    let mut recorder = common::Recorder::default();
    let mut dispatcher = RequestDispatcher::new(&table, Request::get("/broken"));

    assert_eq!(
        dispatcher.active_route().unwrap().rule,
        Rule::Path("/broken".into())
    );
    dispatcher
        .dispatch(&mut recorder, &mut Response::default())
        .unwrap();

    let active = dispatcher.active_route().unwrap();
    assert_eq!(active.rule, Rule::Error(500));
    assert_eq!(active.method, "GET");
    assert_eq!(active.handler, "server_error");
}

#[test]
fn test_route_options_shape_response() {
    let table = RouteTable::new().route_with(
        Method::Get,
        "/feed",
        "feed",
        RouteOptions::new().content_type("application/rss+xml"),
    );

    let outcome = dispatch(&table, "GET", "/Feed/?page=2");

    assert_eq!(outcome.result.unwrap(), "feed ok");
    assert_eq!(outcome.response.status, 200);
    assert_eq!(
        outcome.response.get_content_type(),
        Some("application/rss+xml")
    );
    assert!(outcome.response.headers_sent());
}

#[test]
fn test_subdirectory_install() {
    let table = RouteTable::new().get("/posts/(:slug)", "post");
    let mut recorder = common::Recorder::default();

    let request = Request::get("/blog/posts/hello-world").script("/blog/index.php");
    let out = RequestDispatcher::new(&table, request)
        .dispatch(&mut recorder, &mut Response::default())
        .unwrap();

    assert_eq!(out, "post ok");
    assert_eq!(recorder.calls[0].params(), vec!["hello-world"]);
}

#[test]
fn test_table_is_shared_across_requests() {
    let table = std::sync::Arc::new(
        RouteTable::new()
            .get("/users/(:id)", "show_user")
            .error(404, "not_found"),
    );

    let handles: Vec<_> = ["/users/1", "/missing", "/users/2"]
        .into_iter()
        .map(|uri| {
            let table = std::sync::Arc::clone(&table);
            std::thread::spawn(move || dispatch(&table, "GET", uri).result.unwrap())
        })
        .collect();

    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outputs, vec!["show_user ok", "not_found ok", "show_user ok"]);
}

#[test]
fn test_slug_and_url_helpers() {
    assert_eq!(create_uri("Café São-Paulo"), "cafe-sao-paulo");
    assert_eq!(
        create_url("http://example.com/", "path", Some("q=1")),
        "http://example.com/path/?q=1"
    );
}
