use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use serde_json::{json, Value};

use graphql_view::graphql::{build_schema, demo_registry};
use graphql_view::metrics::{REQUESTS, OUTCOME_SERVER_ERROR};
use graphql_view::{view, ExecutionContext, ExecutionResult, Executor, GraphQLView, RequestContext, ViewError};

const BOUNDARY: &str = "----graphqlviewtest";

macro_rules! app {
    ($graphiql:expr) => {{
        let gql_view = GraphQLView::new(build_schema(demo_registry().unwrap())).graphiql($graphiql);
        test::init_service(App::new().configure(view::configure(gql_view, "/graphql", 1024 * 1024))).await
    }};
}

// Builds a multipart/form-data body from text fields and (field, filename, content) files
fn multipart(fields: &[(&str, &str)], files: &[(&str, &str, &str)]) -> (String, String) {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    for (name, filename, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

const READ_FILE: &str =
    r#"{"query": "mutation($file: Upload!) { readFile(file: $file) { filename contentType size } }", "variables": {"file": null}}"#;

#[actix_web::test]
async fn post_executes_query() {
    let app = app!(true);
    let req = test::TestRequest::post()
        .uri("/graphql")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(r#"{"query": "{ __typename }"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"data": {"__typename": "QueryRoot"}}));
}

#[actix_web::test]
async fn post_passes_variables_and_operation_name() {
    let app = app!(false);
    let req = test::TestRequest::post()
        .uri("/graphql")
        .set_json(json!({
            "query": "query A($n: String) { hello(name: $n) } query B { hello }",
            "variables": {"n": "Ada"},
            "operationName": "A"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"data": {"hello": "Hello, Ada!"}}));
}

#[actix_web::test]
async fn execution_errors_are_reported_in_body() {
    let app = app!(false);
    let req = test::TestRequest::post()
        .uri("/graphql")
        .set_json(json!({"query": "{ doesNotExist }"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"], Value::Null);
    assert!(body["errors"][0]["message"].as_str().unwrap().contains("doesNotExist"));
}

#[actix_web::test]
async fn resolvers_see_request_headers() {
    let app = app!(false);
    let req = test::TestRequest::post()
        .uri("/graphql")
        .insert_header(("X-Token", "t0k3n"))
        .set_json(json!({"query": r#"{ header(name: "x-token") }"#}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"data": {"header": "t0k3n"}}));
}

#[actix_web::test]
async fn malformed_json_is_rejected() {
    let app = app!(true);
    let req = test::TestRequest::post()
        .uri("/graphql")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"query\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(test::read_body(resp).await, "Unable to parse request body as JSON");
}

#[actix_web::test]
async fn missing_query_is_rejected() {
    let app = app!(true);
    let req = test::TestRequest::post()
        .uri("/graphql")
        .set_json(json!({"variables": {}}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(test::read_body(resp).await, "No GraphQL query found in the request");
}

#[actix_web::test]
async fn get_without_graphiql_is_not_found() {
    let app = app!(false);
    let req = test::TestRequest::get()
        .uri("/graphql")
        .insert_header((header::ACCEPT, "text/html"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn get_renders_graphiql_for_html_clients() {
    let app = app!(true);
    for accept in ["text/html,application/xhtml+xml", "*/*"] {
        let req = test::TestRequest::get()
            .uri("/graphql")
            .insert_header((header::ACCEPT, accept))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("/graphql"));
    }
}

#[actix_web::test]
async fn get_with_query_string_executes() {
    let app = app!(true);
    let req = test::TestRequest::get()
        .uri("/graphql?query=%7B%20hello%20%7D")
        .insert_header((header::ACCEPT, "application/json"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"data": {"hello": "Hello, world!"}}));
}

#[actix_web::test]
async fn get_refuses_mutations() {
    let app = app!(true);
    for uri in [
        "/graphql?query=mutation%20%7B%20__typename%20%7D",
        "/graphql?query=mutation%20M%20%7B%20__typename%20%7D",
        "/graphql?query=query%20A%20%7B%20hello%20%7D%20mutation%20B%20%7B%20__typename%20%7D&operationName=B",
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header((header::ACCEPT, "application/json"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
    }

    // The same document may still select its query
    let req = test::TestRequest::get()
        .uri("/graphql?query=query%20A%20%7B%20hello%20%7D%20mutation%20B%20%7B%20__typename%20%7D&operationName=A")
        .insert_header((header::ACCEPT, "application/json"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"data": {"hello": "Hello, world!"}}));
}

#[actix_web::test]
async fn post_still_runs_mutations() {
    let app = app!(true);
    let req = test::TestRequest::post()
        .uri("/graphql")
        .set_json(json!({"query": "mutation { __typename }"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"data": {"__typename": "MutationRoot"}}));
}

// Engine that fails before producing any result
struct BrokenExecutor;

#[async_trait::async_trait]
impl Executor for BrokenExecutor {
    async fn execute(&self, _operation: ExecutionContext, _context: RequestContext) -> Result<ExecutionResult, ViewError> {
        Err(ViewError::internal("boom"))
    }
}

#[actix_web::test]
async fn engine_failure_is_a_server_error() {
    let gql_view = GraphQLView::new(BrokenExecutor).graphiql(false);
    let app = test::init_service(App::new().configure(view::configure(gql_view, "/graphql", 1024))).await;
    let before = REQUESTS.with_label_values(&[OUTCOME_SERVER_ERROR]).get();

    let req = test::TestRequest::post()
        .uri("/graphql")
        .set_json(json!({"query": "{ hello }"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(test::read_body(resp).await, "boom");
    assert!(REQUESTS.with_label_values(&[OUTCOME_SERVER_ERROR]).get() > before);
}

#[actix_web::test]
async fn other_methods_are_not_allowed() {
    let app = app!(true);
    let req = test::TestRequest::put()
        .uri("/graphql")
        .set_json(json!({"query": "{ hello }"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn multipart_upload_reaches_resolver() {
    let app = app!(true);
    let (content_type, body) = multipart(
        &[("operations", READ_FILE), ("map", r#"{"0": ["variables.file"]}"#)],
        &[("0", "hello.txt", "hello world")],
    );
    let req = test::TestRequest::post()
        .uri("/graphql")
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!({"data": {"readFile": {"filename": "hello.txt", "contentType": "text/plain", "size": 11}}})
    );
}

#[actix_web::test]
async fn multipart_with_missing_file_is_rejected() {
    let app = app!(true);
    let (content_type, body) = multipart(
        &[("operations", READ_FILE), ("map", r#"{"0": ["variables.file"]}"#)],
        &[],
    );
    let req = test::TestRequest::post()
        .uri("/graphql")
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(test::read_body(resp).await, "File(s) missing in form data");
}

#[actix_web::test]
async fn multipart_with_malformed_operations_is_rejected() {
    let app = app!(true);
    let (content_type, body) = multipart(&[("operations", "{not json")], &[]);
    let req = test::TestRequest::post()
        .uri("/graphql")
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(test::read_body(resp).await, "Unable to parse request body as JSON");
}
