// GraphQL view: binds the schema engine to the actix-web request lifecycle
pub mod routes;

pub use routes::{configure, graphql_handler};

use std::sync::Arc;
use std::time::Instant;

use actix_web::http::Method;
use actix_web::HttpResponse;
use async_graphql::parser::types::OperationType;
use bytes::Bytes;
use log::{debug, warn};
use serde_json::Value;

use crate::error::ViewError;
use crate::executor::{ExecutionContext, Executor};
use crate::file_uploads::{self, FilesMap};
use crate::graphiql::render_graphiql_page;
use crate::http::{
    parse_query_params, parse_request_data, process_result, selected_operation_type, RequestContext, RequestHead,
    MISSING_FILES, UNPARSEABLE_BODY,
};
use crate::metrics::{EXECUTION_TIME, FILES_UPLOADED};

// Handles GraphQL over HTTP: serves GraphiQL on GET and executes operations otherwise
pub struct GraphQLView<E> {
    executor: Arc<E>, // Schema engine the operations are delegated to
    graphiql: bool, // Whether GET may render the GraphiQL page
    endpoint: String, // Path the GraphiQL page sends its queries to
}

impl<E> Clone for GraphQLView<E> {
    fn clone(&self) -> Self {
        GraphQLView {
            executor: Arc::clone(&self.executor),
            graphiql: self.graphiql,
            endpoint: self.endpoint.clone(),
        }
    }
}

impl<E: Executor> GraphQLView<E> {
    pub fn new(executor: E) -> Self {
        GraphQLView {
            executor: Arc::new(executor),
            graphiql: true,
            endpoint: "/graphql".to_string(),
        }
    }

    pub fn graphiql(mut self, enabled: bool) -> Self {
        self.graphiql = enabled;
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn graphiql_enabled(&self) -> bool {
        self.graphiql
    }

    // Runs one request through the view
    pub async fn dispatch<R: RequestHead + ?Sized>(&self, request: &R, body: Bytes) -> Result<HttpResponse, ViewError> {
        // Only GET and POST carry GraphQL
        let method = request.method();
        if method != Method::GET && method != Method::POST {
            return Err(ViewError::MethodNotAllowed);
        }
        // Without GraphiQL the view does not answer GET
        if method == Method::GET && !self.graphiql {
            return Err(ViewError::NotFound);
        }

        // Browsers asking for HTML get the explorer page
        if method == Method::GET && self.should_display_graphiql(request) {
            return Ok(HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(render_graphiql_page(&self.endpoint)));
        }

        // Extract the operation and the context resolvers will see
        let operation = self.get_execution_context(request, body).await?;
        let context = self.get_context(request);

        // Only queries may run over GET
        if method == Method::GET {
            if let Some(ty) = selected_operation_type(&operation) {
                if ty != OperationType::Query {
                    warn!("Refusing {:?} operation over GET", ty);
                    return Err(ViewError::MethodNotAllowed);
                }
            }
        }

        debug!(
            "Executing operation {} with {} upload(s)",
            operation.operation_name.as_deref().unwrap_or("<anonymous>"),
            operation.files.len()
        );
        FILES_UPLOADED.inc_by(operation.files.len() as f64);

        // Execute and time the engine call
        let timer = Instant::now();
        let result = self.executor.execute(operation, context).await?;
        EXECUTION_TIME.observe(timer.elapsed().as_secs_f64());

        // Shape the result as {data, errors?} JSON
        let response = process_result(result)?;
        let body = serde_json::to_string(&response)
            .map_err(|e| ViewError::internal(format!("Unable to serialize response: {}", e)))?;

        Ok(HttpResponse::Ok().content_type("application/json").body(body))
    }

    // Context value handed to resolvers
    pub fn get_context<R: RequestHead + ?Sized>(&self, request: &R) -> RequestContext {
        RequestContext::from_head(request)
    }

    pub async fn get_execution_context<R: RequestHead + ?Sized>(
        &self,
        request: &R,
        body: Bytes,
    ) -> Result<ExecutionContext, ViewError> {
        // Bodiless GET requests carry their parameters in the URL
        if request.method() == Method::GET && body.is_empty() && !request.query_string().is_empty() {
            return parse_query_params(request.query_string());
        }

        // File uploads follow the multipart request convention
        if request.content_type().starts_with("multipart/form-data") {
            return self.parse_multipart(request.content_type(), body).await;
        }

        // Everything else must be a JSON object
        let data: Value = serde_json::from_slice(&body).map_err(|e| {
            debug!("Rejecting request body: {}", e);
            ViewError::bad_request(UNPARSEABLE_BODY)
        })?;
        parse_request_data(data)
    }

    async fn parse_multipart(&self, content_type: &str, body: Bytes) -> Result<ExecutionContext, ViewError> {
        // Split the stream into text fields and file parts
        let form = file_uploads::read_multipart(content_type, body)
            .await
            .map_err(|e| ViewError::bad_request(e.to_string()))?;

        // `operations` holds the request body, `map` the file placement
        let operations: Value = parse_form_json(form.fields.get("operations"))?;
        let files_map: FilesMap = parse_form_json(form.fields.get("map"))?;

        let (operations, bindings) =
            file_uploads::replace_placeholders_with_files(operations, &files_map, &form.files).map_err(|e| {
                warn!("Rejecting multipart request: {}", e);
                ViewError::bad_request(MISSING_FILES)
            })?;

        // Files travel next to the operation; JSON only holds their null placeholders
        let mut operation = parse_request_data(operations)?;
        operation.files = bindings;
        Ok(operation)
    }

    pub fn should_display_graphiql<R: RequestHead + ?Sized>(&self, request: &R) -> bool {
        self.graphiql && request_wants_html(request)
    }
}

pub fn request_wants_html<R: RequestHead + ?Sized>(request: &R) -> bool {
    // A missing Accept header means the client is not a browser
    let accept = request.header("accept").unwrap_or("");
    accept.contains("text/html") || accept.contains("*/*")
}

// Form fields missing from the request decode as an empty JSON object
fn parse_form_json<T: serde::de::DeserializeOwned>(field: Option<&String>) -> Result<T, ViewError> {
    let raw = field.map(String::as_str).unwrap_or("{}");
    serde_json::from_str(raw).map_err(|_| ViewError::bad_request(UNPARSEABLE_BODY))
}
