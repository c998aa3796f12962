// GraphQL-over-HTTP conventions: request data extraction and response shaping
pub mod request;

pub use request::{RequestContext, RequestHead};

use std::collections::HashMap;

use actix_web::web;
use async_graphql::parser::parse_query;
use async_graphql::parser::types::{DocumentOperations, OperationType};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ViewError;
use crate::executor::{ExecutionContext, ExecutionResult};

pub const UNPARSEABLE_BODY: &str = "Unable to parse request body as JSON";
pub const MISSING_QUERY: &str = "No GraphQL query found in the request";
pub const MISSING_FILES: &str = "File(s) missing in form data";

// Response body sent back to the client: data is always present, errors only when there are some
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLHTTPResponse {
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
}

// Converts an execution result into its wire shape
pub fn process_result(result: ExecutionResult) -> Result<GraphQLHTTPResponse, ViewError> {
    let data = result
        .data
        .into_json()
        .map_err(|e| ViewError::internal(format!("Unable to serialize result data: {}", e)))?;

    let errors = if result.errors.is_empty() {
        None
    } else {
        let formatted = result
            .errors
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ViewError::internal(format!("Unable to serialize errors: {}", e)))?;
        Some(formatted)
    };

    Ok(GraphQLHTTPResponse { data, errors })
}

// Extracts query, variables and operationName from a decoded request body
pub fn parse_request_data(data: Value) -> Result<ExecutionContext, ViewError> {
    let mut data = match data {
        Value::Object(map) => map,
        _ => return Err(ViewError::bad_request(MISSING_QUERY)),
    };

    let query = match data.remove("query") {
        Some(Value::String(query)) => query,
        _ => return Err(ViewError::bad_request(MISSING_QUERY)),
    };

    let variables = match data.remove("variables") {
        None | Some(Value::Null) => None,
        Some(Value::Object(variables)) => Some(variables),
        Some(_) => return Err(ViewError::bad_request("Variables must be a JSON object")),
    };

    let operation_name = match data.remove("operationName") {
        Some(Value::String(name)) => Some(name),
        _ => None,
    };

    Ok(ExecutionContext {
        query,
        variables,
        operation_name,
        files: Vec::new(),
    })
}

// Same as parse_request_data, for parameters carried in a GET query string
pub fn parse_query_params(query_string: &str) -> Result<ExecutionContext, ViewError> {
    let params = web::Query::<HashMap<String, String>>::from_query(query_string)
        .map_err(|e| ViewError::bad_request(e.to_string()))?
        .into_inner();

    let mut data = Map::new();
    if let Some(query) = params.get("query") {
        data.insert("query".to_string(), Value::String(query.clone()));
    }
    if let Some(variables) = params.get("variables") {
        let variables: Value =
            serde_json::from_str(variables).map_err(|_| ViewError::bad_request(UNPARSEABLE_BODY))?;
        data.insert("variables".to_string(), variables);
    }
    if let Some(name) = params.get("operationName") {
        data.insert("operationName".to_string(), Value::String(name.clone()));
    }

    parse_request_data(Value::Object(data))
}

// Type of the operation a request would run, or None when the engine should report the problem
pub fn selected_operation_type(operation: &ExecutionContext) -> Option<OperationType> {
    let document = parse_query(&operation.query).ok()?;
    match (&document.operations, operation.operation_name.as_deref()) {
        (DocumentOperations::Single(op), _) => Some(op.node.ty),
        (DocumentOperations::Multiple(ops), Some(name)) => ops.get(name).map(|op| op.node.ty),
        // One named operation runs without an operationName
        (DocumentOperations::Multiple(ops), None) if ops.len() == 1 => ops.values().next().map(|op| op.node.ty),
        (DocumentOperations::Multiple(_), None) => None,
    }
}
