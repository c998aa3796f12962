use async_graphql::{ObjectType, Request, Schema, SubscriptionType, Variables};
use async_trait::async_trait;
use log::warn;
use serde_json::{Map, Value};

use crate::error::ViewError;
use crate::file_uploads::FileBinding;
use crate::http::RequestContext;

// The operation extracted from one HTTP request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    pub query: String,
    pub variables: Option<Map<String, Value>>,
    pub operation_name: Option<String>,
    pub files: Vec<FileBinding>, // Uploads bound to variables.* paths
}

pub type ExecutionResult = async_graphql::Response;

// Boundary to the schema engine. The root value is the schema's own query root.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    async fn execute(&self, operation: ExecutionContext, context: RequestContext) -> Result<ExecutionResult, ViewError>;
}

#[async_trait]
impl<Query, Mutation, Subscription> Executor for Schema<Query, Mutation, Subscription>
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    async fn execute(&self, operation: ExecutionContext, context: RequestContext) -> Result<ExecutionResult, ViewError> {
        let request = build_request(operation, context)?;
        Ok(Schema::execute(self, request).await)
    }
}

// Translates an ExecutionContext into an engine request, attaching the request context as data
pub fn build_request(operation: ExecutionContext, context: RequestContext) -> Result<Request, ViewError> {
    let mut request = Request::new(operation.query).data(context);

    if let Some(variables) = operation.variables {
        request = request.variables(Variables::from_json(Value::Object(variables)));
    }
    if let Some(operation_name) = operation.operation_name {
        request = request.operation_name(operation_name);
    }

    for binding in operation.files {
        if !binding.path.starts_with("variables.") {
            warn!("Ignoring upload bound outside of variables: {}", binding.path);
            continue;
        }
        let upload = binding
            .file
            .to_upload_value()
            .map_err(|e| ViewError::internal(format!("Unable to store uploaded file: {}", e)))?;
        request.set_upload(&binding.path, upload);
    }

    Ok(request)
}
