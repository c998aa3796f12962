pub mod config;
pub mod error;
pub mod executor;
pub mod file_uploads;
pub mod graphiql;
pub mod graphql;
pub mod http;
pub mod metrics;
pub mod types;
pub mod view;

pub use config::Config;
pub use error::ViewError;
pub use executor::{ExecutionContext, ExecutionResult, Executor};
pub use http::{process_result, GraphQLHTTPResponse, RequestContext, RequestHead};
pub use types::{FieldDefinition, TypeBuilder, TypeDefinition, TypeRef, TypeRegistry};
pub use view::GraphQLView;
