use actix_web::HttpResponse;
use prometheus::{register_counter, register_histogram, register_int_counter_vec, Counter, Histogram, IntCounterVec};

// Defines Prometheus metrics for monitoring the GraphQL view
lazy_static::lazy_static! {
    // Requests handled by the view, labelled by how they ended
    pub static ref REQUESTS: IntCounterVec = register_int_counter_vec!(
        "graphql_view_requests_total",
        "GraphQL HTTP requests by outcome",
        &["outcome"]
    ).unwrap();

    // Time spent inside the schema engine, in seconds
    pub static ref EXECUTION_TIME: Histogram = register_histogram!(
        "graphql_view_execution_seconds",
        "GraphQL execution time in seconds"
    ).unwrap();

    // Uploaded files attached to executed operations
    pub static ref FILES_UPLOADED: Counter = register_counter!(
        "graphql_view_uploaded_files_total",
        "Files bound to operations from multipart requests"
    ).unwrap();
}

// Outcome labels used with REQUESTS
pub const OUTCOME_EXECUTED: &str = "executed";
pub const OUTCOME_GRAPHIQL: &str = "graphiql";
pub const OUTCOME_CLIENT_ERROR: &str = "client_error";
pub const OUTCOME_SERVER_ERROR: &str = "server_error";

// Counts one handled request under the given outcome label
pub fn record_outcome(outcome: &str) {
    REQUESTS.with_label_values(&[outcome]).inc();
}

// Handles GET /metrics requests to expose Prometheus metrics
pub async fn metrics() -> HttpResponse {
    // Create a text encoder for the exposition format
    let encoder = prometheus::TextEncoder::new();
    // Gather all registered metrics
    let metric_families = prometheus::gather();
    // Encode metrics to a string, empty if encoding fails
    let encoded = encoder.encode_to_string(&metric_families).unwrap_or_default();
    // Return metrics as plain text
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(encoded)
}
