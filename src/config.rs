use std::env;

// Configuration for the GraphQL HTTP server
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String, // Address for main HTTP server
    pub graphql_path: String, // Path the GraphQL view is mounted at
    pub graphiql: bool, // Serve GraphiQL on GET requests
    pub metrics_port: u16, // Port for Prometheus metrics server
    pub max_body_size: usize, // Largest accepted request body in bytes
}

impl Config {
    // Loads configuration from environment variables, with defaults for optional fields
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let config = Config {
            // Default to all interfaces on port 8080
            bind_addr: env::var("BIND_ADDR").unwrap_or("0.0.0.0:8080".to_string()),
            // Default to /graphql
            graphql_path: env::var("GRAPHQL_PATH").unwrap_or("/graphql".to_string()),
            // GraphiQL is on unless explicitly disabled
            graphiql: parse_bool(&env::var("GRAPHIQL").unwrap_or("true".to_string()))
                .ok_or("GRAPHIQL must be true or false")?,
            // Default to port 9090
            metrics_port: env::var("METRICS_PORT").unwrap_or("9090".to_string()).parse()?,
            // Default to 10 MiB, enough for modest file uploads
            max_body_size: env::var("MAX_BODY_SIZE")
                .unwrap_or((10 * 1024 * 1024).to_string())
                .parse()?,
        };

        // The path is handed to actix-web as a resource pattern
        if !config.graphql_path.starts_with('/') {
            return Err("GRAPHQL_PATH must start with '/'".into());
        }

        Ok(config)
    }
}

// Accepts the usual on/off spellings, case-insensitively
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
