use async_graphql::http::GraphiQLSource;

// Renders the GraphiQL explorer, sending its queries back to `endpoint`
pub fn render_graphiql_page(endpoint: &str) -> String {
    GraphiQLSource::build().endpoint(endpoint).title("GraphiQL").finish()
}
