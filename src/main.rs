use actix_web::{web, App, HttpServer};
use log::info;

use graphql_view::graphql::{build_schema, demo_registry};
use graphql_view::{metrics, view, Config, GraphQLView};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load a local .env file, if present, before reading configuration
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(std::io::Error::other)?;
    let registry = demo_registry().map_err(std::io::Error::other)?;
    info!("Registered {} GraphQL type definitions", registry.len());

    let gql_view = GraphQLView::new(build_schema(registry))
        .graphiql(config.graphiql)
        .endpoint(config.graphql_path.clone());
    info!(
        "Serving GraphQL at {}{} (GraphiQL {})",
        config.bind_addr,
        config.graphql_path,
        if gql_view.graphiql_enabled() { "enabled" } else { "disabled" }
    );

    // Prometheus metrics live on their own port
    let metrics_server = HttpServer::new(|| App::new().route("/metrics", web::get().to(metrics::metrics)))
        .bind(("0.0.0.0", config.metrics_port))?
        .run();
    info!("Serving metrics on port {}", config.metrics_port);

    let app_config = config.clone();
    let server = HttpServer::new(move || {
        App::new().configure(view::configure(
            gql_view.clone(),
            &app_config.graphql_path,
            app_config.max_body_size,
        ))
    })
    .bind(&config.bind_addr)?
    .run();

    tokio::try_join!(server, metrics_server)?;
    Ok(())
}
