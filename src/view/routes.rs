use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use log::{error, warn};

use super::GraphQLView;
use crate::error::ViewError;
use crate::executor::Executor;
use crate::metrics::{self, OUTCOME_CLIENT_ERROR, OUTCOME_EXECUTED, OUTCOME_GRAPHIQL, OUTCOME_SERVER_ERROR};

// Handles every request to the GraphQL path; the view decides what each method means
pub async fn graphql_handler<E: Executor>(
    request: HttpRequest,
    body: web::Bytes,
    view: web::Data<GraphQLView<E>>,
) -> Result<HttpResponse, ViewError> {
    let result = view.dispatch(&request, body).await;

    // Record how the request ended; client errors are only worth a warning
    match &result {
        Ok(response) if is_html(response) => metrics::record_outcome(OUTCOME_GRAPHIQL),
        Ok(_) => metrics::record_outcome(OUTCOME_EXECUTED),
        Err(e) if e.status_code().is_client_error() => {
            warn!("{} {} rejected: {}", request.method(), request.path(), e);
            metrics::record_outcome(OUTCOME_CLIENT_ERROR);
        }
        Err(e) => {
            error!("{} {} failed: {}", request.method(), request.path(), e);
            metrics::record_outcome(OUTCOME_SERVER_ERROR);
        }
    }

    result
}

fn is_html(response: &HttpResponse) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"text/html"))
}

// Mounts the view at `path`, accepting bodies up to `max_body_size` bytes
pub fn configure<E: Executor>(
    view: GraphQLView<E>,
    path: &str,
    max_body_size: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
    let path = path.to_string();
    move |cfg| {
        cfg.app_data(web::Data::new(view)).service(
            web::resource(path)
                .app_data(web::PayloadConfig::new(max_body_size))
                .to(graphql_handler::<E>),
        );
    }
}
