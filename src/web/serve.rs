use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, Response},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::App;

use super::{midware, routes::routes, REQUEST_ID_HEADER};

/// The core async function returning a future that will serve this application.
///
/// Accepts the `App` and wraps the routes in the request id, tracing, CORS and
/// error mapping middleware.
///
/// Current implementation might return an IO error from `axum::serve`
pub async fn serve(app: App) -> std::io::Result<()> {
    let App {
        app_state,
        listener,
    } = app;

    axum::serve(listener, app_router(app_state)).await
}

/// The application `Router` with all of its middleware.
pub fn app_router(app_state: crate::AppState) -> Router {
    let x_request_id: HeaderName = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new().merge(routes(app_state)).layer(
        ServiceBuilder::new()
            // Set UUID per request
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                MakeRequestUuid,
            ))
            // Propagate UUID to whatever response comes back, including the ones the mapper rebuilds.
            .layer(PropagateRequestIdLayer::new(x_request_id))
            .layer(build_trace_layer())
            // `CorsLayer` only sends these two on pre-flight responses.
            .layer(SetResponseHeaderLayer::if_not_present(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(CORS_ALLOW_METHODS),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(CORS_ALLOW_HEADERS),
            ))
            // Answers pre-flight `OPTIONS` requests itself.
            .layer(build_cors_layer())
            .layer(middleware::map_response(midware::response_mapper)),
    )
}

const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
const CORS_ALLOW_HEADERS: &str = "content-type";

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// A helper function that sets up the `tower_http::TraceLayer` - tracing configuration.
fn build_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let uuid = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .map(|uuid| uuid.to_str().unwrap_or("").to_string());

            tracing::error_span!(
                "serve",
                id = uuid,
                method = req.method().to_string(),
                path = req.uri().path()
            )
        })
        .on_request(|req: &Request<Body>, _s: &Span| tracing::debug!("START @ {}", req.uri()))
        .on_response(|res: &Response<Body>, latency: Duration, _s: &Span| {
            let st_code = res.status().as_u16();

            if (500..=599).contains(&st_code) {
                tracing::error!("END in: {:?} - STATUS: {st_code}", latency)
            } else {
                tracing::debug!("END in: {:?} - STATUS: {st_code}", latency)
            }
        })
}
