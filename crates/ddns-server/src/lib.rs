// # ddns-server
//
// HTTP front end for the DDNS update endpoint.
//
// Every path is answered by the same handler, so routers can be pointed at
// `/`, `/nic/update` or whatever their firmware insists on:
//
// ```text
// POST /?hostname=<ignored>&myip=203.0.113.5
// Authorization: Basic <base64(username:password)>
// ```
//
// The handler only translates between HTTP and `ddns-core`; all decisions
// are made by `UpdateOrchestrator`.

use axum::Router;
use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use ddns_core::{DdnsResponse, UpdateConfig, UpdateOrchestrator, UpdateRequest};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared, read-only state for every request
#[derive(Clone, Debug)]
pub struct AppState {
    pub orchestrator: UpdateOrchestrator,
    pub config: Arc<UpdateConfig>,
}

impl AppState {
    pub fn new(orchestrator: UpdateOrchestrator, config: UpdateConfig) -> Self {
        Self {
            orchestrator,
            config: Arc::new(config),
        }
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    with_panic_boundary(Router::new().fallback(update_handler).with_state(state))
}

/// Wrap a router in the outermost boundary
///
/// A panic anywhere below the catch-panic layer is answered with `dnserr`.
pub fn with_panic_boundary(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Serve the router until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener
        .local_addr()
        .map_err(|e| anyhow::anyhow!("Failed to read listener address: {}", e))?;
    info!("DDNS update endpoint listening on http://{}/", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("Update endpoint error: {}", e))?;

    Ok(())
}

async fn update_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let params = query.map(|Query(params)| params).unwrap_or_default();
    let request = to_update_request(&method, &headers, &params);

    let response = state.orchestrator.handle(&request, &state.config).await;
    into_http_response(response)
}

/// Extract the fields the validator looks at
///
/// The first occurrence of a repeated query parameter wins. A non-ASCII
/// `Authorization` header is treated as absent.
pub fn to_update_request(
    method: &Method,
    headers: &HeaderMap,
    params: &[(String, String)],
) -> UpdateRequest {
    let first = |name: &str| {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    UpdateRequest {
        method: method.as_str().to_string(),
        hostname: first("hostname"),
        myip: first("myip"),
        auth_header: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    }
}

/// Render a response token as a plain-text HTTP response
pub fn into_http_response(response: DdnsResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut http = (status, response.body()).into_response();

    if let Some(challenge) = response.challenge() {
        http.headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
    }

    http
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> axum::http::Response<Body> {
    let details = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Error updating DNS records: handler panicked: {}", details);

    into_http_response(DdnsResponse::DnsError)
}
