use std::{net::IpAddr, str::FromStr, sync::Arc, time::Duration};

use axum::{
    extract::MatchedPath,
    http::Request,
    response::{Redirect, Response},
    routing::get,
    Router,
};
use client::setup_client_router;
use fwdist_core::runtime::Runtime;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{info_span, Span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa_scalar::{Scalar, Servable};
use utoipa_swagger_ui::SwaggerUi;

mod client;

const FWDIST_VERSION: &str = env!("CARGO_PKG_VERSION");

fn set_api_docs_info(mut openapi: utoipa::openapi::OpenApi) -> utoipa::openapi::OpenApi {
    openapi.info.title = "Firmware Distribution API".to_string();
    openapi.info.version = FWDIST_VERSION.to_string();
    openapi.info.description = Some("Install manifests and partition tables".to_string());

    openapi
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = &*fwdist_config::CONFIG;
    let runtime = Arc::new(Runtime::from_config(config));
    for source in runtime.sources() {
        tracing::info!(
            "serving {} firmware from {} (src: {})",
            source.kind.as_str(),
            source.path.display(),
            source.src.as_deref().unwrap_or("-")
        );
    }

    let (client_router, api_docs) = setup_client_router();
    let api_docs = set_api_docs_info(api_docs);

    let router = client_router
        .merge(Scalar::with_url("/scalar/", api_docs.clone()))
        .route("/scalar", get(|| async { Redirect::to("/scalar/") }))
        .merge(SwaggerUi::new("/swagger").url("/api/openapi.json", api_docs))
        .with_state(runtime);
    let router = trace_requests(router);

    let addr = std::net::SocketAddr::new(
        IpAddr::from_str(&config.host)
            .map_err(|e| anyhow::anyhow!("Failed to parse IP address from config: {}", e))?,
        config.port,
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to address {}: {}", addr, e))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}

fn setup_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let level = &fwdist_config::CONFIG.log_level;
                format!(
                    "{}={level},fwdist_core={level},fwdist_partitions={level},tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn trace_requests(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                info_span!(
                    "http_request",
                    method = ?request.method(),
                    matched_path,
                    query = request.uri().query(),
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {
                tracing::info!("Request Received.");
            })
            .on_response(|_response: &Response, latency: Duration, _span: &Span| {
                tracing::info!("Response Completed. Duration: {:?}", latency);
            })
            .on_failure(
                |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    tracing::error!("Request failed: {}", error)
                },
            ),
    )
}
