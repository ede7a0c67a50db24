use std::sync::Arc;

use axum::Router;
use fwdist_core::runtime::Runtime;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

mod info;
mod manifest;
mod partitions;
mod sources;

#[derive(utoipa::OpenApi)]
#[openapi()]
pub struct ClientApiDoc;

pub(crate) fn setup_client_router() -> (Router<Arc<Runtime>>, utoipa::openapi::OpenApi) {
    OpenApiRouter::with_openapi(ClientApiDoc::openapi())
        .routes(routes!(manifest::get_manifest))
        .routes(routes!(partitions::get_partitions))
        .routes(routes!(sources::list_sources))
        .routes(routes!(info::service_info))
        .split_for_parts()
}
