use axum::Json;

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ServiceInfo {
    name: &'static str,
    version: &'static str,
}

#[tracing::instrument(level = "info")]
#[utoipa::path(
    tag = "system",
    get,
    path = "/api/info",
    responses((status = 200, description = "Service name and version", body = ServiceInfo))
)]
pub(crate) async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
