use std::sync::Arc;

use axum::{extract::State, Json};
use fwdist_core::runtime::Runtime;

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct SourceInfo {
    src: Option<String>,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[tracing::instrument(level = "info", skip(state))]
#[utoipa::path(
    tag = "system",
    get,
    path = "/api/srcs",
    responses((status = 200, description = "Configured firmware sources", body = Vec<SourceInfo>))
)]
pub(crate) async fn list_sources(State(state): State<Arc<Runtime>>) -> Json<Vec<SourceInfo>> {
    Json(
        state
            .sources()
            .iter()
            .map(|source| SourceInfo {
                src: source.src.clone(),
                kind: source.kind.as_str(),
            })
            .collect(),
    )
}
