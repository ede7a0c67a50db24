use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use fwdist_core::{
    manifest::{Manifest, ManifestRequest, MODE_UPDATE},
    runtime::{Runtime, UnknownDevice},
};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, ToSchema, IntoParams)]
pub struct ManifestQuery {
    /// Device identifier.
    pub t: String,
    /// Firmware version.
    pub v: String,
    /// Install mode, `1` for update.
    pub u: Option<String>,
    /// Firmware source name, echoed into download paths.
    pub src: Option<String>,
}

#[tracing::instrument(level = "info", skip(state))]
#[utoipa::path(
    tag = "manifest",
    get,
    path = "/api/manifest",
    params(ManifestQuery),
    responses(
        (status = 200, description = "Install manifest for the web flasher", body = Manifest),
        (status = 404, description = "Unknown device")
    )
)]
pub(crate) async fn get_manifest(
    State(state): State<Arc<Runtime>>,
    Query(query): Query<ManifestQuery>,
) -> Result<Json<Manifest>, (StatusCode, String)> {
    let request = ManifestRequest {
        device: query.t,
        version: query.v,
        mode: query.u.unwrap_or_else(|| MODE_UPDATE.to_string()),
        source: query.src,
    };

    match state.build_manifest(&request).await {
        Ok(manifest) => Ok(Json(manifest)),
        Err(err) if err.downcast_ref::<UnknownDevice>().is_some() => {
            Err((StatusCode::NOT_FOUND, err.to_string()))
        }
        Err(err) => {
            tracing::error!("Error building manifest: {:?}", err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error building manifest".to_string(),
            ))
        }
    }
}
