use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use fwdist_core::runtime::Runtime;
use fwdist_partitions::{analyze, PartitionError};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PartitionView {
    #[default]
    Json,
    Analysis,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, ToSchema, IntoParams)]
pub struct PartitionsQuery {
    pub t: String,
    pub v: String,
    /// Firmware source to look in first.
    pub src: Option<String>,
    /// Return only the first record with this name.
    pub name: Option<String>,
    #[serde(default)]
    pub format: PartitionView,
}

#[tracing::instrument(level = "info", skip(state))]
#[utoipa::path(
    tag = "partitions",
    get,
    path = "/api/partitions",
    params(PartitionsQuery),
    responses(
        (status = 200, description = "Decoded partition table of a build"),
        (status = 404, description = "The build ships no partition table"),
        (status = 422, description = "The partition table is malformed")
    )
)]
pub(crate) async fn get_partitions(
    State(state): State<Arc<Runtime>>,
    Query(query): Query<PartitionsQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let table = match state
        .load_partition_table(&query.t, &query.v, query.src.as_deref())
        .await
    {
        Ok(Some(table)) => table,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                format!("No partition table for {}/{}", query.t, query.v),
            ))
        }
        Err(err) => {
            if let Some(parse_err) = err.downcast_ref::<PartitionError>() {
                return Err((StatusCode::UNPROCESSABLE_ENTITY, parse_err.to_string()));
            }
            tracing::error!("Error loading partition table: {:?}", err);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error loading partition table".to_string(),
            ));
        }
    };

    if let Some(name) = &query.name {
        let Some(record) = table.get_by_name(name) else {
            return Err((
                StatusCode::NOT_FOUND,
                format!("No partition named {} in {}/{}", name, query.t, query.v),
            ));
        };
        return serde_json::to_value(record.view(true))
            .map(Json)
            .map_err(serialize_error);
    }

    let value = match query.format {
        PartitionView::Json => serde_json::to_value(table.view(true)),
        PartitionView::Analysis => serde_json::to_value(analyze(&table)),
    };

    value.map(Json).map_err(serialize_error)
}

fn serialize_error(err: serde_json::Error) -> (StatusCode, String) {
    tracing::error!("Error serializing partition table: {:?}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error serializing partition table".to_string(),
    )
}
