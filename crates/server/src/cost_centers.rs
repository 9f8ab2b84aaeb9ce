use api_types::cost_center::{CostCenterNew, CostCenterView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn map_cost_center(cost_center: engine::CostCenter) -> CostCenterView {
    CostCenterView {
        id: cost_center.id,
        label: cost_center.label,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CostCenterView>>, ServerError> {
    let cost_centers = state
        .engine
        .list_cost_centers()
        .await?
        .into_iter()
        .map(map_cost_center)
        .collect();
    Ok(Json(cost_centers))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CostCenterNew>,
) -> Result<(StatusCode, Json<CostCenterView>), ServerError> {
    let cost_center = state.engine.create_cost_center(&payload.label).await?;
    Ok((StatusCode::CREATED, Json(map_cost_center(cost_center))))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_cost_center(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
