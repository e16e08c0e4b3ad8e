use axum::{extract::State, Json};
use chrono::Utc;

use crate::catalog::CatalogRecord;
use crate::track::{rank_targets, RankingEntry};
use crate::web::api::error::{blocking, ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AuthenticatedUser};
use crate::web::state::AppState;
use crate::web::config::Permission;

#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog records in file order", body = Vec<CatalogRecord>),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions")
    ),
    security(("api_key" = []))
)]
pub async fn list_catalog(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<CatalogRecord>>> {
    require_permission(&user, Permission::Read)?;
    Ok(Json(state.catalog.records().to_vec()))
}

#[utoipa::path(
    get,
    path = "/api/ranking",
    tag = "catalog",
    responses(
        (status = 200, description = "Targets nearest to the observer first", body = Vec<RankingEntry>),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 503, description = "Observer location not set", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn ranking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<RankingEntry>>> {
    require_permission(&user, Permission::Read)?;

    let now = Utc::now();
    let ranked = blocking(move || {
        let observer = state.observer.get();
        Ok(rank_targets(
            &state.catalog.targets(),
            observer.as_ref(),
            state.propagator.as_ref(),
            now,
            &state.config.ranking.params(),
            &state.config.filter,
        )?)
    })
    .await?;
    Ok(Json(ranked))
}
