use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service::subscription::domain::{Subscription, SubscriptionFilter, SubscriptionInput};
use tracing::{info, warn};

use super::AppState;
use crate::errors::JsonApiError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Owner UUID, exact match
    pub user_id: Option<String>,
    /// Service name, exact match
    pub service_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TotalCostRequest {
    pub period_start: String,
    pub period_end: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TotalCostResponse {
    pub total_cost: i64,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, JsonApiError> {
    payload.map(|Json(v)| v).map_err(|e| {
        warn!(err = %e.body_text(), "rejected request body");
        JsonApiError::bad_request(e.body_text())
    })
}

fn path_id(id: Result<Path<i32>, PathRejection>) -> Result<i32, JsonApiError> {
    id.map(|Path(id)| id).map_err(|_| JsonApiError::bad_request("Invalid ID"))
}

/// 创建订阅
#[utoipa::path(
    post, path = "/subscriptions", tag = "subscriptions",
    request_body = crate::openapi::SubscriptionInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::SubscriptionDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Internal Server Error", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Subscription>), JsonApiError> {
    let input = body(payload)?;
    let created = state.subscriptions.create(input).await?;
    info!(id = created.id, service_name = %created.service_name, "created subscription");
    Ok((StatusCode::CREATED, Json(created)))
}

/// 按 ID 获取订阅
#[utoipa::path(
    get, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::SubscriptionDoc),
        (status = 400, description = "Invalid ID", body = crate::openapi::ErrorBodyDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Subscription>, JsonApiError> {
    let id = path_id(id)?;
    Ok(Json(state.subscriptions.get(id).await?))
}

/// 整体替换订阅（id 不变）
#[utoipa::path(
    put, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription ID")),
    request_body = crate::openapi::SubscriptionInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::SubscriptionDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<Json<Subscription>, JsonApiError> {
    let id = path_id(id)?;
    let input = body(payload)?;
    let updated = state.subscriptions.update(id, input).await?;
    info!(id = updated.id, "updated subscription");
    Ok(Json(updated))
}

/// 删除订阅
#[utoipa::path(
    delete, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid ID", body = crate::openapi::ErrorBodyDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let id = path_id(id)?;
    state.subscriptions.delete(id).await?;
    info!(id, "deleted subscription");
    Ok(StatusCode::NO_CONTENT)
}

/// 列出订阅，可按 user_id / service_name 精确过滤
#[utoipa::path(
    get, path = "/subscriptions", tag = "subscriptions",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK", body = [crate::openapi::SubscriptionDoc]),
        (status = 400, description = "Invalid filter", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Subscription>>, JsonApiError> {
    let Query(q) = query.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let filter = SubscriptionFilter::parse(q.user_id.as_deref(), q.service_name.as_deref())?;
    let list = state.subscriptions.list(filter).await?;
    info!(count = list.len(), "list subscriptions");
    Ok(Json(list))
}

/// 统计周期内订阅总费用（按月计费，首尾月份均计入）
#[utoipa::path(
    post, path = "/subscriptions/total-cost", tag = "subscriptions",
    request_body = crate::openapi::TotalCostRequestDoc,
    responses(
        (status = 200, description = "Total cost", body = crate::openapi::TotalCostResponseDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn total_cost(
    State(state): State<AppState>,
    payload: Result<Json<TotalCostRequest>, JsonRejection>,
) -> Result<Json<TotalCostResponse>, JsonApiError> {
    let req = body(payload)?;
    let total_cost = state
        .subscriptions
        .calculate_total_cost(
            &req.period_start,
            &req.period_end,
            req.user_id.as_deref(),
            req.service_name.as_deref(),
        )
        .await?;
    Ok(Json(TotalCostResponse { total_cost }))
}
