use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{MethodRouter, get},
};
use serde::Serialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    application::helpers::filter_parsing::filter_from_query,
    domain::entities::subscription::Subscription,
    use_cases::subscription::{CreateSubscriptionInput, UpdateSubscriptionInput},
};

#[derive(Serialize)]
struct ListResponse {
    subscriptions: Vec<Subscription>,
}

#[derive(Serialize)]
struct SumResponse {
    sum: f64,
}

/// List and create, mounted on both `/subscriptions` and `/subscriptions/`.
pub fn collection() -> MethodRouter<AppState> {
    get(list_subscriptions).post(create_subscription)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", collection())
        .route("/sum", get(sum_subscriptions))
        .route(
            "/{id}",
            get(get_subscription)
                .patch(update_subscription)
                .delete(delete_subscription),
        )
}

async fn list_subscriptions(
    State(app_state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<impl IntoResponse> {
    let filter = filter_from_query(&params)?;
    let subscriptions = app_state
        .subscription_use_cases
        .get_by_filters(&filter)
        .await?;
    Ok(Json(ListResponse { subscriptions }))
}

async fn sum_subscriptions(
    State(app_state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<impl IntoResponse> {
    let filter = filter_from_query(&params)?;
    let sum = app_state.subscription_use_cases.get_sum(&filter).await?;
    Ok(Json(SumResponse { sum }))
}

async fn get_subscription(
    State(app_state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = id?;
    let subscription = app_state.subscription_use_cases.get_by_id(id).await?;
    Ok(Json(subscription))
}

async fn create_subscription(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateSubscriptionInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let subscription = app_state.subscription_use_cases.create(&input).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn update_subscription(
    State(app_state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateSubscriptionInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let subscription = app_state
        .subscription_use_cases
        .update(id, &input)
        .await?;
    Ok(Json(subscription))
}

async fn delete_subscription(
    State(app_state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = id?;
    app_state.subscription_use_cases.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
