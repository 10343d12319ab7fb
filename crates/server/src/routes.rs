use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::subscription::{repository::SubscriptionRepository, SubscriptionService};

use crate::openapi::ApiDoc;

pub mod subscriptions;

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub subscriptions: Arc<SubscriptionService<dyn SubscriptionRepository>>,
}

impl AppState {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions: Arc::new(SubscriptionService::new(repo)) }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: subscription API, health and API docs
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/subscriptions", post(subscriptions::create).get(subscriptions::list))
        // 静态路径优先于 /subscriptions/:id 匹配
        .route("/subscriptions/total-cost", post(subscriptions::total_cost))
        .route(
            "/subscriptions/:id",
            get(subscriptions::get).put(subscriptions::update).delete(subscriptions::delete),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                        .make_span_with(
                            DefaultMakeSpan::new()
                                .level(Level::INFO)
                                .include_headers(false),
                        )
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        // 响应返回时打点，包含状态码与耗时
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .include_headers(false),
                        )
                        // 失败（5xx 等）时以 ERROR 记录
                        .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
                )
                .layer(cors),
        )
}
