use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorBodyDoc {
    pub error: String,
    pub detail: Option<String>,
}

#[derive(ToSchema)]
pub struct SubscriptionDoc {
    pub id: i32,
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    pub user_id: Uuid,
    /// MM-YYYY
    #[schema(example = "07-2025")]
    pub start_date: String,
    /// MM-YYYY, null when open-ended
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

#[derive(ToSchema)]
pub struct SubscriptionInputDoc {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i64,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    #[schema(example = "07-2025")]
    pub start_date: String,
    pub end_date: Option<String>,
}

#[derive(ToSchema)]
pub struct TotalCostRequestDoc {
    #[schema(example = "07-2025")]
    pub period_start: String,
    #[schema(example = "09-2025")]
    pub period_end: String,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

#[derive(ToSchema)]
pub struct TotalCostResponseDoc {
    #[schema(example = 1200)]
    pub total_cost: i64,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Subscriptions Service API", description = "Subscription records and monthly cost aggregation"),
    paths(
        crate::routes::health,
        crate::routes::subscriptions::create,
        crate::routes::subscriptions::get,
        crate::routes::subscriptions::update,
        crate::routes::subscriptions::delete,
        crate::routes::subscriptions::list,
        crate::routes::subscriptions::total_cost,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBodyDoc,
            SubscriptionDoc,
            SubscriptionInputDoc,
            TotalCostRequestDoc,
            TotalCostResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "subscriptions")
    )
)]
pub struct ApiDoc;
