use models::{errors::ModelError, subscription as entity, MonthYear};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Stored subscription (business view).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i32,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    pub end_date: Option<MonthYear>,
}

/// Create/replace input as received from clients. Nothing is trusted yet;
/// an `id` in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionInput {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Validated mutable fields of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionData {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    pub end_date: Option<MonthYear>,
}

/// Exact-match list filters; `None` imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

/// Tag a model validation failure with the offending field name.
pub(crate) fn field_error(field: &str) -> impl FnOnce(ModelError) -> ServiceError + '_ {
    move |ModelError::Validation(msg)| ServiceError::Validation(format!("{field}: {msg}"))
}

/// Empty query parameters mean "not provided".
fn non_empty(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.trim().is_empty())
}

impl TryFrom<SubscriptionInput> for SubscriptionData {
    type Error = ServiceError;

    fn try_from(input: SubscriptionInput) -> Result<Self, Self::Error> {
        entity::validate_service_name(&input.service_name).map_err(field_error("service_name"))?;
        let price = entity::validate_price(input.price).map_err(field_error("price"))?;
        let user_id = entity::validate_user_id(&input.user_id).map_err(field_error("user_id"))?;
        let start_date: MonthYear = input.start_date.parse().map_err(field_error("start_date"))?;
        let end_date = match non_empty(input.end_date.as_deref()) {
            Some(raw) => Some(raw.parse::<MonthYear>().map_err(field_error("end_date"))?),
            None => None,
        };
        entity::validate_date_range(start_date, end_date).map_err(field_error("end_date"))?;
        Ok(Self { service_name: input.service_name, price, user_id, start_date, end_date })
    }
}

impl Subscription {
    pub fn from_data(id: i32, data: SubscriptionData) -> Self {
        Self {
            id,
            service_name: data.service_name,
            price: data.price,
            user_id: data.user_id,
            start_date: data.start_date,
            end_date: data.end_date,
        }
    }
}

impl From<entity::Model> for Subscription {
    fn from(m: entity::Model) -> Self {
        Self {
            id: m.id,
            start_date: m.start_month(),
            end_date: m.end_month(),
            service_name: m.service_name,
            price: m.price,
            user_id: m.user_id,
        }
    }
}

impl SubscriptionFilter {
    /// Build from raw query values; a malformed `user_id` is a validation error.
    pub fn parse(user_id: Option<&str>, service_name: Option<&str>) -> Result<Self, ServiceError> {
        let user_id = non_empty(user_id)
            .map(|raw| entity::validate_user_id(raw).map_err(field_error("user_id")))
            .transpose()?;
        let service_name = non_empty(service_name).map(str::to_string);
        Ok(Self { user_id, service_name })
    }

    /// Build from JSON body values: a present `user_id` must be a UUID, even
    /// when empty, and a present `service_name` is matched verbatim.
    pub fn exact(user_id: Option<&str>, service_name: Option<&str>) -> Result<Self, ServiceError> {
        let user_id = user_id
            .map(|raw| entity::validate_user_id(raw).map_err(field_error("user_id")))
            .transpose()?;
        Ok(Self { user_id, service_name: service_name.map(str::to_string) })
    }

    pub fn matches(&self, sub: &Subscription) -> bool {
        self.user_id.map_or(true, |uid| sub.user_id == uid)
            && self.service_name.as_deref().map_or(true, |name| sub.service_name == name)
    }
}
