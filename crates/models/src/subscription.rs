use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors, month_year::MonthYear};

pub const SERVICE_NAME_MAX_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn start_month(&self) -> MonthYear {
        MonthYear::from_date(self.start_date)
    }

    pub fn end_month(&self) -> Option<MonthYear> {
        self.end_date.map(MonthYear::from_date)
    }
}

pub fn validate_service_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("service_name required".into()));
    }
    if name.chars().count() > SERVICE_NAME_MAX_LEN {
        return Err(errors::ModelError::Validation(format!(
            "service_name longer than {SERVICE_NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Price must be non-negative and fit the `integer` column.
pub fn validate_price(price: i64) -> Result<i32, errors::ModelError> {
    if price < 0 {
        return Err(errors::ModelError::Validation("price must be non-negative".into()));
    }
    i32::try_from(price).map_err(|_| errors::ModelError::Validation("price out of range".into()))
}

pub fn validate_user_id(raw: &str) -> Result<Uuid, errors::ModelError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| errors::ModelError::Validation(format!("user_id must be a UUID, got '{raw}'")))
}

pub fn validate_date_range(start: MonthYear, end: Option<MonthYear>) -> Result<(), errors::ModelError> {
    match end {
        Some(end) if end < start => Err(errors::ModelError::Validation(format!(
            "end_date {end} precedes start_date {start}"
        ))),
        _ => Ok(()),
    }
}
