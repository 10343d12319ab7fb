use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait,
    NotSet, QueryFilter, QueryOrder, Set, Statement, Value,
};
use tracing::debug;

use models::subscription::{self, Entity as SubscriptionEntity};

use crate::errors::ServiceError;
use crate::subscription::cost::CostQuery;
use crate::subscription::domain::{Subscription, SubscriptionData, SubscriptionFilter};
use crate::subscription::repository::SubscriptionRepository;

/// SeaORM-backed repository implementation.
pub struct SeaOrmSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn db_err(e: DbErr) -> ServiceError {
    ServiceError::Db(e.to_string())
}

fn active_model(id: Option<i32>, data: &SubscriptionData) -> subscription::ActiveModel {
    subscription::ActiveModel {
        id: id.map_or(NotSet, Set),
        service_name: Set(data.service_name.clone()),
        price: Set(data.price),
        user_id: Set(data.user_id),
        start_date: Set(data.start_date.first_day()),
        end_date: Set(data.end_date.map(|m| m.first_day())),
    }
}

/// Positional parameters for hand-written postgres SQL.
/// Each `bind` appends a value and returns its `$n` placeholder.
#[derive(Default)]
struct PgParams {
    values: Vec<Value>,
}

impl PgParams {
    fn bind<V: Into<Value>>(&mut self, v: V) -> String {
        self.values.push(v.into());
        format!("${}", self.values.len())
    }
}

/// One statement computing `SUM(price * months_active)`: each subscription
/// expands to one row per month of its active range clipped to the period.
fn total_cost_statement(query: &CostQuery) -> Statement {
    let mut params = PgParams::default();
    let start = params.bind(query.period.start.first_day());
    let end = params.bind(query.period.end.first_day());

    let mut sql = format!(
        "SELECT COALESCE(SUM(s.price::bigint), 0)::bigint AS total_cost \
         FROM subscriptions AS s \
         CROSS JOIN LATERAL generate_series( \
             GREATEST(date_trunc('month', s.start_date::timestamp), {start}::timestamp), \
             LEAST(COALESCE(date_trunc('month', s.end_date::timestamp), {end}::timestamp), {end}::timestamp), \
             interval '1 month' \
         ) AS m(month) \
         WHERE s.start_date < ({end}::date + interval '1 month') \
           AND (s.end_date IS NULL OR s.end_date >= {start}::date)"
    );
    if let Some(uid) = query.filter.user_id {
        sql.push_str(&format!(" AND s.user_id = {}", params.bind(uid)));
    }
    if let Some(name) = &query.filter.service_name {
        sql.push_str(&format!(" AND s.service_name = {}", params.bind(name.clone())));
    }
    Statement::from_sql_and_values(DatabaseBackend::Postgres, sql, params.values)
}

#[async_trait::async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn create(&self, data: &SubscriptionData) -> Result<Subscription, ServiceError> {
        let created = active_model(None, data).insert(&self.db).await.map_err(db_err)?;
        Ok(created.into())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Subscription>, ServiceError> {
        let found = SubscriptionEntity::find_by_id(id).one(&self.db).await.map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn update(&self, id: i32, data: &SubscriptionData) -> Result<Option<Subscription>, ServiceError> {
        // UPDATE ... RETURNING；无匹配行时 sea-orm 返回 RecordNotUpdated
        match active_model(Some(id), data).update(&self.db).await {
            Ok(updated) => Ok(Some(updated.into())),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let res = SubscriptionEntity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }

    async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, ServiceError> {
        let mut finder = SubscriptionEntity::find();
        if let Some(uid) = filter.user_id { finder = finder.filter(subscription::Column::UserId.eq(uid)); }
        if let Some(name) = &filter.service_name { finder = finder.filter(subscription::Column::ServiceName.eq(name.clone())); }
        let rows = finder
            .order_by_asc(subscription::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn aggregate_total_cost(&self, query: &CostQuery) -> Result<i64, ServiceError> {
        let stmt = total_cost_statement(query);
        debug!(sql = %stmt.sql, "total_cost_query");
        let row = self.db.query_one(stmt).await.map_err(db_err)?;
        let total = match row {
            Some(r) => r.try_get::<i64>("", "total_cost").map_err(db_err)?,
            None => 0,
        };
        Ok(total)
    }
}
