use crate::db::connect;
use crate::subscription::{self, Entity as SubscriptionEntity};
use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set};
use uuid::Uuid;

/// Setup test database with migrations; `None` when no database is configured.
async fn setup_test_db() -> Result<Option<DatabaseConnection>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Some(db))
}

fn first_of(year: i32, month: u32) -> sea_orm::prelude::Date {
    sea_orm::prelude::Date::from_ymd_opt(year, month, 1).unwrap()
}

/// Test subscription CRUD operations on the raw entity
#[tokio::test]
async fn test_subscription_entity_crud() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()); };

    let user_id = Uuid::new_v4();
    let am = subscription::ActiveModel {
        id: NotSet,
        service_name: Set("Yandex Plus".to_string()),
        price: Set(400),
        user_id: Set(user_id),
        start_date: Set(first_of(2025, 7)),
        end_date: Set(None),
    };
    let created = am.insert(&db).await?;
    assert!(created.id > 0);
    assert_eq!(created.start_month().to_string(), "07-2025");

    // Read
    let found = SubscriptionEntity::find_by_id(created.id).one(&db).await?;
    assert_eq!(found.as_ref(), Some(&created));

    // Find by owner
    let by_user = SubscriptionEntity::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .all(&db)
        .await?;
    assert_eq!(by_user.len(), 1);

    // Update
    let mut am: subscription::ActiveModel = created.clone().into();
    am.end_date = Set(Some(first_of(2025, 12)));
    let updated = am.update(&db).await?;
    assert_eq!(updated.end_month().map(|m| m.to_string()), Some("12-2025".to_string()));

    // Delete
    let res = SubscriptionEntity::delete_by_id(created.id).exec(&db).await?;
    assert_eq!(res.rows_affected, 1);
    assert!(SubscriptionEntity::find_by_id(created.id).one(&db).await?.is_none());
    Ok(())
}

/// Negative prices are rejected by the column check even when validation is bypassed
#[tokio::test]
async fn test_price_check_constraint() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()); };

    let am = subscription::ActiveModel {
        id: NotSet,
        service_name: Set("Broken".to_string()),
        price: Set(-5),
        user_id: Set(Uuid::new_v4()),
        start_date: Set(first_of(2025, 1)),
        end_date: Set(None),
    };
    assert!(am.insert(&db).await.is_err());
    Ok(())
}
