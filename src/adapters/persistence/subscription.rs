use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgExecutor, Postgres};
use sqlx::{QueryBuilder, Row};

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{SubscriptionPatch, SubscriptionRepo},
    domain::entities::{
        month::Month,
        subscription::{NewSubscription, Subscription},
        subscription_filter::{FilterValue, SubscriptionFilter},
    },
};

fn row_to_subscription(row: sqlx::postgres::PgRow) -> Subscription {
    let start_date: NaiveDate = row.get("start_date");
    let end_date: Option<NaiveDate> = row.get("end_date");

    Subscription {
        id: row.get("id"),
        service_name: row.get("service_name"),
        user_id: row.get("user_id"),
        price: row.get("price"),
        start_date: Month::from_date(start_date),
        end_date: end_date.map(Month::from_date),
    }
}

const SELECT_COLS: &str = "id, user_id, price, start_date, end_date, service_name";

/// Appends the filter as ` WHERE .. AND ..`, binding every value.
/// Adds nothing for an empty filter.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &SubscriptionFilter) {
    for (i, clause) in filter.clauses().into_iter().enumerate() {
        builder
            .push(if i == 0 { " WHERE " } else { " AND " })
            .push(clause.column.as_str())
            .push(" ")
            .push(clause.op.as_sql())
            .push(" ");
        match clause.value {
            FilterValue::Uuid(id) => builder.push_bind(id),
            FilterValue::Text(text) => builder.push_bind(text),
            FilterValue::Month(month) => builder.push_bind(month.first_day()),
        };
    }
}

fn list_query(filter: &SubscriptionFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {SELECT_COLS} FROM subscriptions"));
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY id");
    builder
}

fn sum_query(filter: &SubscriptionFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT COALESCE(SUM(price), 0)::DOUBLE PRECISION FROM subscriptions",
    );
    push_filter(&mut builder, filter);
    builder
}

/// Overwrites every mutable column. Shared by plain updates and the
/// transactional patch path.
async fn write_subscription<'e, E>(executor: E, subscription: &Subscription) -> AppResult<()>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE subscriptions
        SET service_name = $2, user_id = $3, price = $4, start_date = $5, end_date = $6
        WHERE id = $1
        "#,
    )
    .bind(subscription.id)
    .bind(&subscription.service_name)
    .bind(subscription.user_id)
    .bind(subscription.price)
    .bind(subscription.start_date.first_day())
    .bind(subscription.end_date.map(|m| m.first_day()))
    .execute(executor)
    .await
    .map_err(AppError::from)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("subscription"));
    }
    Ok(())
}

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn create(&self, subscription: &NewSubscription) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO subscriptions (user_id, price, start_date, end_date, service_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(subscription.user_id)
        .bind(subscription.price)
        .bind(subscription.start_date.first_day())
        .bind(subscription.end_date.map(|m| m.first_day()))
        .bind(&subscription.service_name)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Subscription> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        row.map(row_to_subscription)
            .ok_or(AppError::NotFound("subscription"))
    }

    async fn get_by_filters(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        let mut builder = list_query(filter);
        tracing::debug!(sql = builder.sql(), "Listing subscriptions");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_subscription).collect())
    }

    async fn update(&self, subscription: &Subscription) -> AppResult<()> {
        write_subscription(&self.pool, subscription).await
    }

    async fn patch(&self, id: i64, patch: &SubscriptionPatch) -> AppResult<Subscription> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        // Row lock keeps a concurrent update or delete from slipping in
        // between the read and the write.
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1 FOR UPDATE",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let mut subscription = row
            .map(row_to_subscription)
            .ok_or(AppError::NotFound("subscription"))?;
        patch.apply_to(&mut subscription)?;

        write_subscription(&mut *tx, &subscription).await?;
        tx.commit().await.map_err(AppError::from)?;

        Ok(subscription)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("subscription"));
        }
        Ok(())
    }

    async fn get_sum(&self, filter: &SubscriptionFilter) -> AppResult<f64> {
        let mut builder = sum_query(filter);
        tracing::debug!(sql = builder.sql(), "Summing subscription prices");

        let sum: f64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(sum)
    }
}
