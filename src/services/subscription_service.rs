use crate::entities::subscription_entity as subscriptions;
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct SubscriptionService {
    pool: Arc<DatabaseConnection>,
}

#[derive(Debug, FromQueryResult)]
struct CostRow {
    total_cost: Option<i64>,
    count: i64,
}

/// Escapes LIKE wildcards and wraps the needle for a substring match.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// One conjunct per present field. Absent fields add nothing.
pub fn list_condition(filter: &SubscriptionFilter) -> Condition {
    let mut cond = Condition::all();

    if let Some(user_id) = filter.user_id {
        cond = cond.add(subscriptions::Column::UserId.eq(user_id));
    }

    if let Some(name) = &filter.service_name {
        cond = cond.add(
            Expr::expr(Func::lower(Expr::col(subscriptions::Column::ServiceName)))
                .like(contains_pattern(name)),
        );
    }

    if let Some(start) = filter.start_date {
        cond = cond.add(subscriptions::Column::StartDate.gte(start.first_day()));
    }

    // the upper bound only constrains subscriptions that have ended
    if let Some(end) = filter.end_date {
        cond = cond.add(
            Condition::any()
                .add(subscriptions::Column::EndDate.lte(end.first_day()))
                .add(subscriptions::Column::EndDate.is_null()),
        );
    }

    cond
}

/// Overlap of `[start_date, end_date]` with the window, plus exact-match filters.
pub fn total_cost_condition(window: &TotalCostWindow) -> Condition {
    let mut cond = Condition::all()
        .add(subscriptions::Column::StartDate.lte(window.end.first_day()))
        .add(
            Condition::any()
                .add(subscriptions::Column::EndDate.is_null())
                .add(subscriptions::Column::EndDate.gte(window.start.first_day())),
        );

    if let Some(user_id) = window.filter.user_id {
        cond = cond.add(subscriptions::Column::UserId.eq(user_id));
    }

    if let Some(name) = &window.filter.service_name {
        cond = cond.add(subscriptions::Column::ServiceName.eq(name.as_str()));
    }

    cond
}

pub fn list_query(filter: &SubscriptionFilter) -> Select<subscriptions::Entity> {
    subscriptions::Entity::find()
        .filter(list_condition(filter))
        .order_by_desc(subscriptions::Column::CreatedAt)
}

pub fn total_cost_query(window: &TotalCostWindow) -> Select<subscriptions::Entity> {
    subscriptions::Entity::find()
        .select_only()
        .column_as(Expr::col(subscriptions::Column::Price).sum(), "total_cost")
        .column_as(Expr::col(subscriptions::Column::Id).count(), "count")
        .filter(total_cost_condition(window))
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[cfg(test)]
    fn into_connection(self) -> DatabaseConnection {
        Arc::try_unwrap(self.pool).unwrap_or_else(|_| panic!("connection is still shared"))
    }

    /// Persists a validated subscription under a fresh id. `created_at` and
    /// `updated_at` carry the same instant.
    pub async fn create(&self, new: NewSubscription) -> AppResult<subscriptions::Model> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        log::info!(
            "Creating subscription {id} for user {} ({})",
            new.user_id,
            new.service_name
        );

        let model = subscriptions::ActiveModel {
            id: Set(id),
            service_name: Set(new.service_name),
            price: Set(new.price),
            user_id: Set(new.user_id),
            start_date: Set(new.start_date.first_day()),
            end_date: Set(new.end_date.map(|m| m.first_day())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.pool.as_ref())
        .await
        .inspect_err(|e| log::error!("create subscription {id} failed: {e}"))?;

        Ok(model)
    }

    /// `Ok(None)` when no row has this id.
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<subscriptions::Model>> {
        log::info!("Fetching subscription {id}");

        let found = subscriptions::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await
            .inspect_err(|e| log::error!("get subscription {id} failed: {e}"))?;

        if found.is_none() {
            log::warn!("Subscription {id} not found");
        }
        Ok(found)
    }

    /// Newest first by `created_at`.
    pub async fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<subscriptions::Model>> {
        log::info!("Listing subscriptions with filter {filter:?}");

        let rows = list_query(filter)
            .all(self.pool.as_ref())
            .await
            .inspect_err(|e| log::error!("list subscriptions failed: {e}"))?;

        log::info!("Fetched {} subscriptions", rows.len());
        Ok(rows)
    }

    /// Overwrites only the supplied fields and bumps `updated_at` in the same
    /// statement. Empty changes succeed without touching the row.
    pub async fn update(&self, id: Uuid, changes: SubscriptionChanges) -> AppResult<()> {
        if changes.is_empty() {
            log::debug!("No fields to update for subscription {id}");
            return Ok(());
        }

        log::info!("Updating subscription {id}");

        let mut update = subscriptions::Entity::update_many()
            .col_expr(subscriptions::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(name) = changes.service_name {
            update = update.col_expr(subscriptions::Column::ServiceName, Expr::value(name));
        }
        if let Some(price) = changes.price {
            update = update.col_expr(subscriptions::Column::Price, Expr::value(price));
        }
        if let Some(end) = changes.end_date {
            update = update.col_expr(subscriptions::Column::EndDate, Expr::value(end.first_day()));
        }

        let result = update
            .filter(subscriptions::Column::Id.eq(id))
            .exec(self.pool.as_ref())
            .await
            .inspect_err(|e| log::error!("update subscription {id} failed: {e}"))?;

        if result.rows_affected == 0 {
            log::warn!("Subscription {id} not found for update");
            return Err(AppError::NotFound("subscription not found".to_string()));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        log::info!("Deleting subscription {id}");

        let result = subscriptions::Entity::delete_by_id(id)
            .exec(self.pool.as_ref())
            .await
            .inspect_err(|e| log::error!("delete subscription {id} failed: {e}"))?;

        if result.rows_affected == 0 {
            log::warn!("Subscription {id} not found for deletion");
            return Err(AppError::NotFound("subscription not found".to_string()));
        }
        Ok(())
    }

    /// Returns `(sum of price, number of rows)`; `(0, 0)` when nothing overlaps.
    pub async fn total_cost(&self, window: &TotalCostWindow) -> AppResult<(i64, i64)> {
        log::info!(
            "Calculating total cost for {}..{} with filter {:?}",
            window.start,
            window.end,
            window.filter
        );

        let row = total_cost_query(window)
            .into_model::<CostRow>()
            .one(self.pool.as_ref())
            .await
            .inspect_err(|e| log::error!("total cost calculation failed: {e}"))?;

        let (total, count) = row
            .map(|r| (r.total_cost.unwrap_or(0), r.count))
            .unwrap_or((0, 0));

        log::info!("Total cost {total} over {count} subscriptions");
        Ok((total, count))
    }
}
