//! Order Repository
//!
//! Orders plus their line items. Status strings follow
//! [`shared::models::OrderStatus`]; unit prices are TEXT decimals captured
//! at order time.

use super::{parse_money, RepoResult};
use rust_decimal::Decimal;
use shared::models::OrderStatus;
use sqlx::sqlite::Sqlite;
use sqlx::Executor;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub order_type: String,
    pub employee_id: i64,
    pub status: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRow {
    pub menu_item_id: i64,
    pub quantity: i64,
    pub unit_price: String,
}

impl OrderItemRow {
    /// quantity × captured unit price, exact.
    pub fn line_total(&self) -> RepoResult<Decimal> {
        Ok(parse_money(&self.unit_price)? * Decimal::from(self.quantity))
    }
}

pub async fn insert_order<'e, E>(
    executor: E,
    id: i64,
    order_type: &str,
    employee_id: i64,
    status: OrderStatus,
) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO orders (id, order_type, employee_id, status, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(order_type)
    .bind(employee_id)
    .bind(status.as_str())
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_item<'e, E>(
    executor: E,
    order_id: i64,
    menu_item_id: i64,
    quantity: i32,
    unit_price: Decimal,
) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO order_item (id, order_id, menu_item_id, quantity, unit_price) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(order_id)
    .bind(menu_item_id)
    .bind(quantity)
    .bind(unit_price.to_string())
    .execute(executor)
    .await?;
    Ok(())
}

/// No-op write against an order row. Returns whether the order exists.
///
/// SQLite 的 deferred 事务在首个语句处取快照；事务若先读后写，升级
/// 写锁时可能撞上 BUSY_SNAPSHOT 且不受 busy_timeout 保护。写事务的
/// 第一条语句必须是写，这个空更新就是为此准备的。
pub async fn touch<'e, E>(executor: E, order_id: i64) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("UPDATE orders SET status = status WHERE id = ?")
        .bind(order_id)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn find_by_id<'e, E>(executor: E, order_id: i64) -> RepoResult<Option<OrderRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, order_type, employee_id, status, created_at FROM orders WHERE id = ?",
    )
    .bind(order_id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

pub async fn list_items<'e, E>(executor: E, order_id: i64) -> RepoResult<Vec<OrderItemRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT menu_item_id, quantity, unit_price FROM order_item WHERE order_id = ? ORDER BY id ASC",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

/// Status transition. The billing engine moves orders to `Completed`;
/// `Ready`/`Cancelled` transitions belong to external collaborators
/// (integration tests use this to stage billable orders).
pub async fn set_status<'e, E>(executor: E, order_id: i64, status: OrderStatus) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(order_id)
        .execute(executor)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(super::RepoError::NotFound(format!(
            "Order {order_id} not found"
        )));
    }
    Ok(())
}
