//! Menu catalog lookups
//!
//! The catalog itself (menu CRUD) is an external collaborator; the order
//! ledger only needs the narrow price/availability lookup, plus the insert
//! and availability helpers that seeding and tests use.

use super::{parse_money, RepoResult};
use rust_decimal::Decimal;
use sqlx::sqlite::Sqlite;
use sqlx::Executor;

/// Resolve the current catalog price of an available menu item.
///
/// Returns `None` when the item is unknown or flagged unavailable — callers
/// treat both the same way.
pub async fn resolve_price<'e, E>(executor: E, menu_item_id: i64) -> RepoResult<Option<Decimal>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<(String,)> =
        sqlx::query_as("SELECT price FROM menu_item WHERE id = ? AND is_available = 1")
            .bind(menu_item_id)
            .fetch_optional(executor)
            .await?;
    row.map(|(raw,)| parse_money(&raw)).transpose()
}

pub async fn insert<'e, E>(executor: E, name: &str, price: Decimal) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query("INSERT INTO menu_item (id, name, price, is_available, created_at) VALUES (?, ?, ?, 1, ?)")
        .bind(id)
        .bind(name)
        .bind(price.to_string())
        .bind(now)
        .execute(executor)
        .await?;
    Ok(id)
}

pub async fn set_available<'e, E>(executor: E, menu_item_id: i64, available: bool) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("UPDATE menu_item SET is_available = ? WHERE id = ?")
        .bind(available as i32)
        .bind(menu_item_id)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}
