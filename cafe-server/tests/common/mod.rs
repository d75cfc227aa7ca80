//! Shared test harness: temp-dir database, seeded menu, staged orders.

#![allow(dead_code)]

use cafe_server::db::repository::{menu, order};
use cafe_server::{Config, ServerState};
use rust_decimal::Decimal;
use shared::models::{CreateOrderRequest, OrderItemInput, OrderStatus};
use tempfile::TempDir;

pub struct TestEnv {
    pub state: ServerState,
    // Dropping the TempDir deletes the database with it
    _work_dir: TempDir,
}

/// Fresh server state backed by a throwaway SQLite file.
pub async fn test_state() -> TestEnv {
    let work_dir = tempfile::tempdir().expect("create temp dir");
    let db_path = work_dir.path().join("cafetime-test.db");
    let config = Config::with_overrides(
        work_dir.path().to_str().unwrap(),
        db_path.to_str().unwrap(),
        0,
    );
    let state = ServerState::initialize(&config)
        .await
        .expect("initialize server state");
    TestEnv {
        state,
        _work_dir: work_dir,
    }
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Seed catalog items, returning their ids in input order.
pub async fn seed_menu(state: &ServerState, items: &[(&str, &str)]) -> Vec<i64> {
    let mut ids = Vec::with_capacity(items.len());
    for (name, price) in items {
        let id = menu::insert(&state.db.pool, name, dec(price))
            .await
            .expect("seed menu item");
        ids.push(id);
    }
    ids
}

pub fn order_request(employee_id: i64, items: &[(i64, i32)]) -> CreateOrderRequest {
    CreateOrderRequest {
        order_type: "DineIn".into(),
        employee_id,
        items: items
            .iter()
            .map(|&(menu_item_id, quantity)| OrderItemInput {
                menu_item_id,
                quantity,
            })
            .collect(),
    }
}

/// Create an order and move it to `Ready` so it can be billed.
pub async fn stage_ready_order(state: &ServerState, items: &[(i64, i32)]) -> i64 {
    let summary = state
        .orders
        .create_order(&order_request(1, items))
        .await
        .expect("create order");
    order::set_status(&state.db.pool, summary.order_id, OrderStatus::Ready)
        .await
        .expect("stage order as Ready");
    summary.order_id
}

pub async fn count_rows(state: &ServerState, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&state.db.pool)
        .await
        .expect("count rows")
}
