//! 订单台账
//!
//! CREATE_ORDER / GET_ORDER_TOTAL 的领域逻辑。下单是全有或全无：
//! 任意一个行项目解析失败，整张订单连同已写入的行项目一起回滚。
//! 单价在下单时从菜单快照，之后菜单改价不影响已建订单。

use rust_decimal::Decimal;
use shared::models::{CreateOrderRequest, OrderStatus, OrderSummary};
use sqlx::SqlitePool;

use crate::core::{AppError, AppResult};
use crate::db::repository::{menu, order};

pub struct OrderLedger {
    pool: SqlitePool,
}

impl OrderLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an order with all its line items in one transaction.
    ///
    /// Prices are resolved server-side from the catalog; any unknown or
    /// unavailable item aborts the whole order.
    pub async fn create_order(&self, req: &CreateOrderRequest) -> AppResult<OrderSummary> {
        if req.items.is_empty() {
            return Err(AppError::InvalidItem(
                "Order must contain at least one item".into(),
            ));
        }
        for item in &req.items {
            if item.quantity <= 0 {
                return Err(AppError::InvalidItem(format!(
                    "Quantity for menu item {} must be positive",
                    item.menu_item_id
                )));
            }
        }

        let mut tx = self.pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        let order_id = shared::util::snowflake_id();
        order::insert_order(
            &mut *tx,
            order_id,
            &req.order_type,
            req.employee_id,
            OrderStatus::Pending,
        )
        .await?;

        let mut total = Decimal::ZERO;
        let mut item_count: i64 = 0;
        for item in &req.items {
            // 未找到或已下架都视为无效项；事务随 tx 析构回滚
            let Some(unit_price) = menu::resolve_price(&mut *tx, item.menu_item_id).await? else {
                return Err(AppError::InvalidItem(format!(
                    "Menu item {} not found or unavailable",
                    item.menu_item_id
                )));
            };
            order::insert_item(&mut *tx, order_id, item.menu_item_id, item.quantity, unit_price)
                .await?;
            total += unit_price * Decimal::from(item.quantity);
            item_count += 1;
        }

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(order_id, %total, item_count, "Order created");

        Ok(OrderSummary {
            order_id,
            total,
            item_count,
            status: OrderStatus::Pending,
        })
    }

    /// Recompute an order's total from its captured line items.
    pub async fn get_order_total(&self, order_id: i64) -> AppResult<OrderSummary> {
        let Some(row) = order::find_by_id(&self.pool, order_id).await? else {
            return Err(AppError::NotFound(format!("Order {order_id} not found")));
        };

        let items = order::list_items(&self.pool, order_id).await?;
        if items.is_empty() {
            // 没有行项目的订单号视同不存在
            return Err(AppError::NotFound(format!("Order {order_id} not found")));
        }

        let mut total = Decimal::ZERO;
        for item in &items {
            total += item.line_total()?;
        }

        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e: String| AppError::database(e))?;

        Ok(OrderSummary {
            order_id,
            total,
            item_count: items.len() as i64,
            status,
        })
    }
}
