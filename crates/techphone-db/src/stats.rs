//! Dashboard aggregates.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

/// Storefront-wide counters for the admin dashboard.
///
/// Serialized directly into the `/api/admin/stats` response, so field names
/// are part of the wire contract.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardStats {
    pub active_products: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub processing_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    pub delivered_orders: i64,
    pub revenue: Decimal,
    pub total_profiles: i64,
}

/// Compute all dashboard counters in one statement.
///
/// Revenue sums `total_amount` over completed and delivered orders.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn dashboard_stats(pool: &PgPool) -> Result<DashboardStats, DbError> {
    let row = sqlx::query_as::<_, DashboardStats>(
        "SELECT \
             (SELECT COUNT(*) FROM products WHERE deleted_at IS NULL AND status = 'active') \
                 AS active_products, \
             (SELECT COUNT(*) FROM orders) AS total_orders, \
             (SELECT COUNT(*) FROM orders WHERE status = 'pending')    AS pending_orders, \
             (SELECT COUNT(*) FROM orders WHERE status = 'processing') AS processing_orders, \
             (SELECT COUNT(*) FROM orders WHERE status = 'completed')  AS completed_orders, \
             (SELECT COUNT(*) FROM orders WHERE status = 'cancelled')  AS cancelled_orders, \
             (SELECT COUNT(*) FROM orders WHERE status = 'delivered')  AS delivered_orders, \
             (SELECT COALESCE(SUM(total_amount), 0) FROM orders \
                 WHERE status IN ('completed', 'delivered')) AS revenue, \
             (SELECT COUNT(*) FROM profiles) AS total_profiles",
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}
