//! Database operations for `orders` and `order_items`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub shipping_fee: Decimal,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `order_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, total_amount, shipping_fee, status, \
     payment_status, payment_method, customer_name, customer_email, customer_phone, \
     customer_address, created_at, updated_at";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub shipping_fee: Decimal,
    pub payment_method: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<NewOrderItem>,
}

/// Optional filters for an order listing.
#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Sparse update of customer/payment fields; `Some(v)` sets, `None` keeps.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub payment_method: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
}

/// Per-user order aggregates for the account dashboard.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserOrderStats {
    pub total_orders: i64,
    pub total_spent: Decimal,
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub delivered: i64,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Insert an order and all of its items in a single transaction.
///
/// Totals are stored exactly as submitted — the storefront computes them
/// client-side and this layer does not recompute or verify them, nor does it
/// decrement product stock. Returns the inserted order row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails (including an
/// order-number unique violation); the whole order rolls back.
pub async fn create_order(pool: &PgPool, order: &NewOrder) -> Result<OrderRow, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "INSERT INTO orders \
           (order_number, user_id, total_amount, shipping_fee, payment_method, \
            customer_name, customer_email, customer_phone, customer_address) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(&order.order_number)
    .bind(order.user_id)
    .bind(order.total_amount)
    .bind(order.shipping_fee)
    .bind(&order.payment_method)
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(&order.customer_phone)
    .bind(&order.customer_address)
    .fetch_one(&mut *tx)
    .await?;

    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, price) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(row.id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(row)
}

/// List orders matching `filters`, newest first, plus the total match count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_orders(
    pool: &PgPool,
    filters: &OrderFilters,
) -> Result<(Vec<OrderRow>, i64), DbError> {
    fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filters: &OrderFilters) {
        let mut sep = " WHERE ";
        if let Some(user_id) = filters.user_id {
            qb.push(sep).push("user_id = ").push_bind(user_id);
            sep = " AND ";
        }
        if let Some(ref status) = filters.status {
            qb.push(sep).push("status = ").push_bind(status.clone());
        }
    }

    let mut qb = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
    push_where(&mut qb, filters);
    qb.push(" ORDER BY created_at DESC, id DESC");
    qb.push(" LIMIT ").push_bind(filters.limit);
    qb.push(" OFFSET ").push_bind(filters.offset);

    let rows = qb.build_query_as::<OrderRow>().fetch_all(pool).await?;

    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_where(&mut count_qb, filters);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    Ok((rows, total))
}

/// Fetch a single order by id, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_order(pool: &PgPool, id: i64) -> Result<Option<OrderRow>, DbError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// List the line items of an order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_order_items(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItemRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, order_id, product_id, quantity, price \
         FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Overlay `update` onto an order's customer/payment fields.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no order has that id, or
/// [`DbError::Sqlx`] on query failure.
pub async fn update_order(
    pool: &PgPool,
    id: i64,
    update: &OrderUpdate,
) -> Result<OrderRow, DbError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "UPDATE orders SET \
             payment_method   = COALESCE($2, payment_method), \
             customer_name    = COALESCE($3, customer_name), \
             customer_email   = COALESCE($4, customer_email), \
             customer_phone   = COALESCE($5, customer_phone), \
             customer_address = COALESCE($6, customer_address), \
             updated_at       = NOW() \
         WHERE id = $1 \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(id)
    .bind(&update.payment_method)
    .bind(&update.customer_name)
    .bind(&update.customer_email)
    .bind(&update.customer_phone)
    .bind(&update.customer_address)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Set an order's fulfilment status and/or payment status.
///
/// Values are validated against the status vocabulary by the caller; the
/// CHECK constraints are the backstop.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no order has that id, or
/// [`DbError::Sqlx`] on query failure.
pub async fn update_order_status(
    pool: &PgPool,
    id: i64,
    status: Option<&str>,
    payment_status: Option<&str>,
) -> Result<OrderRow, DbError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "UPDATE orders SET \
             status         = COALESCE($2, status), \
             payment_status = COALESCE($3, payment_status), \
             updated_at     = NOW() \
         WHERE id = $1 \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .bind(payment_status)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Aggregate a user's order history in one statement.
///
/// `total_spent` sums completed and delivered orders only.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn user_order_stats(pool: &PgPool, user_id: Uuid) -> Result<UserOrderStats, DbError> {
    let row = sqlx::query_as::<_, UserOrderStats>(
        "SELECT \
             COUNT(*) AS total_orders, \
             COALESCE(SUM(total_amount) FILTER (WHERE status IN ('completed', 'delivered')), 0) \
                 AS total_spent, \
             COUNT(*) FILTER (WHERE status = 'pending')    AS pending, \
             COUNT(*) FILTER (WHERE status = 'processing') AS processing, \
             COUNT(*) FILTER (WHERE status = 'completed')  AS completed, \
             COUNT(*) FILTER (WHERE status = 'cancelled')  AS cancelled, \
             COUNT(*) FILTER (WHERE status = 'delivered')  AS delivered \
         FROM orders WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
