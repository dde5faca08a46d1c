use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use techphone_core::{generate_order_number, validation, OrderStatus, PaymentStatus};
use techphone_db::{NewOrder, NewOrderItem, OrderFilters, OrderItemRow, OrderRow, OrderUpdate};

use super::{
    map_db_error, normalize_limit, normalize_page, page_offset, ApiError, ApiResponse, AppState,
    Pagination,
};

#[derive(Debug, Serialize)]
pub(super) struct OrderData {
    id: i64,
    order_number: String,
    user_id: Option<Uuid>,
    total_amount: Decimal,
    shipping_fee: Decimal,
    status: String,
    payment_status: String,
    payment_method: Option<String>,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    customer_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for OrderData {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            total_amount: row.total_amount,
            shipping_fee: row.shipping_fee,
            status: row.status,
            payment_status: row.payment_status,
            payment_method: row.payment_method,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            customer_address: row.customer_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct OrderItemData {
    id: i64,
    product_id: i64,
    quantity: i32,
    price: Decimal,
}

impl From<OrderItemRow> for OrderItemData {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

/// Order detail: the order plus its line items.
#[derive(Debug, Serialize)]
pub(super) struct OrderDetail {
    #[serde(flatten)]
    order: OrderData,
    items: Vec<OrderItemData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateOrderItemBody {
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateOrderBody {
    pub user_id: Option<Uuid>,
    pub items: Vec<CreateOrderItemBody>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub shipping_fee: Decimal,
    pub payment_method: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
}

/// `POST /api/orders` — guest checkout; no account required.
///
/// Totals are accepted as submitted and stock is not decremented, matching
/// the storefront's checkout contract.
pub(super) async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderBody>,
) -> Result<Json<ApiResponse<OrderDetail>>, ApiError> {
    validation::validate_required(&body.customer_name, "họ tên")?;
    validation::validate_email(&body.customer_email)?;
    validation::validate_phone(&body.customer_phone)?;
    validation::validate_required(&body.customer_address, "địa chỉ")?;

    if body.items.is_empty() {
        return Err(ApiError::validation("Đơn hàng phải có ít nhất một sản phẩm"));
    }
    for item in &body.items {
        if item.quantity <= 0 {
            return Err(ApiError::validation("Số lượng phải lớn hơn 0"));
        }
        if item.price < Decimal::ZERO {
            return Err(ApiError::validation("Giá trị không được âm"));
        }
    }
    if body.total_amount < Decimal::ZERO || body.shipping_fee < Decimal::ZERO {
        return Err(ApiError::validation("Giá trị không được âm"));
    }

    let new_order = NewOrder {
        order_number: generate_order_number(),
        user_id: body.user_id,
        total_amount: body.total_amount,
        shipping_fee: body.shipping_fee,
        payment_method: body.payment_method,
        customer_name: body.customer_name.trim().to_string(),
        customer_email: body.customer_email.trim().to_string(),
        customer_phone: body.customer_phone.trim().to_string(),
        customer_address: body.customer_address.trim().to_string(),
        items: body
            .items
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect(),
    };

    let row = techphone_db::create_order(&state.pool, &new_order)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                // 32^6 order-number suffixes per day; collisions are rare
                // enough that the client just retries.
                ApiError::conflict("order number collision, please retry")
            } else {
                map_db_error(&e)
            }
        })?;

    let items = techphone_db::list_order_items(&state.pool, row.id)
        .await
        .map_err(|e| map_db_error(&e))?;

    state.cache.invalidate_all().await;
    Ok(Json(ApiResponse::new(OrderDetail {
        order: OrderData::from(row),
        items: items.into_iter().map(OrderItemData::from).collect(),
    })))
}

#[derive(Debug, Deserialize)]
pub(super) struct OrderListQuery {
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// `GET /api/orders` — paginated listing, newest first.
pub(super) async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<Vec<OrderData>>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(parse_order_status)
        .transpose()?
        .map(|s| s.to_string());

    let limit = normalize_limit(query.limit);
    let page = normalize_page(query.page);
    let filters = OrderFilters {
        user_id: query.user_id,
        status,
        limit,
        offset: page_offset(page, limit),
    };

    let (rows, total) = techphone_db::list_orders(&state.pool, &filters)
        .await
        .map_err(|e| map_db_error(&e))?;
    let data: Vec<OrderData> = rows.into_iter().map(OrderData::from).collect();

    Ok(Json(ApiResponse::with_pagination(
        data,
        total,
        Pagination::new(page, limit, total),
    )))
}

/// `GET /api/orders/{id}` — order with its line items.
pub(super) async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderDetail>>, ApiError> {
    let row = techphone_db::get_order(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("order not found"))?;

    let items = techphone_db::list_order_items(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(ApiResponse::new(OrderDetail {
        order: OrderData::from(row),
        items: items.into_iter().map(OrderItemData::from).collect(),
    })))
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct UpdateOrderBody {
    pub payment_method: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
}

/// `PUT /api/orders/{id}` — sparse update of customer/payment fields.
pub(super) async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateOrderBody>,
) -> Result<Json<ApiResponse<OrderData>>, ApiError> {
    if let Some(ref email) = body.customer_email {
        validation::validate_email(email)?;
    }
    if let Some(ref phone) = body.customer_phone {
        validation::validate_phone(phone)?;
    }
    if let Some(ref name) = body.customer_name {
        validation::validate_required(name, "họ tên")?;
    }

    let update = OrderUpdate {
        payment_method: body.payment_method,
        customer_name: body.customer_name,
        customer_email: body.customer_email,
        customer_phone: body.customer_phone,
        customer_address: body.customer_address,
    };

    let row = techphone_db::update_order(&state.pool, id, &update)
        .await
        .map_err(|e| map_db_error(&e))?;

    state.cache.invalidate_all().await;
    Ok(Json(ApiResponse::new(OrderData::from(row))))
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateOrderStatusBody {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

/// `PUT /api/orders/{id}/status` — fulfilment and payment status transitions.
///
/// Both values are validated against the status vocabulary before touching
/// the database; unknown values are a 400, never a CHECK violation.
pub(super) async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateOrderStatusBody>,
) -> Result<Json<ApiResponse<OrderData>>, ApiError> {
    if body.status.is_none() && body.payment_status.is_none() {
        return Err(ApiError::validation(
            "Vui lòng nhập trạng thái cần cập nhật",
        ));
    }

    let status = body
        .status
        .as_deref()
        .map(parse_order_status)
        .transpose()?
        .map(|s| s.to_string());
    let payment_status = body
        .payment_status
        .as_deref()
        .map(parse_payment_status)
        .transpose()?
        .map(|s| s.to_string());

    let row = techphone_db::update_order_status(
        &state.pool,
        id,
        status.as_deref(),
        payment_status.as_deref(),
    )
    .await
    .map_err(|e| map_db_error(&e))?;

    state.cache.invalidate_all().await;
    Ok(Json(ApiResponse::new(OrderData::from(row))))
}

#[derive(Debug, Serialize)]
pub(super) struct UserOrderStatsData {
    total_orders: i64,
    total_spent: Decimal,
    pending: i64,
    processing: i64,
    completed: i64,
    cancelled: i64,
    delivered: i64,
}

/// `GET /api/orders/stats/{user_id}` — per-user order aggregates.
pub(super) async fn order_stats(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserOrderStatsData>>, ApiError> {
    let stats = techphone_db::user_order_stats(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(ApiResponse::new(UserOrderStatsData {
        total_orders: stats.total_orders,
        total_spent: stats.total_spent,
        pending: stats.pending,
        processing: stats.processing,
        completed: stats.completed,
        cancelled: stats.cancelled,
        delivered: stats.delivered,
    })))
}

fn parse_order_status(s: &str) -> Result<OrderStatus, ApiError> {
    s.parse()
        .map_err(|_| ApiError::validation(format!("unknown order status: {s}")))
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus, ApiError> {
    s.parse()
        .map_err(|_| ApiError::validation(format!("unknown payment status: {s}")))
}
