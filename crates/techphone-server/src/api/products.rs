use axum::{
    extract::{Path, Query, RawQuery, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use techphone_core::{expand_category_variants, validation};
use techphone_db::{NewProduct, ProductFilters, ProductRow, ProductSort, ProductUpdate, SortOrder};

use super::{
    map_db_error, normalize_limit, normalize_page, page_offset, ApiError, ApiResponse, AppState,
    Pagination,
};

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    id: i64,
    name: String,
    description: Option<String>,
    price: Decimal,
    category: String,
    brand: Option<String>,
    stock: i32,
    image: Option<String>,
    discount: i32,
    featured: bool,
    condition: String,
    rating: Option<Decimal>,
    is_sale: bool,
    is_trending: bool,
    is_best_seller: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductItem {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            brand: row.brand,
            stock: row.stock,
            image: row.image,
            discount: row.discount,
            featured: row.featured,
            condition: row.condition,
            rating: row.rating,
            is_sale: row.is_sale,
            is_trending: row.is_trending,
            is_best_seller: row.is_best_seller,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductListQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub condition: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub is_sale: Option<bool>,
    pub is_trending: Option<bool>,
    pub is_best_seller: Option<bool>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub rating_min: Option<Decimal>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn build_filters(query: &ProductListQuery, limit: i64, page: i64) -> ProductFilters {
    ProductFilters {
        categories: query
            .category
            .as_deref()
            .map(expand_category_variants)
            .unwrap_or_default(),
        brand: query.brand.clone(),
        condition: query.condition.clone(),
        status: query.status.clone(),
        featured: query.featured.unwrap_or(false),
        is_sale: query.is_sale.unwrap_or(false),
        is_trending: query.is_trending.unwrap_or(false),
        is_best_seller: query.is_best_seller.unwrap_or(false),
        price_min: query.price_min,
        price_max: query.price_max,
        rating_min: query.rating_min,
        keyword: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned),
        include_deleted: false,
        sort: query.sort.as_deref().and_then(ProductSort::parse),
        order: query.order.as_deref().map(|o| {
            if o.eq_ignore_ascii_case("asc") {
                SortOrder::Asc
            } else {
                SortOrder::Desc
            }
        }),
        limit,
        offset: page_offset(page, limit),
    }
}

/// `GET /api/products` — filtered, paginated listing.
///
/// Responses are cached keyed by the raw query string; identical concurrent
/// requests share a single database round trip.
pub(super) async fn list_products(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cache_key = format!("products:{}", raw.unwrap_or_default());
    let value = state
        .cache
        .get_or_fetch(&cache_key, || async {
            let limit = normalize_limit(query.limit);
            let page = normalize_page(query.page);
            let filters = build_filters(&query, limit, page);

            let (rows, total) = techphone_db::list_products(&state.pool, &filters)
                .await
                .map_err(|e| map_db_error(&e))?;
            let data: Vec<ProductItem> = rows.into_iter().map(ProductItem::from).collect();

            encode(ApiResponse::with_pagination(
                data,
                total,
                Pagination::new(page, limit, total),
            ))
        })
        .await?;
    Ok(Json(value))
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

/// `GET /api/products/search` — keyword search over name/description/brand.
pub(super) async fn search_products(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    Query(query): Query<SearchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let keyword = query.q.as_deref().map(str::trim).unwrap_or_default();
    validation::validate_required(keyword, "từ khóa tìm kiếm")?;
    let keyword = keyword.to_owned();

    let cache_key = format!("products:search:{}", raw.unwrap_or_default());
    let value = state
        .cache
        .get_or_fetch(&cache_key, || async {
            let limit = normalize_limit(query.limit);
            let rows = techphone_db::search_products(&state.pool, &keyword, limit)
                .await
                .map_err(|e| map_db_error(&e))?;
            let data: Vec<ProductItem> = rows.into_iter().map(ProductItem::from).collect();
            let count = i64::try_from(data.len()).unwrap_or(i64::MAX);

            encode(ApiResponse {
                data,
                count: Some(count),
                pagination: None,
            })
        })
        .await?;
    Ok(Json(value))
}

/// `GET /api/products/{id}` — single product; soft-deleted rows read as absent.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProductItem>>, ApiError> {
    let row = techphone_db::get_product(&state.pool, id, false)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("product not found"))?;
    Ok(Json(ApiResponse::new(ProductItem::from(row))))
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateProductBody {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub brand: Option<String>,
    #[serde(default)]
    pub stock: i32,
    pub image: Option<String>,
    #[serde(default)]
    pub discount: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_condition")]
    pub condition: String,
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub is_sale: bool,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_best_seller: bool,
}

fn default_condition() -> String {
    "new".to_string()
}

fn validate_product_fields(
    price: Decimal,
    stock: i32,
    discount: i32,
    rating: Option<Decimal>,
) -> Result<(), ApiError> {
    if price < Decimal::ZERO {
        return Err(ApiError::validation("Giá trị không được âm"));
    }
    if stock < 0 {
        return Err(ApiError::validation("Tồn kho không được âm"));
    }
    if !(0..=100).contains(&discount) {
        return Err(ApiError::validation("Giảm giá phải nằm trong khoảng 0-100"));
    }
    if let Some(rating) = rating {
        if rating < Decimal::ZERO || rating > Decimal::from(5) {
            return Err(ApiError::validation("Đánh giá phải nằm trong khoảng 0-5"));
        }
    }
    Ok(())
}

/// `POST /api/products` — create a product (management surface).
pub(super) async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProductBody>,
) -> Result<Json<ApiResponse<ProductItem>>, ApiError> {
    validation::validate_required(&body.name, "tên sản phẩm")?;
    validation::validate_required(&body.category, "danh mục")?;
    validate_product_fields(body.price, body.stock, body.discount, body.rating)?;

    let new_product = NewProduct {
        name: body.name.trim().to_string(),
        description: body.description,
        price: body.price,
        category: body.category,
        brand: body.brand,
        stock: body.stock,
        image: body.image,
        discount: body.discount,
        featured: body.featured,
        condition: body.condition,
        rating: body.rating,
        is_sale: body.is_sale,
        is_trending: body.is_trending,
        is_best_seller: body.is_best_seller,
    };

    let row = techphone_db::create_product(&state.pool, &new_product)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::conflict("a product with this name already exists")
            } else {
                map_db_error(&e)
            }
        })?;

    state.cache.invalidate_all().await;
    Ok(Json(ApiResponse::new(ProductItem::from(row))))
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct UpdateProductBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub stock: Option<i32>,
    pub image: Option<String>,
    pub discount: Option<i32>,
    pub featured: Option<bool>,
    pub condition: Option<String>,
    pub rating: Option<Decimal>,
    pub is_sale: Option<bool>,
    pub is_trending: Option<bool>,
    pub is_best_seller: Option<bool>,
    pub status: Option<String>,
}

/// `PUT /api/products/{id}` — sparse update; absent fields keep stored values.
pub(super) async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateProductBody>,
) -> Result<Json<ApiResponse<ProductItem>>, ApiError> {
    validate_product_fields(
        body.price.unwrap_or(Decimal::ZERO),
        body.stock.unwrap_or(0),
        body.discount.unwrap_or(0),
        body.rating,
    )?;
    if let Some(ref name) = body.name {
        validation::validate_required(name, "tên sản phẩm")?;
    }

    let update = ProductUpdate {
        name: body.name.map(|n| n.trim().to_string()),
        description: body.description,
        price: body.price,
        category: body.category,
        brand: body.brand,
        stock: body.stock,
        image: body.image,
        discount: body.discount,
        featured: body.featured,
        condition: body.condition,
        rating: body.rating,
        is_sale: body.is_sale,
        is_trending: body.is_trending,
        is_best_seller: body.is_best_seller,
        status: body.status,
    };

    let row = techphone_db::update_product(&state.pool, id, &update)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::conflict("a product with this name already exists")
            } else {
                map_db_error(&e)
            }
        })?;

    state.cache.invalidate_all().await;
    Ok(Json(ApiResponse::new(ProductItem::from(row))))
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedProduct {
    id: i64,
    deleted: bool,
}

/// `DELETE /api/products/{id}` — soft delete; the row stays for order history.
pub(super) async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedProduct>>, ApiError> {
    techphone_db::soft_delete_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;

    state.cache.invalidate_all().await;
    Ok(Json(ApiResponse::new(DeletedProduct { id, deleted: true })))
}

fn encode<T: Serialize>(envelope: ApiResponse<T>) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(envelope).map_err(|e| {
        tracing::error!(error = %e, "failed to encode response body");
        ApiError::new("internal_error", "failed to encode response")
    })
}
