//! Database operations for the `products` table.
//!
//! `list_products` is the single filter builder behind every product listing;
//! filters are pushed in a fixed order chosen for index selectivity:
//! soft-delete/status/condition flags first, categorical equality and IN
//! filters second, numeric ranges third, and the substring keyword search
//! last.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub brand: Option<String>,
    pub stock: i32,
    pub image: Option<String>,
    pub discount: i32,
    pub featured: bool,
    pub condition: String,
    pub rating: Option<Decimal>,
    pub is_sale: bool,
    pub is_trending: bool,
    pub is_best_seller: bool,
    pub status: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, brand, stock, image, \
     discount, featured, condition, rating, is_sale, is_trending, is_best_seller, \
     status, deleted_at, created_at, updated_at";

// ---------------------------------------------------------------------------
// Filters and sorting
// ---------------------------------------------------------------------------

/// Sortable columns for product listings. Anything outside this set falls
/// back to the default, so callers can never inject an arbitrary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    CreatedAt,
    Price,
    Name,
    Rating,
    Stock,
    Discount,
}

impl ProductSort {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created_at" => Some(Self::CreatedAt),
            "price" => Some(Self::Price),
            "name" => Some(Self::Name),
            "rating" => Some(Self::Rating),
            "stock" => Some(Self::Stock),
            "discount" => Some(Self::Discount),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Price => "price",
            Self::Name => "name",
            Self::Rating => "rating",
            Self::Stock => "stock",
            Self::Discount => "discount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Optional filters for a product listing.
///
/// `categories` is the already-expanded variant set from
/// `techphone_core::expand_category_variants`; an empty vector disables the
/// filter. Boolean flags filter only when `true` was requested.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    pub categories: Vec<String>,
    pub brand: Option<String>,
    pub condition: Option<String>,
    pub status: Option<String>,
    pub featured: bool,
    pub is_sale: bool,
    pub is_trending: bool,
    pub is_best_seller: bool,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub rating_min: Option<Decimal>,
    pub keyword: Option<String>,
    /// Admin listings may include soft-deleted rows.
    pub include_deleted: bool,
    pub sort: Option<ProductSort>,
    pub order: Option<SortOrder>,
    pub limit: i64,
    pub offset: i64,
}

/// Push `WHERE`/`AND` depending on whether a clause was already written.
fn push_sep(qb: &mut QueryBuilder<'_, Postgres>, sep: &mut &'static str) {
    qb.push(*sep);
    *sep = " AND ";
}

/// Push the WHERE clause for `filters`, in the fixed selectivity order.
#[allow(clippy::too_many_lines)] // one clause per filter; splitting hides the ordering
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &ProductFilters) {
    let mut sep = " WHERE ";

    // 1. Soft-delete / status / condition / feature flags.
    if !filters.include_deleted {
        push_sep(qb, &mut sep);
        qb.push("deleted_at IS NULL");
    }
    if let Some(ref status) = filters.status {
        push_sep(qb, &mut sep);
        qb.push("status = ").push_bind(status.clone());
    }
    if let Some(ref condition) = filters.condition {
        push_sep(qb, &mut sep);
        qb.push("condition = ").push_bind(condition.clone());
    }
    if filters.featured {
        push_sep(qb, &mut sep);
        qb.push("featured = TRUE");
    }
    if filters.is_sale {
        push_sep(qb, &mut sep);
        qb.push("is_sale = TRUE");
    }
    if filters.is_trending {
        push_sep(qb, &mut sep);
        qb.push("is_trending = TRUE");
    }
    if filters.is_best_seller {
        push_sep(qb, &mut sep);
        qb.push("is_best_seller = TRUE");
    }

    // 2. Categorical equality / IN filters.
    if !filters.categories.is_empty() {
        push_sep(qb, &mut sep);
        qb.push("LOWER(category) = ANY(")
            .push_bind(filters.categories.clone())
            .push(")");
    }
    if let Some(ref brand) = filters.brand {
        push_sep(qb, &mut sep);
        qb.push("LOWER(brand) = LOWER(")
            .push_bind(brand.clone())
            .push(")");
    }

    // 3. Numeric ranges.
    if let Some(price_min) = filters.price_min {
        push_sep(qb, &mut sep);
        qb.push("price >= ").push_bind(price_min);
    }
    if let Some(price_max) = filters.price_max {
        push_sep(qb, &mut sep);
        qb.push("price <= ").push_bind(price_max);
    }
    if let Some(rating_min) = filters.rating_min {
        push_sep(qb, &mut sep);
        qb.push("rating >= ").push_bind(rating_min);
    }

    // 4. Free-text keyword, always last.
    if let Some(ref keyword) = filters.keyword {
        let pattern = format!("%{keyword}%");
        push_sep(qb, &mut sep);
        qb.push("(name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR brand ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// List products matching `filters`, returning the page of rows plus the
/// total match count (computed with the same WHERE clause, ignoring
/// limit/offset).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_products(
    pool: &PgPool,
    filters: &ProductFilters,
) -> Result<(Vec<ProductRow>, i64), DbError> {
    let sort = filters.sort.unwrap_or(ProductSort::CreatedAt);
    let order = filters.order.unwrap_or(SortOrder::Desc);

    let mut qb = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    push_filters(&mut qb, filters);
    // Secondary id key keeps pagination stable when the sort column has ties.
    qb.push(format!(
        " ORDER BY {} {}, id DESC",
        sort.column(),
        order.keyword()
    ));
    qb.push(" LIMIT ").push_bind(filters.limit);
    qb.push(" OFFSET ").push_bind(filters.offset);

    let rows = qb.build_query_as::<ProductRow>().fetch_all(pool).await?;

    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_filters(&mut count_qb, filters);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    Ok((rows, total))
}

/// Keyword search over name/description/brand, excluding soft-deleted rows,
/// newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_products(
    pool: &PgPool,
    keyword: &str,
    limit: i64,
) -> Result<Vec<ProductRow>, DbError> {
    let filters = ProductFilters {
        keyword: Some(keyword.to_string()),
        limit,
        ..ProductFilters::default()
    };
    let (rows, _) = list_products(pool, &filters).await?;
    Ok(rows)
}

/// Fetch a single product by id, or `None` if absent.
///
/// Soft-deleted rows are returned when `include_deleted` is set (admin detail
/// views); otherwise they read as absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(
    pool: &PgPool,
    id: i64,
    include_deleted: bool,
) -> Result<Option<ProductRow>, DbError> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = "
    ));
    qb.push_bind(id);
    if !include_deleted {
        qb.push(" AND deleted_at IS NULL");
    }

    let row = qb
        .build_query_as::<ProductRow>()
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Fields for product creation.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub brand: Option<String>,
    pub stock: i32,
    pub image: Option<String>,
    pub discount: i32,
    pub featured: bool,
    pub condition: String,
    pub rating: Option<Decimal>,
    pub is_sale: bool,
    pub is_trending: bool,
    pub is_best_seller: bool,
}

/// Insert a new product row and return it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including the
/// unique-name violation, which handlers map to 409).
pub async fn create_product(pool: &PgPool, product: &NewProduct) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products \
           (name, description, price, category, brand, stock, image, discount, \
            featured, condition, rating, is_sale, is_trending, is_best_seller) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.category)
    .bind(&product.brand)
    .bind(product.stock)
    .bind(&product.image)
    .bind(product.discount)
    .bind(product.featured)
    .bind(&product.condition)
    .bind(product.rating)
    .bind(product.is_sale)
    .bind(product.is_trending)
    .bind(product.is_best_seller)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Sparse update: `Some(v)` sets the field, `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
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

/// Overlay `update` onto an existing row via COALESCE in a single statement,
/// returning the updated row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no live row has that id, or
/// [`DbError::Sqlx`] on query failure.
pub async fn update_product(
    pool: &PgPool,
    id: i64,
    update: &ProductUpdate,
) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "UPDATE products SET \
             name           = COALESCE($2, name), \
             description    = COALESCE($3, description), \
             price          = COALESCE($4, price), \
             category       = COALESCE($5, category), \
             brand          = COALESCE($6, brand), \
             stock          = COALESCE($7, stock), \
             image          = COALESCE($8, image), \
             discount       = COALESCE($9, discount), \
             featured       = COALESCE($10, featured), \
             condition      = COALESCE($11, condition), \
             rating         = COALESCE($12, rating), \
             is_sale        = COALESCE($13, is_sale), \
             is_trending    = COALESCE($14, is_trending), \
             is_best_seller = COALESCE($15, is_best_seller), \
             status         = COALESCE($16, status), \
             updated_at     = NOW() \
         WHERE id = $1 AND deleted_at IS NULL \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(id)
    .bind(&update.name)
    .bind(&update.description)
    .bind(update.price)
    .bind(&update.category)
    .bind(&update.brand)
    .bind(update.stock)
    .bind(&update.image)
    .bind(update.discount)
    .bind(update.featured)
    .bind(&update.condition)
    .bind(update.rating)
    .bind(update.is_sale)
    .bind(update.is_trending)
    .bind(update.is_best_seller)
    .bind(&update.status)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Soft-delete a product by setting `deleted_at`; already-deleted rows are
/// left untouched.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no live row has that id, or
/// [`DbError::Sqlx`] on query failure.
pub async fn soft_delete_product(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let affected = sqlx::query(
        "UPDATE products SET deleted_at = NOW(), updated_at = NOW() \
         WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
