use sqlx::PgPool;
use techphone_core::ProductConfig;

use crate::DbError;

/// Upsert catalog products into the database.
///
/// Returns the number of products processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back. Soft-deleted rows are revived by a
/// re-seed: the upsert clears `deleted_at` so the sample catalog always
/// renders in full.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_products(pool: &PgPool, products: &[ProductConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for product in products {
        sqlx::query(
            "INSERT INTO products \
               (name, description, price, category, brand, stock, image, discount, \
                featured, condition, rating, is_sale, is_trending, is_best_seller) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             ON CONFLICT (name) DO UPDATE SET \
                 description    = EXCLUDED.description, \
                 price          = EXCLUDED.price, \
                 category       = EXCLUDED.category, \
                 brand          = EXCLUDED.brand, \
                 stock          = EXCLUDED.stock, \
                 image          = EXCLUDED.image, \
                 discount       = EXCLUDED.discount, \
                 featured       = EXCLUDED.featured, \
                 condition      = EXCLUDED.condition, \
                 rating         = EXCLUDED.rating, \
                 is_sale        = EXCLUDED.is_sale, \
                 is_trending    = EXCLUDED.is_trending, \
                 is_best_seller = EXCLUDED.is_best_seller, \
                 deleted_at     = NULL, \
                 updated_at     = NOW()",
        )
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
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
