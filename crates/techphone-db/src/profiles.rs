//! Database operations for the `profiles` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `profiles` table. `id` matches the auth provider's user id.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub status: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PROFILE_COLUMNS: &str =
    "id, email, full_name, role, status, last_login, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
}

/// Sparse update; `Some(v)` sets the field, `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

/// Insert a profile, or update email/full_name/role when the id already
/// exists. Login flows call this on every sign-in, so conflicts are the
/// common path.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails (including an email
/// unique violation against a different profile).
pub async fn upsert_profile(pool: &PgPool, profile: &NewProfile) -> Result<ProfileRow, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "INSERT INTO profiles (id, email, full_name, role) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (id) DO UPDATE SET \
             email      = EXCLUDED.email, \
             full_name  = COALESCE(EXCLUDED.full_name, profiles.full_name), \
             role       = EXCLUDED.role, \
             updated_at = NOW() \
         RETURNING {PROFILE_COLUMNS}"
    ))
    .bind(profile.id)
    .bind(&profile.email)
    .bind(&profile.full_name)
    .bind(&profile.role)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// List profiles, newest first, plus the total count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_profiles(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<(Vec<ProfileRow>, i64), DbError> {
    let rows = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles \
         ORDER BY created_at DESC, id \
         LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(pool)
        .await?;

    Ok((rows, total))
}

/// Fetch a single profile by id, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_profile(pool: &PgPool, id: Uuid) -> Result<Option<ProfileRow>, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Overlay `update` onto an existing profile.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no profile has that id, or
/// [`DbError::Sqlx`] on query failure.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    update: &ProfileUpdate,
) -> Result<ProfileRow, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "UPDATE profiles SET \
             email      = COALESCE($2, email), \
             full_name  = COALESCE($3, full_name), \
             role       = COALESCE($4, role), \
             status     = COALESCE($5, status), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {PROFILE_COLUMNS}"
    ))
    .bind(id)
    .bind(&update.email)
    .bind(&update.full_name)
    .bind(&update.role)
    .bind(&update.status)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Record a login: set `last_login = NOW()` and write the reconciled role
/// in the same statement, so allowlist promotions/demotions land atomically
/// with the login timestamp.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no profile has that id, or
/// [`DbError::Sqlx`] on query failure.
pub async fn touch_last_login(
    pool: &PgPool,
    id: Uuid,
    reconciled_role: &str,
) -> Result<ProfileRow, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "UPDATE profiles SET \
             last_login = NOW(), \
             role       = $2, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {PROFILE_COLUMNS}"
    ))
    .bind(id)
    .bind(reconciled_role)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}
