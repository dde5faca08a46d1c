use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use techphone_core::{reconcile_role, validation, Role};
use techphone_db::{NewProfile, ProfileRow, ProfileUpdate};

use super::{
    map_db_error, normalize_limit, normalize_page, page_offset, ApiError, ApiResponse, AppState,
    Pagination,
};

#[derive(Debug, Serialize)]
pub(super) struct ProfileData {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    role: String,
    status: String,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for ProfileData {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role: row.role,
            status: row.status,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProfileListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// `GET /api/profiles` — paginated listing, newest first.
pub(super) async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProfileListQuery>,
) -> Result<Json<ApiResponse<Vec<ProfileData>>>, ApiError> {
    let limit = normalize_limit(query.limit);
    let page = normalize_page(query.page);

    let (rows, total) = techphone_db::list_profiles(&state.pool, limit, page_offset(page, limit))
        .await
        .map_err(|e| map_db_error(&e))?;
    let data: Vec<ProfileData> = rows.into_iter().map(ProfileData::from).collect();

    Ok(Json(ApiResponse::with_pagination(
        data,
        total,
        Pagination::new(page, limit, total),
    )))
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateProfileBody {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

/// `POST /api/profiles` — upsert keyed by the auth provider's user id.
///
/// The stored role is reconciled against the admin allowlist, so a stale
/// `admin` on a de-listed account is demoted on the next sign-in sync.
pub(super) async fn create_profile(
    State(state): State<AppState>,
    Json(body): Json<CreateProfileBody>,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    validation::validate_email(&body.email)?;

    let requested = body
        .role
        .as_deref()
        .unwrap_or("user")
        .parse::<Role>()
        .unwrap_or(Role::Guest);
    let role = reconcile_role(&body.email, requested);

    let profile = NewProfile {
        id: body.id,
        email: body.email.trim().to_lowercase(),
        full_name: body.full_name,
        role: role.to_string(),
    };

    let row = techphone_db::upsert_profile(&state.pool, &profile)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::conflict("email already belongs to another profile")
            } else {
                map_db_error(&e)
            }
        })?;

    state.cache.invalidate_all().await;
    Ok(Json(ApiResponse::new(ProfileData::from(row))))
}

/// `GET /api/profiles/{id}` — single profile.
pub(super) async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    let row = techphone_db::get_profile(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("profile not found"))?;
    Ok(Json(ApiResponse::new(ProfileData::from(row))))
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct UpdateProfileBody {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

/// `PUT /api/profiles/{id}` — sparse update.
pub(super) async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    if let Some(ref email) = body.email {
        validation::validate_email(email)?;
    }

    // Role values are normalized through the vocabulary; unknowns become guest.
    let role = body
        .role
        .as_deref()
        .map(|r| r.parse::<Role>().unwrap_or(Role::Guest).to_string());

    let update = ProfileUpdate {
        email: body.email.map(|e| e.trim().to_lowercase()),
        full_name: body.full_name,
        role,
        status: body.status,
    };

    let row = techphone_db::update_profile(&state.pool, id, &update)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::conflict("email already belongs to another profile")
            } else {
                map_db_error(&e)
            }
        })?;

    state.cache.invalidate_all().await;
    Ok(Json(ApiResponse::new(ProfileData::from(row))))
}

/// `PUT /api/profiles/{id}/last-login` — record a sign-in.
///
/// Reads the stored profile, reconciles its role against the admin
/// allowlist, and writes `last_login` plus the reconciled role atomically.
pub(super) async fn touch_last_login(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    let current = techphone_db::get_profile(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("profile not found"))?;

    let stored_role = current.role.parse::<Role>().unwrap_or(Role::Guest);
    let role = reconcile_role(&current.email, stored_role);

    let row = techphone_db::touch_last_login(&state.pool, id, &role.to_string())
        .await
        .map_err(|e| map_db_error(&e))?;

    state.cache.invalidate_all().await;
    Ok(Json(ApiResponse::new(ProfileData::from(row))))
}
