// src/handlers/users.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, SuperAdmin},
    },
    models::roles::{ProvisionUserPayload, ProvisionUserResponse, UserSummary},
};

// POST /api/admin/users
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Users",
    request_body = ProvisionUserPayload,
    responses(
        (status = 201, description = "Usuário, perfil e papel criados", body = ProvisionUserResponse),
        (status = 400, description = "Dados ou papel inválidos"),
        (status = 403, description = "Apenas super_admin"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn provision_user(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Json(payload): Json<ProvisionUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;

    let provisioned = app_state
        .provisioning_service
        .provision_user(&mut *tx, &payload)
        .await
        .map_err(to_api)?;

    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(ProvisionUserResponse { success: true, user: provisioned }),
    ))
}

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Users",
    responses(
        (status = 200, description = "Usuários com perfil e papel", body = Vec<UserSummary>),
        (status = 403, description = "Apenas super_admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let users = app_state
        .provisioning_service
        .list_users(&mut *tx)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(users)))
}
