// src/handlers/warehouses.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
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
    models::warehouses::{Warehouse, WarehousePayload},
};

// GET /api/warehouses
#[utoipa::path(
    get,
    path = "/api/warehouses",
    tag = "Warehouses",
    responses(
        (status = 200, description = "Armazéns ativos (qualquer usuário autenticado)", body = Vec<Warehouse>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_active_warehouses(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let warehouses = app_state
        .warehouse_service
        .list_warehouses(&mut *tx, true)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(warehouses)))
}

// GET /api/admin/warehouses
#[utoipa::path(
    get,
    path = "/api/admin/warehouses",
    tag = "Warehouses",
    responses(
        (status = 200, description = "Todos os armazéns", body = Vec<Warehouse>),
        (status = 403, description = "Apenas super_admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_warehouses(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let warehouses = app_state
        .warehouse_service
        .list_warehouses(&mut *tx, false)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(warehouses)))
}

// GET /api/admin/warehouses/{id}
#[utoipa::path(
    get,
    path = "/api/admin/warehouses/{id}",
    tag = "Warehouses",
    params(("id" = Uuid, Path, description = "ID do armazém")),
    responses(
        (status = 200, description = "Armazém", body = Warehouse),
        (status = 404, description = "Armazém não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_warehouse(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let warehouse = app_state
        .warehouse_service
        .get_warehouse(&mut *tx, id)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(warehouse)))
}

// POST /api/admin/warehouses
#[utoipa::path(
    post,
    path = "/api/admin/warehouses",
    tag = "Warehouses",
    request_body = WarehousePayload,
    responses(
        (status = 201, description = "Armazém criado", body = Warehouse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Código já utilizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_warehouse(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Json(payload): Json<WarehousePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let warehouse = app_state
        .warehouse_service
        .create_warehouse(&mut *tx, &payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::CREATED, Json(warehouse)))
}

// PUT /api/admin/warehouses/{id}
#[utoipa::path(
    put,
    path = "/api/admin/warehouses/{id}",
    tag = "Warehouses",
    params(("id" = Uuid, Path, description = "ID do armazém")),
    request_body = WarehousePayload,
    responses(
        (status = 200, description = "Armazém atualizado", body = Warehouse),
        (status = 404, description = "Armazém não encontrado"),
        (status = 409, description = "Código já utilizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_warehouse(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WarehousePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let warehouse = app_state
        .warehouse_service
        .update_warehouse(&mut *tx, id, &payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(warehouse)))
}

// DELETE /api/admin/warehouses/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/warehouses/{id}",
    tag = "Warehouses",
    params(("id" = Uuid, Path, description = "ID do armazém")),
    responses(
        (status = 204, description = "Armazém excluído"),
        (status = 404, description = "Armazém não encontrado"),
        (status = 409, description = "Armazém ainda possui estoque ou pedidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_warehouse(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    app_state
        .warehouse_service
        .delete_warehouse(&mut *tx, id)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}
