// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
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
    models::inventory::{
        CreateInventoryItemPayload, InventoryFilter, InventoryItem, InventoryListEntry,
        UpdateInventoryItemPayload,
    },
};

// GET /api/admin/inventory
#[utoipa::path(
    get,
    path = "/api/admin/inventory",
    tag = "Inventory",
    params(InventoryFilter),
    responses(
        (status = 200, description = "Itens com nome do cliente e do armazém", body = Vec<InventoryListEntry>),
        (status = 403, description = "Apenas super_admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Query(filter): Query<InventoryFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let items = app_state
        .inventory_service
        .list_items(&mut *tx, &filter)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(items)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailableItemsQuery {
    pub customer_id: Uuid,
    pub warehouse_id: Uuid,
}

// GET /api/admin/inventory/available
#[utoipa::path(
    get,
    path = "/api/admin/inventory/available",
    tag = "Inventory",
    params(AvailableItemsQuery),
    responses(
        (status = 200, description = "Itens em estoque que podem entrar num pedido", body = Vec<InventoryItem>)
    ),
    security(("api_jwt" = []))
)]
pub async fn available_for_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Query(query): Query<AvailableItemsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let items = app_state
        .inventory_service
        .available_for_order(&mut *tx, query.customer_id, query.warehouse_id)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(items)))
}

// GET /api/admin/inventory/{id}
#[utoipa::path(
    get,
    path = "/api/admin/inventory/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item de estoque", body = InventoryItem),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let item = app_state
        .inventory_service
        .get_item(&mut *tx, id)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(item)))
}

// POST /api/admin/inventory
#[utoipa::path(
    post,
    path = "/api/admin/inventory",
    tag = "Inventory",
    request_body = CreateInventoryItemPayload,
    responses(
        (status = 201, description = "Item recebido", body = InventoryItem),
        (status = 400, description = "Dados inválidos (ex: quantidade maior que a total)"),
        (status = 404, description = "Cliente ou armazém não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Json(payload): Json<CreateInventoryItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let item = app_state
        .inventory_service
        .create_item(&mut *tx, &payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::CREATED, Json(item)))
}

// PATCH /api/admin/inventory/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/inventory/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateInventoryItemPayload,
    responses(
        (status = 200, description = "Item atualizado", body = InventoryItem),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInventoryItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let item = app_state
        .inventory_service
        .update_item(&mut *tx, id, payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(item)))
}

// DELETE /api/admin/inventory/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/inventory/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item excluído"),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Item ainda referenciado por um pedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    app_state
        .inventory_service
        .delete_item(&mut *tx, id)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}
