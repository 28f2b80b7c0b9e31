// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
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
    models::orders::{
        CreateOrderPayload, NewOrder, OrderDetail, OrderFilter, OrderListEntry, OutboundOrder,
        UpdateOrderPayload, UpdateOrderStatusPayload,
    },
};

// GET /api/admin/orders
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Orders",
    params(OrderFilter),
    responses(
        (status = 200, description = "Pedidos com nome do cliente e do armazém", body = Vec<OrderListEntry>),
        (status = 400, description = "Intervalo de datas inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let orders = app_state
        .order_service
        .list_orders(&mut *tx, &filter)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(orders)))
}

// GET /api/admin/orders/{id}
#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido com as linhas", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let detail = app_state
        .order_service
        .get_order_detail(&mut *tx, id, None)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/admin/orders/preview
#[utoipa::path(
    post,
    path = "/api/admin/orders/preview",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 200, description = "Totais da etapa de revisão (nada é gravado)", body = NewOrder),
        (status = 400, description = "Linha inválida ou quantidade indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn preview_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let preview = app_state
        .order_service
        .preview_order(&mut *tx, &payload)
        .await
        .map_err(to_api)?;
    tx.rollback().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(preview)))
}

// POST /api/admin/orders
#[utoipa::path(
    post,
    path = "/api/admin/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido e linhas criados", body = OutboundOrder),
        (status = 400, description = "Linha inválida ou quantidade indisponível"),
        (status = 404, description = "Cliente, armazém ou item não encontrado"),
        (status = 503, description = "Não foi possível gerar um número de pedido único")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let order = app_state
        .order_service
        .create_order(&mut *tx, &payload, user.0.id)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::CREATED, Json(order)))
}

// PATCH /api/admin/orders/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = UpdateOrderPayload,
    responses(
        (status = 200, description = "Pedido atualizado (cobrança total recalculada)", body = OutboundOrder),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let order = app_state
        .order_service
        .update_order(&mut *tx, id, payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(order)))
}

// PUT /api/admin/orders/{id}/status
#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/status",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = UpdateOrderStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = OutboundOrder),
        (status = 404, description = "Pedido não encontrado"),
        (status = 409, description = "Transição não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let order = app_state
        .order_service
        .change_status(&mut *tx, id, payload.status)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(order)))
}

// DELETE /api/admin/orders/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 204, description = "Pedido e linhas excluídos"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    app_state
        .order_service
        .delete_order(&mut *tx, id)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}
