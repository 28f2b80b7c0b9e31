// src/handlers/portal.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::PortalCustomer},
    models::{
        inventory::{InventoryFilter, InventoryListEntry},
        orders::{OrderDetail, OrderFilter, OrderListEntry},
        reports::BillingStatement,
        validation::check_date_range,
    },
};

// =============================================================================
//  PORTAL DO CLIENTE: tudo é filtrado pelo cliente vinculado ao usuário
// =============================================================================

// GET /api/portal/inventory
#[utoipa::path(
    get,
    path = "/api/portal/inventory",
    tag = "Portal",
    params(InventoryFilter),
    responses(
        (status = 200, description = "Estoque do cliente logado", body = Vec<InventoryListEntry>),
        (status = 403, description = "Usuário não é cliente ou não tem cliente vinculado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    PortalCustomer(customer_id): PortalCustomer,
    Query(filter): Query<InventoryFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let items = app_state
        .inventory_service
        .list_customer_items(&mut *tx, customer_id, filter)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(items)))
}

// GET /api/portal/orders
#[utoipa::path(
    get,
    path = "/api/portal/orders",
    tag = "Portal",
    params(OrderFilter),
    responses(
        (status = 200, description = "Pedidos do cliente logado", body = Vec<OrderListEntry>),
        (status = 403, description = "Usuário não é cliente ou não tem cliente vinculado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    PortalCustomer(customer_id): PortalCustomer,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let orders = app_state
        .order_service
        .list_customer_orders(&mut *tx, customer_id, filter)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(orders)))
}

// GET /api/portal/orders/{id}
#[utoipa::path(
    get,
    path = "/api/portal/orders/{id}",
    tag = "Portal",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido do cliente com as linhas", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado (ou de outro cliente)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    PortalCustomer(customer_id): PortalCustomer,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let detail = app_state
        .order_service
        .get_order_detail(&mut *tx, id, Some(customer_id))
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(detail)))
}

fn validate_billing_range(query: &BillingQuery) -> Result<(), ValidationError> {
    check_date_range(query.from, query.to)
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
#[validate(schema(function = "validate_billing_range"))]
pub struct BillingQuery {
    /// Data solicitada inicial (inclusiva)
    pub from: Option<NaiveDate>,
    /// Data solicitada final (inclusiva)
    pub to: Option<NaiveDate>,
}

// GET /api/portal/billing
#[utoipa::path(
    get,
    path = "/api/portal/billing",
    tag = "Portal",
    params(BillingQuery),
    responses(
        (status = 200, description = "Cobranças do cliente no período", body = BillingStatement),
        (status = 400, description = "Intervalo de datas inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_billing(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    PortalCustomer(customer_id): PortalCustomer,
    Query(query): Query<BillingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let statement = app_state
        .report_service
        .billing(&mut *tx, customer_id, query.from, query.to)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(statement)))
}
