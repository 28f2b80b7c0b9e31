// src/handlers/customers.rs

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
    models::customers::{Customer, CustomerFilter, CustomerPayload},
};

// GET /api/admin/customers
#[utoipa::path(
    get,
    path = "/api/admin/customers",
    tag = "Customers",
    params(CustomerFilter),
    responses(
        (status = 200, description = "Lista de clientes", body = Vec<Customer>),
        (status = 403, description = "Apenas super_admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Query(filter): Query<CustomerFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let customers = app_state
        .customer_service
        .list_customers(&mut *tx, &filter)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(customers)))
}

// GET /api/admin/customers/{id}
#[utoipa::path(
    get,
    path = "/api/admin/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let customer = app_state
        .customer_service
        .get_customer(&mut *tx, id)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(customer)))
}

// POST /api/admin/customers
#[utoipa::path(
    post,
    path = "/api/admin/customers",
    tag = "Customers",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Código já utilizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let customer = app_state
        .customer_service
        .create_customer(&mut *tx, &payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// PUT /api/admin/customers/{id}
#[utoipa::path(
    put,
    path = "/api/admin/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = CustomerPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Código já utilizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let customer = app_state
        .customer_service
        .update_customer(&mut *tx, id, &payload)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(customer)))
}

// DELETE /api/admin/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente excluído com seu estoque e pedidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    app_state
        .customer_service
        .delete_customer(&mut *tx, id)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok(StatusCode::NO_CONTENT)
}
