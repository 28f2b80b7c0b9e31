// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
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
    models::reports::{DashboardSummary, ReportQuery, ReportSummary, WarehouseUtilization},
};

// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Reports",
    responses(
        (status = 200, description = "Contadores do painel administrativo", body = DashboardSummary),
        (status = 403, description = "Apenas super_admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let summary = app_state
        .report_service
        .dashboard(&mut *tx)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/admin/reports/summary
#[utoipa::path(
    get,
    path = "/api/admin/reports/summary",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Pedidos, status e receita no período", body = ReportSummary),
        (status = 400, description = "Intervalo de datas inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let summary = app_state
        .report_service
        .summary(&mut *tx, &query)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/admin/reports/utilization
#[utoipa::path(
    get,
    path = "/api/admin/reports/utilization",
    tag = "Reports",
    responses(
        (status = 200, description = "Unidades em estoque contra a capacidade de cada armazém", body = Vec<WarehouseUtilization>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_utilization(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdmin>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let mut tx = begin_rls_transaction(&app_state, &user).await.map_err(to_api)?;
    let rows = app_state
        .report_service
        .warehouse_utilization(&mut *tx)
        .await
        .map_err(to_api)?;
    tx.commit().await.map_err(|e| to_api(e.into()))?;

    Ok((StatusCode::OK, Json(rows)))
}
