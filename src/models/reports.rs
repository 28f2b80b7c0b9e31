// src/models/reports.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{orders::OutboundOrder, validation::check_date_range};

// 1. Cards do topo do painel administrativo
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub active_customers: i64,
    pub warehouses: i64,
    pub inventory_items: i64,
    pub units_on_hand: i64,
    pub open_orders: i64,
}

// 2. Resumo de pedidos no período
#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_count: usize,
    pub status_counts: Vec<StatusCount>,
    pub total_quantity: i64,
    pub handling_revenue: Decimal,
    pub delivery_revenue: Decimal,
    pub total_revenue: Decimal,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: crate::models::orders::OrderStatus,
    pub count: usize,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRevenue {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub order_count: usize,
    pub revenue: Decimal,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct MonthlyRevenue {
    // Formato YYYY-MM
    #[schema(example = "2026-03")]
    pub month: String,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub orders: OrderSummary,
    pub revenue_by_customer: Vec<CustomerRevenue>,
    pub revenue_by_month: Vec<MonthlyRevenue>,
}

// 3. Ocupação dos armazéns
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseUtilization {
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub capacity: Option<Decimal>,
    pub units_on_hand: i64,
    // Percentual (0-100); None quando o armazém não tem capacidade definida
    #[sqlx(skip)]
    pub utilization_percent: Option<Decimal>,
}

/// Pedido com o nome do cliente, matéria-prima dos relatórios.
#[derive(Debug, Clone, FromRow)]
pub struct ReportOrderRow {
    #[sqlx(flatten)]
    pub order: OutboundOrder,
    pub customer_name: String,
}

// 4. Faturamento do cliente (portal)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingStatement {
    pub customer_id: Uuid,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub lines: Vec<BillingLine>,
    pub handling_total: Decimal,
    pub delivery_total: Decimal,
    pub grand_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingLine {
    pub order_id: Uuid,
    pub order_number: String,
    pub status: crate::models::orders::OrderStatus,
    pub requested_date: NaiveDate,
    pub completed_date: Option<NaiveDate>,
    pub handling_charges: Decimal,
    pub delivery_charges: Decimal,
    pub total_charges: Decimal,
}

fn validate_report_range(query: &ReportQuery) -> Result<(), ValidationError> {
    check_date_range(query.from, query.to)
}

#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
#[validate(schema(function = "validate_report_range"))]
pub struct ReportQuery {
    /// Data solicitada inicial (inclusiva)
    pub from: Option<NaiveDate>,
    /// Data solicitada final (inclusiva)
    pub to: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,
}
