// src/db/report_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::reports::{DashboardSummary, WarehouseUtilization},
};

#[derive(Clone, Default)]
pub struct ReportRepository;

impl ReportRepository {
    // 1. Cards do painel, num único SELECT
    pub async fn dashboard_summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let summary = sqlx::query_as::<_, DashboardSummary>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM customers WHERE status = 'active') AS active_customers,
                (SELECT COUNT(*) FROM warehouses) AS warehouses,
                (SELECT COUNT(*) FROM inventory_items) AS inventory_items,
                (SELECT COALESCE(SUM(quantity), 0)::bigint FROM inventory_items) AS units_on_hand,
                (SELECT COUNT(*) FROM outbound_orders
                  WHERE status NOT IN ('delivered', 'cancelled')) AS open_orders
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(summary)
    }

    // 2. Unidades em mãos por armazém
    pub async fn warehouse_units<'e, E>(&self, executor: E) -> Result<Vec<WarehouseUtilization>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, WarehouseUtilization>(
            r#"
            SELECT
                w.id AS warehouse_id,
                w.name AS warehouse_name,
                w.capacity,
                COALESCE(SUM(i.quantity), 0)::bigint AS units_on_hand
            FROM warehouses w
            LEFT JOIN inventory_items i ON i.warehouse_id = w.id
            GROUP BY w.id, w.name, w.capacity
            ORDER BY w.name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
