// src/services/report_service.rs

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrderRepository, ReportRepository},
    models::{
        orders::{OrderStatus, OutboundOrder},
        reports::{
            BillingLine, BillingStatement, CustomerRevenue, DashboardSummary, MonthlyRevenue,
            OrderSummary, ReportOrderRow, ReportQuery, ReportSummary, StatusCount,
            WarehouseUtilization,
        },
    },
};

// ---
// Agregações puras sobre as linhas já buscadas
// ---

fn is_billable(order: &OutboundOrder) -> bool {
    order.status != OrderStatus::Cancelled
}

pub fn summarize_orders<'a, I>(orders: I) -> OrderSummary
where
    I: IntoIterator<Item = &'a OutboundOrder>,
{
    let mut summary = OrderSummary::default();
    let mut per_status: HashMap<OrderStatus, usize> = HashMap::new();

    for order in orders {
        summary.order_count += 1;
        summary.total_quantity += i64::from(order.total_quantity);
        *per_status.entry(order.status).or_default() += 1;

        // Pedidos cancelados contam, mas não faturam
        if is_billable(order) {
            summary.handling_revenue += order.handling_charges;
            summary.delivery_revenue += order.delivery_charges;
            summary.total_revenue += order.total_charges;
        }
    }

    summary.status_counts = OrderStatus::FLOW
        .into_iter()
        .chain([OrderStatus::Cancelled])
        .filter_map(|status| per_status.get(&status).map(|&count| StatusCount { status, count }))
        .collect();

    summary
}

/// Receita por cliente, da maior para a menor. Cancelados ficam de fora.
pub fn revenue_by_customer(rows: &[ReportOrderRow]) -> Vec<CustomerRevenue> {
    let mut per_customer: HashMap<Uuid, CustomerRevenue> = HashMap::new();

    for row in rows.iter().filter(|r| is_billable(&r.order)) {
        let entry = per_customer.entry(row.order.customer_id).or_insert_with(|| CustomerRevenue {
            customer_id: row.order.customer_id,
            customer_name: row.customer_name.clone(),
            order_count: 0,
            revenue: Decimal::ZERO,
        });
        entry.order_count += 1;
        entry.revenue += row.order.total_charges;
    }

    let mut result: Vec<CustomerRevenue> = per_customer.into_values().collect();
    result.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.customer_name.cmp(&b.customer_name))
    });
    result
}

/// Receita por mês da data solicitada (YYYY-MM), em ordem cronológica.
pub fn revenue_by_month<'a, I>(orders: I) -> Vec<MonthlyRevenue>
where
    I: IntoIterator<Item = &'a OutboundOrder>,
{
    let mut per_month: BTreeMap<String, Decimal> = BTreeMap::new();
    for order in orders.into_iter().filter(|o| is_billable(o)) {
        *per_month
            .entry(order.requested_date.format("%Y-%m").to_string())
            .or_default() += order.total_charges;
    }
    per_month
        .into_iter()
        .map(|(month, revenue)| MonthlyRevenue { month, revenue })
        .collect()
}

pub fn billing_statement(
    customer_id: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    orders: &[OutboundOrder],
) -> BillingStatement {
    let lines: Vec<BillingLine> = orders
        .iter()
        .filter(|o| o.customer_id == customer_id && is_billable(o))
        .map(|o| BillingLine {
            order_id: o.id,
            order_number: o.order_number.clone(),
            status: o.status,
            requested_date: o.requested_date,
            completed_date: o.completed_date,
            handling_charges: o.handling_charges,
            delivery_charges: o.delivery_charges,
            total_charges: o.total_charges,
        })
        .collect();

    let handling_total = lines.iter().map(|l| l.handling_charges).sum();
    let delivery_total = lines.iter().map(|l| l.delivery_charges).sum();
    let grand_total = lines.iter().map(|l| l.total_charges).sum();

    BillingStatement { customer_id, from, to, lines, handling_total, delivery_total, grand_total }
}

/// Ocupação em % (duas casas). Sem capacidade definida não há percentual.
pub fn utilization_percent(capacity: Option<Decimal>, units_on_hand: i64) -> Option<Decimal> {
    let capacity = capacity.filter(|c| *c > Decimal::ZERO)?;
    Some((Decimal::from(units_on_hand) * Decimal::ONE_HUNDRED / capacity).round_dp(2))
}

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
    order_repo: OrderRepository,
}

impl ReportService {
    pub fn new(repo: ReportRepository, order_repo: OrderRepository) -> Self {
        Self { repo, order_repo }
    }

    pub async fn dashboard<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.dashboard_summary(executor).await
    }

    pub async fn summary<'e, E>(&self, executor: E, query: &ReportQuery) -> Result<ReportSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = self
            .order_repo
            .report_rows(executor, query.from, query.to, query.customer_id)
            .await?;

        Ok(ReportSummary {
            from: query.from,
            to: query.to,
            orders: summarize_orders(rows.iter().map(|r| &r.order)),
            revenue_by_customer: revenue_by_customer(&rows),
            revenue_by_month: revenue_by_month(rows.iter().map(|r| &r.order)),
        })
    }

    pub async fn warehouse_utilization<'e, E>(&self, executor: E) -> Result<Vec<WarehouseUtilization>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut rows = self.repo.warehouse_units(executor).await?;
        for row in &mut rows {
            row.utilization_percent = utilization_percent(row.capacity, row.units_on_hand);
        }
        Ok(rows)
    }

    /// Faturamento do portal: pedidos do cliente no intervalo, sem os cancelados.
    pub async fn billing<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<BillingStatement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = self
            .order_repo
            .report_rows(executor, from, to, Some(customer_id))
            .await?;
        let orders: Vec<OutboundOrder> = rows.into_iter().map(|r| r.order).collect();
        Ok(billing_statement(customer_id, from, to, &orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::orders::OrderType;
    use chrono::Utc;

    fn order(customer_id: Uuid, status: OrderStatus, date: &str, handling: i64, delivery: i64, qty: i32) -> OutboundOrder {
        let now = Utc::now();
        let handling = Decimal::new(handling * 100, 2);
        let delivery = Decimal::new(delivery * 100, 2);
        OutboundOrder {
            id: Uuid::new_v4(),
            order_number: format!("ORD-2026-{}", 10_000 + qty),
            customer_id,
            warehouse_id: Uuid::new_v4(),
            order_type: OrderType::Shipping,
            status,
            requested_date: date.parse().unwrap(),
            scheduled_date: None,
            completed_date: None,
            ship_to_name: None,
            ship_to_address: None,
            carrier: None,
            tracking_number: None,
            notes: None,
            total_items: 1,
            total_quantity: qty,
            handling_charges: handling,
            delivery_charges: delivery,
            total_charges: handling + delivery,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn row(order: OutboundOrder, name: &str) -> ReportOrderRow {
        ReportOrderRow { order, customer_name: name.into() }
    }

    #[test]
    fn summary_counts_everything_but_bills_only_live_orders() {
        let c = Uuid::new_v4();
        let orders = vec![
            order(c, OrderStatus::Pending, "2026-03-01", 10, 5, 5),
            order(c, OrderStatus::Delivered, "2026-03-10", 20, 0, 7),
            order(c, OrderStatus::Cancelled, "2026-03-11", 99, 1, 3),
        ];

        let summary = summarize_orders(&orders);
        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.total_quantity, 15);
        assert_eq!(summary.handling_revenue, Decimal::new(3000, 2));
        assert_eq!(summary.delivery_revenue, Decimal::new(500, 2));
        assert_eq!(summary.total_revenue, Decimal::new(3500, 2));
        assert_eq!(
            summary.status_counts,
            vec![
                StatusCount { status: OrderStatus::Pending, count: 1 },
                StatusCount { status: OrderStatus::Delivered, count: 1 },
                StatusCount { status: OrderStatus::Cancelled, count: 1 },
            ]
        );
    }

    #[test]
    fn empty_period_is_all_zeroes() {
        let none: Vec<OutboundOrder> = Vec::new();
        assert_eq!(summarize_orders(&none), OrderSummary::default());
        assert!(revenue_by_month(&none).is_empty());
    }

    #[test]
    fn revenue_per_customer_is_sorted_descending() {
        let (acme, beta) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            row(order(acme, OrderStatus::Shipped, "2026-03-01", 10, 0, 1), "Acme"),
            row(order(beta, OrderStatus::Pending, "2026-03-02", 30, 0, 1), "Beta"),
            row(order(acme, OrderStatus::Pending, "2026-03-03", 5, 5, 1), "Acme"),
            row(order(acme, OrderStatus::Cancelled, "2026-03-04", 100, 0, 1), "Acme"),
        ];

        let revenue = revenue_by_customer(&rows);
        assert_eq!(revenue.len(), 2);
        assert_eq!(revenue[0].customer_name, "Beta");
        assert_eq!(revenue[0].revenue, Decimal::new(3000, 2));
        assert_eq!(revenue[1].customer_name, "Acme");
        assert_eq!(revenue[1].order_count, 2);
        assert_eq!(revenue[1].revenue, Decimal::new(2000, 2));
    }

    #[test]
    fn revenue_per_month_is_chronological() {
        let c = Uuid::new_v4();
        let orders = vec![
            order(c, OrderStatus::Pending, "2026-04-15", 10, 0, 1),
            order(c, OrderStatus::Pending, "2026-02-01", 1, 1, 1),
            order(c, OrderStatus::Pending, "2026-04-01", 5, 0, 1),
        ];
        let months = revenue_by_month(&orders);
        let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, vec!["2026-02", "2026-04"]);
        assert_eq!(months[1].revenue, Decimal::new(1500, 2));
    }

    #[test]
    fn billing_keeps_only_the_customer_and_skips_cancelled() {
        let (mine, other) = (Uuid::new_v4(), Uuid::new_v4());
        let orders = vec![
            order(mine, OrderStatus::Delivered, "2026-03-01", 10, 5, 5),
            order(mine, OrderStatus::Cancelled, "2026-03-02", 10, 5, 5),
            order(other, OrderStatus::Delivered, "2026-03-03", 50, 0, 5),
        ];

        let statement = billing_statement(mine, None, None, &orders);
        assert_eq!(statement.lines.len(), 1);
        assert_eq!(statement.handling_total, Decimal::new(1000, 2));
        assert_eq!(statement.delivery_total, Decimal::new(500, 2));
        assert_eq!(statement.grand_total, Decimal::new(1500, 2));
    }

    #[test]
    fn utilization_needs_a_capacity() {
        assert_eq!(utilization_percent(None, 10), None);
        assert_eq!(utilization_percent(Some(Decimal::from(400)), 100), Some(Decimal::new(2500, 2)));
        assert_eq!(utilization_percent(Some(Decimal::from(3)), 1), Some(Decimal::new(3333, 2)));
    }
}
