// src/db/order_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{constraint_name, AppError},
    models::{
        orders::{
            NewOrder, OrderFilter, OrderLineView, OrderListEntry, OrderStatus, OutboundOrder,
            OutboundOrderItem,
        },
        reports::ReportOrderRow,
    },
};

const ORDER_COLUMNS: &str = r#"
    o.id, o.order_number, o.customer_id, o.warehouse_id, o.order_type, o.status,
    o.requested_date, o.scheduled_date, o.completed_date,
    o.ship_to_name, o.ship_to_address, o.carrier, o.tracking_number, o.notes,
    o.total_items, o.total_quantity, o.handling_charges, o.delivery_charges, o.total_charges,
    o.created_by, o.created_at, o.updated_at
"#;

pub const ORDER_NUMBER_CONSTRAINT: &str = "outbound_orders_order_number_key";

#[derive(Clone, Default)]
pub struct OrderRepository;

impl OrderRepository {
    pub async fn list<'e, E>(&self, executor: E, filter: &OrderFilter) -> Result<Vec<OrderListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {}, c.name AS customer_name, w.name AS warehouse_name
            FROM outbound_orders o
            JOIN customers c ON c.id = o.customer_id
            JOIN warehouses w ON w.id = o.warehouse_id
            WHERE ($1::order_status IS NULL OR o.status = $1)
              AND ($2::uuid IS NULL OR o.customer_id = $2)
              AND ($3::uuid IS NULL OR o.warehouse_id = $3)
              AND ($4::date IS NULL OR o.requested_date >= $4)
              AND ($5::date IS NULL OR o.requested_date <= $5)
            ORDER BY o.created_at DESC
            "#,
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, OrderListEntry>(&sql)
            .bind(filter.status)
            .bind(filter.customer_id)
            .bind(filter.warehouse_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(executor)
            .await?;
        Ok(orders)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<OutboundOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM outbound_orders o WHERE o.id = $1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, OutboundOrder>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    /// Cabeçalho do pedido com os nomes de cliente e armazém.
    pub async fn find_entry<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<OrderListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {}, c.name AS customer_name, w.name AS warehouse_name
            FROM outbound_orders o
            JOIN customers c ON c.id = o.customer_id
            JOIN warehouses w ON w.id = o.warehouse_id
            WHERE o.id = $1
            "#,
            ORDER_COLUMNS
        );
        let entry = sqlx::query_as::<_, OrderListEntry>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(entry)
    }

    pub async fn lines<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Vec<OrderLineView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, OrderLineView>(
            r#"
            SELECT l.id, l.inventory_item_id, i.sku, i.description, l.quantity, i.quantity AS on_hand
            FROM outbound_order_items l
            JOIN inventory_items i ON i.id = l.inventory_item_id
            WHERE l.order_id = $1
            ORDER BY l.created_at ASC, i.sku ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }

    /// Insere o cabeçalho. Um número repetido volta como
    /// `UniqueConstraintViolation(ORDER_NUMBER_CONSTRAINT)` para o serviço sortear outro.
    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        order_number: &str,
        order: &NewOrder,
        created_by: Uuid,
    ) -> Result<OutboundOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO outbound_orders AS o (
                order_number, customer_id, warehouse_id, order_type, status,
                requested_date, scheduled_date, ship_to_name, ship_to_address, carrier, notes,
                total_items, total_quantity, handling_charges, delivery_charges, total_charges,
                created_by
            )
            VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        sqlx::query_as::<_, OutboundOrder>(&sql)
            .bind(order_number)
            .bind(order.customer_id)
            .bind(order.warehouse_id)
            .bind(order.order_type)
            .bind(order.requested_date)
            .bind(order.scheduled_date)
            .bind(order.ship_to_name.as_deref())
            .bind(order.ship_to_address.as_deref())
            .bind(order.carrier.as_deref())
            .bind(order.notes.as_deref())
            .bind(order.total_items)
            .bind(order.total_quantity)
            .bind(order.handling_charges)
            .bind(order.delivery_charges)
            .bind(order.total_charges)
            .bind(created_by)
            .fetch_one(executor)
            .await
            .map_err(|e| match constraint_name(&e).as_deref() {
                Some(ORDER_NUMBER_CONSTRAINT) => {
                    AppError::UniqueConstraintViolation(ORDER_NUMBER_CONSTRAINT.to_string())
                }
                Some("outbound_orders_customer_id_fkey") => AppError::NotFound("customer"),
                Some("outbound_orders_warehouse_id_fkey") => AppError::NotFound("warehouse"),
                _ => e.into(),
            })
    }

    pub async fn insert_line<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        inventory_item_id: Uuid,
        quantity: i32,
    ) -> Result<OutboundOrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OutboundOrderItem>(
            r#"
            INSERT INTO outbound_order_items (order_id, inventory_item_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, order_id, inventory_item_id, quantity, created_at
            "#,
        )
        .bind(order_id)
        .bind(inventory_item_id)
        .bind(quantity)
        .fetch_one(executor)
        .await
        .map_err(|e| match constraint_name(&e).as_deref() {
            Some("outbound_order_items_inventory_item_fkey") => AppError::NotFound("inventory_item"),
            _ => e.into(),
        })
    }

    /// Grava os campos editáveis de um pedido já mesclado.
    pub async fn update<'e, E>(&self, executor: E, order: &OutboundOrder) -> Result<OutboundOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE outbound_orders AS o SET
                requested_date = $2, scheduled_date = $3, ship_to_name = $4,
                ship_to_address = $5, carrier = $6, tracking_number = $7, notes = $8,
                handling_charges = $9, delivery_charges = $10, total_charges = $11,
                updated_at = now()
            WHERE o.id = $1
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        sqlx::query_as::<_, OutboundOrder>(&sql)
            .bind(order.id)
            .bind(order.requested_date)
            .bind(order.scheduled_date)
            .bind(order.ship_to_name.as_deref())
            .bind(order.ship_to_address.as_deref())
            .bind(order.carrier.as_deref())
            .bind(order.tracking_number.as_deref())
            .bind(order.notes.as_deref())
            .bind(order.handling_charges)
            .bind(order.delivery_charges)
            .bind(order.total_charges)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound("order"))
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: OrderStatus,
        completed_date: Option<NaiveDate>,
    ) -> Result<OutboundOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE outbound_orders AS o
            SET status = $2, completed_date = $3, updated_at = now()
            WHERE o.id = $1
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        sqlx::query_as::<_, OutboundOrder>(&sql)
            .bind(id)
            .bind(status)
            .bind(completed_date)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound("order"))
    }

    /// As linhas saem junto (ON DELETE CASCADE).
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM outbound_orders WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pedidos com data solicitada dentro do intervalo (inclusivo), matéria-prima dos relatórios.
    pub async fn report_rows<'e, E>(
        &self,
        executor: E,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<ReportOrderRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {}, c.name AS customer_name
            FROM outbound_orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE ($1::date IS NULL OR o.requested_date >= $1)
              AND ($2::date IS NULL OR o.requested_date <= $2)
              AND ($3::uuid IS NULL OR o.customer_id = $3)
            ORDER BY o.requested_date ASC, o.order_number ASC
            "#,
            ORDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, ReportOrderRow>(&sql)
            .bind(from)
            .bind(to)
            .bind(customer_id)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}
