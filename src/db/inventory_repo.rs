// src/db/inventory_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{constraint_name, is_foreign_key_violation, AppError},
    models::inventory::{
        CreateInventoryItemPayload, InventoryFilter, InventoryItem, InventoryListEntry,
    },
};

const ITEM_COLUMNS: &str = r#"
    i.id, i.customer_id, i.warehouse_id, i.sku, i.description,
    i.quantity, i.total_quantity, i.unit_of_measure,
    i.weight, i.length, i.width, i.height,
    i.location_code, i.lot_number, i.status, i.received_date, i.notes,
    i.created_at, i.updated_at
"#;

#[derive(Clone, Default)]
pub struct InventoryRepository;

// Violações que o banco pode devolver na escrita de um item
fn map_write_error(e: sqlx::Error) -> AppError {
    match constraint_name(&e).as_deref() {
        Some("inventory_items_quantity_bounds") => AppError::QuantityExceedsTotal,
        Some("inventory_items_customer_id_fkey") => AppError::NotFound("customer"),
        Some("inventory_items_warehouse_id_fkey") => AppError::NotFound("warehouse"),
        _ => e.into(),
    }
}

impl InventoryRepository {
    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {}, c.name AS customer_name, w.name AS warehouse_name
            FROM inventory_items i
            JOIN customers c ON c.id = i.customer_id
            JOIN warehouses w ON w.id = i.warehouse_id
            WHERE ($1::uuid IS NULL OR i.customer_id = $1)
              AND ($2::uuid IS NULL OR i.warehouse_id = $2)
              AND ($3::inventory_status IS NULL OR i.status = $3)
              AND ($4::text IS NULL OR i.sku ILIKE '%' || $4 || '%' OR i.description ILIKE '%' || $4 || '%')
            ORDER BY i.received_date DESC, i.sku ASC
            "#,
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, InventoryListEntry>(&sql)
            .bind(filter.customer_id)
            .bind(filter.warehouse_id)
            .bind(filter.status)
            .bind(filter.search.as_deref())
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM inventory_items i WHERE i.id = $1", ITEM_COLUMNS);
        let item = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    /// Itens que podem entrar num pedido do cliente a partir do armazém escolhido.
    pub async fn available_for_order<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Vec<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {}
            FROM inventory_items i
            WHERE i.customer_id = $1
              AND i.warehouse_id = $2
              AND i.status = 'in_stock'
              AND i.quantity > 0
            ORDER BY i.sku ASC
            "#,
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(customer_id)
            .bind(warehouse_id)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &CreateInventoryItemPayload,
        received_date: NaiveDate,
    ) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO inventory_items AS i (
                customer_id, warehouse_id, sku, description, quantity, total_quantity,
                unit_of_measure, weight, length, width, height, location_code, lot_number,
                status, received_date, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        );
        sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(payload.customer_id)
            .bind(payload.warehouse_id)
            .bind(&payload.sku)
            .bind(payload.description.as_deref())
            .bind(payload.quantity)
            .bind(payload.total_quantity)
            .bind(payload.unit_of_measure)
            .bind(payload.weight)
            .bind(payload.length)
            .bind(payload.width)
            .bind(payload.height)
            .bind(payload.location_code.as_deref())
            .bind(payload.lot_number.as_deref())
            .bind(payload.status)
            .bind(received_date)
            .bind(payload.notes.as_deref())
            .fetch_one(executor)
            .await
            .map_err(map_write_error)
    }

    /// Grava o item já mesclado (ver `UpdateInventoryItemPayload::merge_into`).
    pub async fn update<'e, E>(&self, executor: E, item: &InventoryItem) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE inventory_items AS i SET
                warehouse_id = $2, sku = $3, description = $4, quantity = $5,
                total_quantity = $6, unit_of_measure = $7, weight = $8, length = $9,
                width = $10, height = $11, location_code = $12, lot_number = $13,
                status = $14, received_date = $15, notes = $16, updated_at = now()
            WHERE i.id = $1
            RETURNING {}
            "#,
            ITEM_COLUMNS
        );
        sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(item.id)
            .bind(item.warehouse_id)
            .bind(&item.sku)
            .bind(item.description.as_deref())
            .bind(item.quantity)
            .bind(item.total_quantity)
            .bind(item.unit_of_measure)
            .bind(item.weight)
            .bind(item.length)
            .bind(item.width)
            .bind(item.height)
            .bind(item.location_code.as_deref())
            .bind(item.lot_number.as_deref())
            .bind(item.status)
            .bind(item.received_date)
            .bind(item.notes.as_deref())
            .fetch_optional(executor)
            .await
            .map_err(map_write_error)?
            .ok_or(AppError::NotFound("inventory_item"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                // Ainda referenciado por uma linha de pedido
                if is_foreign_key_violation(&e) {
                    return AppError::RecordInUse("inventory_item");
                }
                e.into()
            })?;
        Ok(result.rows_affected() > 0)
    }
}
