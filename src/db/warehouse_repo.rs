// src/db/warehouse_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{constraint_name, is_foreign_key_violation, AppError},
    models::warehouses::{Warehouse, WarehousePayload},
};

const WAREHOUSE_COLUMNS: &str = r#"
    id, code, name, address_line1, address_line2, city, state, postal_code, country,
    capacity, is_active, created_at, updated_at
"#;

#[derive(Clone, Default)]
pub struct WarehouseRepository;

fn map_code_conflict(e: sqlx::Error, code: &str) -> AppError {
    match constraint_name(&e).as_deref() {
        Some("warehouses_code_key") => AppError::WarehouseCodeAlreadyExists(code.to_string()),
        _ => e.into(),
    }
}

impl WarehouseRepository {
    pub async fn list<'e, E>(&self, executor: E, only_active: bool) -> Result<Vec<Warehouse>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM warehouses WHERE (NOT $1 OR is_active) ORDER BY name ASC",
            WAREHOUSE_COLUMNS
        );
        let warehouses = sqlx::query_as::<_, Warehouse>(&sql)
            .bind(only_active)
            .fetch_all(executor)
            .await?;
        Ok(warehouses)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Warehouse>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM warehouses WHERE id = $1", WAREHOUSE_COLUMNS);
        let warehouse = sqlx::query_as::<_, Warehouse>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(warehouse)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &WarehousePayload) -> Result<Warehouse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO warehouses (
                code, name, address_line1, address_line2, city, state, postal_code, country,
                capacity, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            WAREHOUSE_COLUMNS
        );
        sqlx::query_as::<_, Warehouse>(&sql)
            .bind(&payload.code)
            .bind(&payload.name)
            .bind(payload.address_line1.as_deref())
            .bind(payload.address_line2.as_deref())
            .bind(payload.city.as_deref())
            .bind(payload.state.as_deref())
            .bind(payload.postal_code.as_deref())
            .bind(payload.country.as_deref())
            .bind(payload.capacity)
            .bind(payload.is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| map_code_conflict(e, &payload.code))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &WarehousePayload,
    ) -> Result<Option<Warehouse>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE warehouses SET
                code = $2, name = $3, address_line1 = $4, address_line2 = $5, city = $6,
                state = $7, postal_code = $8, country = $9, capacity = $10, is_active = $11,
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            WAREHOUSE_COLUMNS
        );
        sqlx::query_as::<_, Warehouse>(&sql)
            .bind(id)
            .bind(&payload.code)
            .bind(&payload.name)
            .bind(payload.address_line1.as_deref())
            .bind(payload.address_line2.as_deref())
            .bind(payload.city.as_deref())
            .bind(payload.state.as_deref())
            .bind(payload.postal_code.as_deref())
            .bind(payload.country.as_deref())
            .bind(payload.capacity)
            .bind(payload.is_active)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_code_conflict(e, &payload.code))
    }

    /// Falha com `RecordInUse` enquanto houver estoque ou pedidos apontando para o armazém.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return AppError::RecordInUse("warehouse");
                }
                e.into()
            })?;
        Ok(result.rows_affected() > 0)
    }
}
