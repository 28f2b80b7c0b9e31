// src/db/customer_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{constraint_name, AppError},
    models::customers::{Customer, CustomerFilter, CustomerPayload},
};

const CUSTOMER_COLUMNS: &str = r#"
    id, code, name, contact_name, email, phone,
    address_line1, address_line2, city, state, postal_code, country,
    billing_email, status, credit_terms_days, credit_limit, notes,
    created_at, updated_at
"#;

// Todas as consultas passam pela transação RLS recebida como executor.
#[derive(Clone, Default)]
pub struct CustomerRepository;

fn map_code_conflict(e: sqlx::Error, code: &str) -> AppError {
    match constraint_name(&e).as_deref() {
        Some("customers_code_key") => AppError::CustomerCodeAlreadyExists(code.to_string()),
        _ => e.into(),
    }
}

impl CustomerRepository {
    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &CustomerFilter,
    ) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {}
            FROM customers
            WHERE ($1::customer_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR code ILIKE '%' || $2 || '%')
            ORDER BY name ASC
            "#,
            CUSTOMER_COLUMNS
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(filter.status)
            .bind(filter.search.as_deref())
            .fetch_all(executor)
            .await?;
        Ok(customers)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS);
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CustomerPayload) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO customers (
                code, name, contact_name, email, phone,
                address_line1, address_line2, city, state, postal_code, country,
                billing_email, status, credit_terms_days, credit_limit, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        );
        sqlx::query_as::<_, Customer>(&sql)
            .bind(&payload.code)
            .bind(&payload.name)
            .bind(payload.contact_name.as_deref())
            .bind(payload.email.as_deref())
            .bind(payload.phone.as_deref())
            .bind(payload.address_line1.as_deref())
            .bind(payload.address_line2.as_deref())
            .bind(payload.city.as_deref())
            .bind(payload.state.as_deref())
            .bind(payload.postal_code.as_deref())
            .bind(payload.country.as_deref())
            .bind(payload.billing_email.as_deref())
            .bind(payload.status)
            .bind(payload.credit_terms_days)
            .bind(payload.credit_limit)
            .bind(payload.notes.as_deref())
            .fetch_one(executor)
            .await
            .map_err(|e| map_code_conflict(e, &payload.code))
    }

    /// PUT: substitui o cadastro inteiro.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &CustomerPayload,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE customers SET
                code = $2, name = $3, contact_name = $4, email = $5, phone = $6,
                address_line1 = $7, address_line2 = $8, city = $9, state = $10,
                postal_code = $11, country = $12, billing_email = $13, status = $14,
                credit_terms_days = $15, credit_limit = $16, notes = $17,
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        );
        sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .bind(&payload.code)
            .bind(&payload.name)
            .bind(payload.contact_name.as_deref())
            .bind(payload.email.as_deref())
            .bind(payload.phone.as_deref())
            .bind(payload.address_line1.as_deref())
            .bind(payload.address_line2.as_deref())
            .bind(payload.city.as_deref())
            .bind(payload.state.as_deref())
            .bind(payload.postal_code.as_deref())
            .bind(payload.country.as_deref())
            .bind(payload.billing_email.as_deref())
            .bind(payload.status)
            .bind(payload.credit_terms_days)
            .bind(payload.credit_limit)
            .bind(payload.notes.as_deref())
            .fetch_optional(executor)
            .await
            .map_err(|e| map_code_conflict(e, &payload.code))
    }

    /// Pedidos do cliente (as linhas saem por ON DELETE CASCADE). Precisa rodar antes de
    /// `delete`: as linhas ainda apontam para o estoque que a cascata do cliente remove.
    pub async fn delete_orders<'e, E>(&self, executor: E, customer_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM outbound_orders WHERE customer_id = $1")
            .bind(customer_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Exclusão definitiva. Estoque e papéis vão junto (ON DELETE CASCADE).
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
