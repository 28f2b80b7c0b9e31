// src/services/customer_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CustomerRepository,
    models::customers::{Customer, CustomerFilter, CustomerPayload},
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository) -> Self {
        Self { repo }
    }

    pub async fn list_customers<'e, E>(
        &self,
        executor: E,
        filter: &CustomerFilter,
    ) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, filter).await
    }

    pub async fn get_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::NotFound("customer"))
    }

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        payload: &CustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = self.repo.create(executor, payload).await?;
        tracing::info!(customer_id = %customer.id, code = %customer.code, "Cliente criado");
        Ok(customer)
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &CustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, id, payload)
            .await?
            .ok_or(AppError::NotFound("customer"))
    }

    /// Remove o cliente com estoque, pedidos e linhas numa única transação.
    pub async fn delete_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let orders = self.repo.delete_orders(&mut *tx, id).await?;
        if !self.repo.delete(&mut *tx, id).await? {
            return Err(AppError::NotFound("customer"));
        }

        tx.commit().await?;
        tracing::info!(customer_id = %id, orders, "Cliente excluído com estoque e pedidos");
        Ok(())
    }
}
