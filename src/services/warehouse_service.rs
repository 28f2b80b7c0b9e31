// src/services/warehouse_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::WarehouseRepository,
    models::warehouses::{Warehouse, WarehousePayload},
};

#[derive(Clone)]
pub struct WarehouseService {
    repo: WarehouseRepository,
}

impl WarehouseService {
    pub fn new(repo: WarehouseRepository) -> Self {
        Self { repo }
    }

    pub async fn list_warehouses<'e, E>(&self, executor: E, only_active: bool) -> Result<Vec<Warehouse>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, only_active).await
    }

    pub async fn get_warehouse<'e, E>(&self, executor: E, id: Uuid) -> Result<Warehouse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::NotFound("warehouse"))
    }

    pub async fn create_warehouse<'e, E>(
        &self,
        executor: E,
        payload: &WarehousePayload,
    ) -> Result<Warehouse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create(executor, payload).await
    }

    pub async fn update_warehouse<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &WarehousePayload,
    ) -> Result<Warehouse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, id, payload)
            .await?
            .ok_or(AppError::NotFound("warehouse"))
    }

    pub async fn delete_warehouse<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, id).await? {
            return Err(AppError::NotFound("warehouse"));
        }
        Ok(())
    }
}
