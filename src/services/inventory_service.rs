// src/services/inventory_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::inventory::{
        CreateInventoryItemPayload, InventoryFilter, InventoryItem, InventoryListEntry,
        UpdateInventoryItemPayload,
    },
};

#[derive(Clone)]
pub struct InventoryService {
    repo: InventoryRepository,
}

impl InventoryService {
    pub fn new(repo: InventoryRepository) -> Self {
        Self { repo }
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, filter).await
    }

    /// Portal do cliente: o filtro de cliente é sempre o do usuário logado.
    pub async fn list_customer_items<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        filter: InventoryFilter,
    ) -> Result<Vec<InventoryListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filter = InventoryFilter { customer_id: Some(customer_id), ..filter };
        self.repo.list(executor, &filter).await
    }

    pub async fn get_item<'e, E>(&self, executor: E, id: Uuid) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::NotFound("inventory_item"))
    }

    pub async fn available_for_order<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Vec<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.available_for_order(executor, customer_id, warehouse_id).await
    }

    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        payload: &CreateInventoryItemPayload,
    ) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let received_date = payload.received_date.unwrap_or_else(|| Utc::now().date_naive());
        let item = self.repo.create(executor, payload, received_date).await?;
        tracing::info!(item_id = %item.id, sku = %item.sku, customer_id = %item.customer_id, "Item de estoque recebido");
        Ok(item)
    }

    /// Edição parcial: mescla com o registro atual e revalida `quantity <= total_quantity`.
    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: UpdateInventoryItemPayload,
    ) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inventory_item"))?;

        let next = payload.merge_into(&current).map_err(|_| {
            AppError::field("quantity", "quantity_exceeds_total", "validation.quantity_exceeds_total")
        })?;

        let updated = self.repo.update(&mut *tx, &next).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_item<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, id).await? {
            return Err(AppError::NotFound("inventory_item"));
        }
        Ok(())
    }
}
