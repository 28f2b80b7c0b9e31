// src/services/order_service.rs

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{order_repo::ORDER_NUMBER_CONSTRAINT, InventoryRepository, OrderRepository},
    models::orders::{
        CreateOrderPayload, NewOrder, OrderDetail, OrderFilter, OrderListEntry, OrderStatus,
        OutboundOrder, UpdateOrderPayload,
    },
    models::validation::check_amount,
    services::order_workflow::{generate_order_number, DraftHeader, OrderDraft},
};

const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// `completed_date` é carimbada na primeira chegada a `delivered` e nunca sobrescrita.
pub fn completed_date_for(
    next: OrderStatus,
    current: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    match (next, current) {
        (OrderStatus::Delivered, None) => Some(today),
        (_, current) => current,
    }
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    inventory_repo: InventoryRepository,
}

impl OrderService {
    pub fn new(repo: OrderRepository, inventory_repo: InventoryRepository) -> Self {
        Self { repo, inventory_repo }
    }

    // Passa o payload pelo assistente: etapa de itens (uma linha por item) e revisão.
    async fn draft_from_payload(
        &self,
        conn: &mut PgConnection,
        payload: &CreateOrderPayload,
    ) -> Result<NewOrder, AppError> {
        let mut draft = OrderDraft::new(DraftHeader::from(payload));

        for line in &payload.items {
            let item = self
                .inventory_repo
                .find_by_id(&mut *conn, line.inventory_item_id)
                .await?
                .ok_or(AppError::NotFound("inventory_item"))?;
            draft.add_line(&item, line.quantity)?;
        }

        draft.submit()
    }

    /// Totais da etapa de revisão, sem gravar nada.
    pub async fn preview_order<'e, E>(&self, executor: E, payload: &CreateOrderPayload) -> Result<NewOrder, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let preview = self.draft_from_payload(&mut tx, payload).await?;
        tx.rollback().await?;
        Ok(preview)
    }

    /// Cabeçalho e linhas numa transação só: ou o pedido sai completo, ou não sai.
    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        payload: &CreateOrderPayload,
        created_by: Uuid,
    ) -> Result<OutboundOrder, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let new_order = self.draft_from_payload(&mut tx, payload).await?;
        let order = self
            .insert_with_fresh_number(&mut tx, &new_order, created_by, Utc::now().year())
            .await?;

        for line in &new_order.lines {
            self.repo
                .insert_line(&mut *tx, order.id, line.inventory_item_id, line.quantity)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total_items = order.total_items,
            total_quantity = order.total_quantity,
            "Pedido criado"
        );
        Ok(order)
    }

    // Cada tentativa roda num savepoint: a violação de unicidade não aborta a transação externa.
    async fn insert_with_fresh_number(
        &self,
        conn: &mut PgConnection,
        new_order: &NewOrder,
        created_by: Uuid,
        year: i32,
    ) -> Result<OutboundOrder, AppError> {
        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let order_number = generate_order_number(year, &mut rand::thread_rng());

            let mut savepoint = (&mut *conn).begin().await?;
            match self
                .repo
                .insert_order(&mut *savepoint, &order_number, new_order, created_by)
                .await
            {
                Ok(order) => {
                    savepoint.commit().await?;
                    return Ok(order);
                }
                Err(AppError::UniqueConstraintViolation(constraint))
                    if constraint == ORDER_NUMBER_CONSTRAINT =>
                {
                    tracing::warn!(attempt, order_number = %order_number, "Número de pedido repetido, sorteando outro");
                    savepoint.rollback().await?;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(year, "Números de pedido esgotados após {} tentativas", MAX_ORDER_NUMBER_ATTEMPTS);
        Err(AppError::OrderNumberExhausted)
    }

    pub async fn list_orders<'e, E>(&self, executor: E, filter: &OrderFilter) -> Result<Vec<OrderListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, filter).await
    }

    /// Portal do cliente: o filtro de cliente é sempre o do usuário logado.
    pub async fn list_customer_orders<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        filter: OrderFilter,
    ) -> Result<Vec<OrderListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filter = OrderFilter { customer_id: Some(customer_id), ..filter };
        self.repo.list(executor, &filter).await
    }

    /// Detalhe com as linhas. `owner` restringe ao cliente do portal.
    pub async fn get_order_detail<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let header = self
            .repo
            .find_entry(&mut *tx, id)
            .await?
            .filter(|entry| owner.is_none_or(|customer_id| entry.order.customer_id == customer_id))
            .ok_or(AppError::NotFound("order"))?;

        let items = self.repo.lines(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(OrderDetail { header, items })
    }

    pub async fn update_order<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: UpdateOrderPayload,
    ) -> Result<OutboundOrder, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("order"))?;

        let next = payload.merge_into(&current);
        if let Some(scheduled) = next.scheduled_date {
            if scheduled < next.requested_date {
                return Err(AppError::field("scheduled_date", "date_range", "validation.date_range"));
            }
        }
        check_amount(&next.total_charges)
            .map_err(|_| AppError::field("delivery_charges", "range", "validation.amount_too_large"))?;

        let updated = self.repo.update(&mut *tx, &next).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Só avança no fluxo; `cancelled` vale a partir de qualquer estado não final.
    pub async fn change_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        next: OrderStatus,
    ) -> Result<OutboundOrder, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("order"))?;

        if !current.status.can_transition_to(next) {
            return Err(AppError::InvalidStatusTransition { from: current.status, to: next });
        }

        let completed_date = completed_date_for(next, current.completed_date, Utc::now().date_naive());
        let updated = self.repo.update_status(&mut *tx, id, next, completed_date).await?;
        tx.commit().await?;

        tracing::info!(
            order_number = %updated.order_number,
            from = %current.status,
            to = %next,
            "Status do pedido alterado"
        );
        Ok(updated)
    }

    pub async fn delete_order<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, id).await? {
            return Err(AppError::NotFound("order"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[test]
    fn delivery_stamps_completion_once() {
        assert_eq!(completed_date_for(OrderStatus::Delivered, None, day(10)), Some(day(10)));
        assert_eq!(completed_date_for(OrderStatus::Delivered, Some(day(3)), day(10)), Some(day(3)));
    }

    #[test]
    fn other_statuses_keep_the_completion_date() {
        assert_eq!(completed_date_for(OrderStatus::Shipped, None, day(10)), None);
        assert_eq!(completed_date_for(OrderStatus::Cancelled, None, day(10)), None);
    }
}
