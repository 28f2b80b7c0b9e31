// src/services/order_workflow.rs
//
// Assistente de criação de pedido: detalhes -> itens -> revisão.

use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        inventory::InventoryItem,
        orders::{CreateOrderPayload, DraftLine, NewOrder, OrderType},
        validation::check_amount,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DraftStage {
    Details,
    Items,
    Review,
}

/// Dados da primeira etapa. Cliente e armazém destravam a etapa de itens.
#[derive(Debug, Clone)]
pub struct DraftHeader {
    pub customer_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub order_type: OrderType,
    pub requested_date: NaiveDate,
    pub scheduled_date: Option<NaiveDate>,
    pub ship_to_name: Option<String>,
    pub ship_to_address: Option<String>,
    pub carrier: Option<String>,
    pub notes: Option<String>,
    pub handling_charges: Decimal,
    pub delivery_charges: Decimal,
}

impl DraftHeader {
    pub fn new(requested_date: NaiveDate) -> Self {
        Self {
            customer_id: None,
            warehouse_id: None,
            order_type: OrderType::default(),
            requested_date,
            scheduled_date: None,
            ship_to_name: None,
            ship_to_address: None,
            carrier: None,
            notes: None,
            handling_charges: Decimal::ZERO,
            delivery_charges: Decimal::ZERO,
        }
    }
}

impl From<&CreateOrderPayload> for DraftHeader {
    fn from(payload: &CreateOrderPayload) -> Self {
        Self {
            customer_id: Some(payload.customer_id),
            warehouse_id: Some(payload.warehouse_id),
            order_type: payload.order_type,
            requested_date: payload.requested_date,
            scheduled_date: payload.scheduled_date,
            ship_to_name: payload.ship_to_name.clone(),
            ship_to_address: payload.ship_to_address.clone(),
            carrier: payload.carrier.clone(),
            notes: payload.notes.clone(),
            handling_charges: payload.handling_charges,
            delivery_charges: payload.delivery_charges,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderDraft {
    header: DraftHeader,
    lines: Vec<DraftLine>,
}

impl OrderDraft {
    pub fn new(header: DraftHeader) -> Self {
        Self { header, lines: Vec::new() }
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    /// Etapa mais avançada que o rascunho já pode abrir.
    pub fn stage(&self) -> DraftStage {
        match (self.header.customer_id, self.header.warehouse_id) {
            (Some(_), Some(_)) if !self.lines.is_empty() => DraftStage::Review,
            (Some(_), Some(_)) => DraftStage::Items,
            _ => DraftStage::Details,
        }
    }

    pub fn can_enter(&self, stage: DraftStage) -> bool {
        stage <= self.stage()
    }

    /// Trocar cliente ou armazém descarta as linhas já escolhidas.
    pub fn choose_parties(&mut self, customer_id: Uuid, warehouse_id: Uuid) {
        let changed = self.header.customer_id != Some(customer_id)
            || self.header.warehouse_id != Some(warehouse_id);
        if changed {
            self.lines.clear();
        }
        self.header.customer_id = Some(customer_id);
        self.header.warehouse_id = Some(warehouse_id);
    }

    /// Adiciona uma linha guardando o saldo atual do item como "disponível".
    pub fn add_line(&mut self, item: &InventoryItem, quantity: i32) -> Result<(), AppError> {
        if !self.can_enter(DraftStage::Items) {
            return Err(AppError::DraftStageLocked("items"));
        }

        let same_owner = Some(item.customer_id) == self.header.customer_id
            && Some(item.warehouse_id) == self.header.warehouse_id;
        if !same_owner || !item.is_orderable() {
            return Err(AppError::InventoryNotOrderable(item.sku.clone()));
        }

        if self.lines.iter().any(|l| l.inventory_item_id == item.id) {
            return Err(AppError::DuplicateOrderLine(item.sku.clone()));
        }

        if quantity < 1 {
            return Err(AppError::field("quantity", "range", "validation.quantity_min"));
        }
        if quantity > item.quantity {
            return Err(AppError::QuantityExceedsAvailable {
                sku: item.sku.clone(),
                requested: quantity,
                available: item.quantity,
            });
        }

        self.lines.push(DraftLine {
            inventory_item_id: item.id,
            sku: item.sku.clone(),
            description: item.description.clone(),
            quantity,
            available: item.quantity,
        });
        Ok(())
    }

    /// Ajuste de quantidade na tela de itens. A conferência com o saldo fica para o envio.
    pub fn set_quantity(&mut self, inventory_item_id: Uuid, quantity: i32) -> Result<(), AppError> {
        if quantity < 1 {
            return Err(AppError::field("quantity", "range", "validation.quantity_min"));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.inventory_item_id == inventory_item_id)
            .ok_or(AppError::NotFound("inventory_item"))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove_line(&mut self, inventory_item_id: Uuid) {
        self.lines.retain(|l| l.inventory_item_id != inventory_item_id);
    }

    /// Etapa de revisão: confere cada linha contra o saldo capturado e calcula os totais.
    pub fn submit(self) -> Result<NewOrder, AppError> {
        if !self.can_enter(DraftStage::Review) {
            return Err(AppError::DraftStageLocked("review"));
        }
        let (Some(customer_id), Some(warehouse_id)) = (self.header.customer_id, self.header.warehouse_id)
        else {
            return Err(AppError::DraftStageLocked("items"));
        };

        if let Some(line) = self.lines.iter().find(|l| l.quantity > l.available) {
            return Err(AppError::QuantityExceedsAvailable {
                sku: line.sku.clone(),
                requested: line.quantity,
                available: line.available,
            });
        }

        let total_items = self.lines.len() as i32;
        let total_quantity = self
            .lines
            .iter()
            .try_fold(0i32, |acc, l| acc.checked_add(l.quantity))
            .ok_or_else(|| AppError::field("items", "range", "validation.total_quantity_too_large"))?;
        // Cobrança fixa por pedido, não por linha
        let total_charges = self.header.handling_charges + self.header.delivery_charges;
        check_amount(&total_charges)
            .map_err(|_| AppError::field("delivery_charges", "range", "validation.amount_too_large"))?;

        let header = self.header;
        Ok(NewOrder {
            customer_id,
            warehouse_id,
            order_type: header.order_type,
            requested_date: header.requested_date,
            scheduled_date: header.scheduled_date,
            ship_to_name: header.ship_to_name,
            ship_to_address: header.ship_to_address,
            carrier: header.carrier,
            notes: header.notes,
            total_items,
            total_quantity,
            handling_charges: header.handling_charges,
            delivery_charges: header.delivery_charges,
            total_charges,
            lines: self.lines,
        })
    }
}

/// `ORD-<ano>-<5 dígitos>`. Não é único por si só; a constraint do banco decide.
pub fn generate_order_number<R: Rng + ?Sized>(year: i32, rng: &mut R) -> String {
    format!("ORD-{}-{}", year, rng.gen_range(10_000..=99_999))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::{InventoryStatus, UnitOfMeasure};
    use crate::models::validation::MAX_AMOUNT;
    use chrono::Utc;
    use rand::{rngs::StdRng, SeedableRng};

    fn item(customer_id: Uuid, warehouse_id: Uuid, sku: &str, quantity: i32) -> InventoryItem {
        let now = Utc::now();
        InventoryItem {
            id: Uuid::new_v4(),
            customer_id,
            warehouse_id,
            sku: sku.into(),
            description: Some(format!("Item {}", sku)),
            quantity,
            total_quantity: quantity.max(1),
            unit_of_measure: UnitOfMeasure::Each,
            weight: None,
            length: None,
            width: None,
            height: None,
            location_code: None,
            lot_number: None,
            status: InventoryStatus::InStock,
            received_date: now.date_naive(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn draft_with_parties() -> (OrderDraft, Uuid, Uuid) {
        let customer_id = Uuid::new_v4();
        let warehouse_id = Uuid::new_v4();
        let mut draft = OrderDraft::new(DraftHeader::new(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()));
        draft.choose_parties(customer_id, warehouse_id);
        (draft, customer_id, warehouse_id)
    }

    #[test]
    fn stages_unlock_in_order() {
        let mut draft = OrderDraft::new(DraftHeader::new(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()));
        assert_eq!(draft.stage(), DraftStage::Details);
        assert!(!draft.can_enter(DraftStage::Items));

        let stray = item(Uuid::new_v4(), Uuid::new_v4(), "A", 5);
        assert!(matches!(draft.add_line(&stray, 1), Err(AppError::DraftStageLocked("items"))));

        let (customer_id, warehouse_id) = (Uuid::new_v4(), Uuid::new_v4());
        draft.choose_parties(customer_id, warehouse_id);
        assert_eq!(draft.stage(), DraftStage::Items);
        assert!(!draft.can_enter(DraftStage::Review));

        draft.add_line(&item(customer_id, warehouse_id, "A", 5), 1).unwrap();
        assert_eq!(draft.stage(), DraftStage::Review);
    }

    #[test]
    fn submit_without_lines_is_locked() {
        let (mut draft, c, w) = draft_with_parties();
        let a = item(c, w, "A", 5);
        draft.add_line(&a, 2).unwrap();
        draft.remove_line(a.id);
        assert_eq!(draft.stage(), DraftStage::Items);
        assert!(matches!(draft.submit(), Err(AppError::DraftStageLocked("review"))));
    }

    #[test]
    fn two_lines_with_flat_charges() {
        let (mut draft, c, w) = draft_with_parties();
        draft.header.handling_charges = Decimal::new(1000, 2);
        draft.header.delivery_charges = Decimal::new(500, 2);

        draft.add_line(&item(c, w, "A", 10), 3).unwrap();
        draft.add_line(&item(c, w, "B", 4), 2).unwrap();

        let order = draft.submit().unwrap();
        assert_eq!(order.total_items, 2);
        assert_eq!(order.total_quantity, 5);
        assert_eq!(order.total_charges, Decimal::new(1500, 2));
        assert_eq!(order.total_quantity, order.lines.iter().map(|l| l.quantity).sum::<i32>());
    }

    #[test]
    fn total_quantity_overflow_is_a_field_error() {
        let (mut draft, c, w) = draft_with_parties();
        draft.add_line(&item(c, w, "A", i32::MAX), i32::MAX).unwrap();
        draft.add_line(&item(c, w, "B", i32::MAX), i32::MAX).unwrap();

        match draft.submit() {
            Err(AppError::ValidationError(errors)) => {
                assert!(errors.field_errors().contains_key("items"));
            }
            other => panic!("esperava erro de validação, veio {:?}", other.map(|o| o.total_quantity)),
        }
    }

    #[test]
    fn total_charges_must_fit_the_money_column() {
        let (mut draft, c, w) = draft_with_parties();
        draft.header.handling_charges = MAX_AMOUNT;
        draft.header.delivery_charges = Decimal::new(1, 2);
        draft.add_line(&item(c, w, "A", 5), 1).unwrap();

        assert!(matches!(draft.submit(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn quantity_is_checked_against_the_snapshot() {
        let (mut draft, c, w) = draft_with_parties();
        let stocked = item(c, w, "A", 5);

        let err = draft.add_line(&stocked, 6).unwrap_err();
        assert!(matches!(err, AppError::QuantityExceedsAvailable { requested: 6, available: 5, .. }));

        draft.add_line(&stocked, 5).unwrap();
        draft.set_quantity(stocked.id, 7).unwrap();
        let err = draft.submit().unwrap_err();
        assert!(matches!(err, AppError::QuantityExceedsAvailable { requested: 7, available: 5, .. }));
    }

    #[test]
    fn snapshot_is_not_rechecked_against_live_stock() {
        let (mut draft, c, w) = draft_with_parties();
        let mut stocked = item(c, w, "A", 5);
        draft.add_line(&stocked, 4).unwrap();

        // Estoque cai depois da linha adicionada: o envio ainda usa o saldo capturado
        stocked.quantity = 1;
        let order = draft.submit().unwrap();
        assert_eq!(order.lines[0].available, 5);
        assert!(order.lines[0].quantity > stocked.quantity);
    }

    #[test]
    fn rejects_duplicates_foreign_and_unavailable_items() {
        let (mut draft, c, w) = draft_with_parties();
        let a = item(c, w, "A", 5);
        draft.add_line(&a, 1).unwrap();
        assert!(matches!(draft.add_line(&a, 1), Err(AppError::DuplicateOrderLine(_))));

        let other_customer = item(Uuid::new_v4(), w, "X", 5);
        assert!(matches!(draft.add_line(&other_customer, 1), Err(AppError::InventoryNotOrderable(_))));

        let mut damaged = item(c, w, "D", 5);
        damaged.status = InventoryStatus::Damaged;
        assert!(matches!(draft.add_line(&damaged, 1), Err(AppError::InventoryNotOrderable(_))));

        assert!(draft.add_line(&item(c, w, "Z", 5), 0).is_err());
    }

    #[test]
    fn changing_parties_clears_lines() {
        let (mut draft, c, w) = draft_with_parties();
        draft.add_line(&item(c, w, "A", 5), 1).unwrap();

        draft.choose_parties(c, w);
        assert_eq!(draft.lines().len(), 1);

        draft.choose_parties(c, Uuid::new_v4());
        assert!(draft.lines().is_empty());
        assert_eq!(draft.stage(), DraftStage::Items);
    }

    #[test]
    fn order_numbers_carry_year_and_five_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let number = generate_order_number(2026, &mut rng);
            let suffix = number.strip_prefix("ORD-2026-").unwrap();
            assert_eq!(suffix.len(), 5);
            assert!(suffix.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
