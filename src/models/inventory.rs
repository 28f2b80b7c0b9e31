// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::validation::{check_quantity_bounds, validate_not_negative};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "unit_of_measure", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    #[default]
    Each,
    Box,
    Case,
    Pallet,
    Kg,
    Lb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "inventory_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    #[default]
    InStock,
    Reserved,
    Shipped,
    Damaged,
}

// --- ITEM DE ESTOQUE (um lote recebido de um cliente, guardado num armazém) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub warehouse_id: Uuid,
    #[schema(example = "SKU-0001")]
    pub sku: String,
    pub description: Option<String>,

    // Quantidade em mãos; nunca maior que total_quantity
    #[schema(example = 8)]
    pub quantity: i32,
    // Quantidade recebida originalmente
    #[schema(example = 10)]
    pub total_quantity: i32,

    pub unit_of_measure: UnitOfMeasure,
    pub weight: Option<Decimal>,
    pub length: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    #[schema(example = "A-03-2")]
    pub location_code: Option<String>,
    pub lot_number: Option<String>,
    pub status: InventoryStatus,
    pub received_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Pode entrar num pedido: em estoque e com saldo.
    pub fn is_orderable(&self) -> bool {
        self.status == InventoryStatus::InStock && self.quantity > 0
    }
}

/// Item com os nomes de cliente e armazém, para as listagens.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryListEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: InventoryItem,
    pub customer_name: String,
    pub warehouse_name: String,
}

fn validate_create_quantities(payload: &CreateInventoryItemPayload) -> Result<(), ValidationError> {
    check_quantity_bounds(payload.quantity, payload.total_quantity)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_quantities"))]
pub struct CreateInventoryItemPayload {
    pub customer_id: Uuid,
    pub warehouse_id: Uuid,

    #[validate(length(min = 1, message = "validation.required"))]
    pub sku: String,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "validation.not_negative"))]
    pub quantity: i32,

    #[validate(range(min = 1, message = "validation.total_quantity_min"))]
    pub total_quantity: i32,

    #[serde(default)]
    pub unit_of_measure: UnitOfMeasure,

    #[validate(custom(function = "validate_not_negative"))]
    pub weight: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub length: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub width: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub height: Option<Decimal>,

    pub location_code: Option<String>,
    pub lot_number: Option<String>,

    #[serde(default)]
    pub status: InventoryStatus,

    // Se não vier, usa a data de hoje
    pub received_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Edição parcial: só os campos enviados mudam. A regra de quantidade é verificada
/// depois de mesclar com o registro atual (ver `merge_into`).
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryItemPayload {
    pub warehouse_id: Option<Uuid>,

    #[validate(length(min = 1, message = "validation.required"))]
    pub sku: Option<String>,
    pub description: Option<String>,

    #[validate(range(min = 0, message = "validation.not_negative"))]
    pub quantity: Option<i32>,

    #[validate(range(min = 1, message = "validation.total_quantity_min"))]
    pub total_quantity: Option<i32>,

    pub unit_of_measure: Option<UnitOfMeasure>,

    #[validate(custom(function = "validate_not_negative"))]
    pub weight: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub length: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub width: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub height: Option<Decimal>,

    pub location_code: Option<String>,
    pub lot_number: Option<String>,
    pub status: Option<InventoryStatus>,
    pub received_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl UpdateInventoryItemPayload {
    /// Aplica a edição sobre uma cópia do item atual e revalida a regra de quantidade.
    pub fn merge_into(self, current: &InventoryItem) -> Result<InventoryItem, ValidationError> {
        let mut next = current.clone();

        if let Some(v) = self.warehouse_id { next.warehouse_id = v; }
        if let Some(v) = self.sku { next.sku = v; }
        if let Some(v) = self.description { next.description = Some(v); }
        if let Some(v) = self.quantity { next.quantity = v; }
        if let Some(v) = self.total_quantity { next.total_quantity = v; }
        if let Some(v) = self.unit_of_measure { next.unit_of_measure = v; }
        if let Some(v) = self.weight { next.weight = Some(v); }
        if let Some(v) = self.length { next.length = Some(v); }
        if let Some(v) = self.width { next.width = Some(v); }
        if let Some(v) = self.height { next.height = Some(v); }
        if let Some(v) = self.location_code { next.location_code = Some(v); }
        if let Some(v) = self.lot_number { next.lot_number = Some(v); }
        if let Some(v) = self.status { next.status = v; }
        if let Some(v) = self.received_date { next.received_date = v; }
        if let Some(v) = self.notes { next.notes = Some(v); }

        check_quantity_bounds(next.quantity, next.total_quantity)?;
        Ok(next)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InventoryFilter {
    pub customer_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub status: Option<InventoryStatus>,
    /// Busca por SKU ou descrição
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_payload(quantity: i32, total_quantity: i32) -> CreateInventoryItemPayload {
        serde_json::from_value(json!({
            "customerId": Uuid::new_v4(),
            "warehouseId": Uuid::new_v4(),
            "sku": "SKU-1",
            "quantity": quantity,
            "totalQuantity": total_quantity
        }))
        .unwrap()
    }

    fn stored_item() -> InventoryItem {
        let now = Utc::now();
        InventoryItem {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            warehouse_id: Uuid::new_v4(),
            sku: "SKU-1".into(),
            description: None,
            quantity: 8,
            total_quantity: 10,
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

    #[test]
    fn quantity_above_total_is_rejected() {
        let errors = create_payload(12, 10).validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn quantity_equal_to_total_is_accepted_with_defaults() {
        let payload = create_payload(10, 10);
        assert!(payload.validate().is_ok());
        assert_eq!(payload.unit_of_measure, UnitOfMeasure::Each);
        assert_eq!(payload.status, InventoryStatus::InStock);
    }

    #[test]
    fn partial_update_is_checked_against_the_stored_total() {
        let current = stored_item();

        let raise = UpdateInventoryItemPayload { quantity: Some(11), ..Default::default() };
        assert!(raise.merge_into(&current).is_err());

        let shrink_total = UpdateInventoryItemPayload { total_quantity: Some(5), ..Default::default() };
        assert!(shrink_total.merge_into(&current).is_err());

        let both = UpdateInventoryItemPayload {
            quantity: Some(15),
            total_quantity: Some(20),
            ..Default::default()
        };
        let merged = both.merge_into(&current).unwrap();
        assert_eq!((merged.quantity, merged.total_quantity), (15, 20));
        assert_eq!(merged.sku, "SKU-1");
    }

    #[test]
    fn only_in_stock_items_with_balance_are_orderable() {
        let mut item = stored_item();
        assert!(item.is_orderable());
        item.quantity = 0;
        assert!(!item.is_orderable());
        item.quantity = 3;
        item.status = InventoryStatus::Damaged;
        assert!(!item.is_orderable());
    }
}
