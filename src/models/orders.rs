// src/models/orders.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::validation::{check_date_range, validate_not_negative};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "order_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Shipping,
    Pickup,
}

/// Status do pedido. A ordem de declaração é a ordem do fluxo;
/// `Cancelled` fica fora da sequência.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Picking,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const FLOW: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Picking,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    fn rank(self) -> Option<usize> {
        Self::FLOW.iter().position(|s| *s == self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Só avança (pode pular etapas); cancelamento vale em qualquer estado não final.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() || self == next {
            return false;
        }
        if next == OrderStatus::Cancelled {
            return true;
        }
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Picking => "picking",
            OrderStatus::Packed => "packed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

// --- Structs de Pedido ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutboundOrder {
    pub id: Uuid,
    #[schema(example = "ORD-2026-04821")]
    pub order_number: String,
    pub customer_id: Uuid,
    pub warehouse_id: Uuid,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub requested_date: NaiveDate,
    pub scheduled_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
    pub ship_to_name: Option<String>,
    pub ship_to_address: Option<String>,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    #[schema(example = 2)]
    pub total_items: i32,
    #[schema(example = 5)]
    pub total_quantity: i32,
    #[schema(example = "10.00")]
    pub handling_charges: Decimal,
    #[schema(example = "5.00")]
    pub delivery_charges: Decimal,
    #[schema(example = "15.00")]
    pub total_charges: Decimal,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutboundOrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub inventory_item_id: Uuid,
    #[schema(example = 3)]
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Linha do pedido já com os dados do item de estoque (para a tela de detalhe).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub id: Uuid,
    pub inventory_item_id: Uuid,
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub on_hand: i32,
}

/// Pedido com nomes de cliente/armazém, para as listagens.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderListEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: OutboundOrder,
    pub customer_name: String,
    pub warehouse_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: OrderListEntry,
    pub items: Vec<OrderLineView>,
}

// --- Rascunho (assistente de criação) ---

/// Linha do rascunho. `available` é o saldo do item no momento em que a linha foi
/// adicionada; a conferência no envio usa esse valor, não o estoque atual.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    pub inventory_item_id: Uuid,
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub available: i32,
}

/// Pedido pronto para gravar: o que a etapa de revisão mostra.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub warehouse_id: Uuid,
    pub order_type: OrderType,
    pub requested_date: NaiveDate,
    pub scheduled_date: Option<NaiveDate>,
    pub ship_to_name: Option<String>,
    pub ship_to_address: Option<String>,
    pub carrier: Option<String>,
    pub notes: Option<String>,
    pub total_items: i32,
    pub total_quantity: i32,
    pub handling_charges: Decimal,
    pub delivery_charges: Decimal,
    pub total_charges: Decimal,
    pub lines: Vec<DraftLine>,
}

// --- Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    pub inventory_item_id: Uuid,
    #[validate(range(min = 1, message = "validation.quantity_min"))]
    #[schema(example = 3)]
    pub quantity: i32,
}

fn validate_create_dates(payload: &CreateOrderPayload) -> Result<(), ValidationError> {
    check_date_range(Some(payload.requested_date), payload.scheduled_date)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateOrderPayload {
    pub customer_id: Uuid,
    pub warehouse_id: Uuid,
    #[serde(default)]
    pub order_type: OrderType,
    pub requested_date: NaiveDate,
    pub scheduled_date: Option<NaiveDate>,
    pub ship_to_name: Option<String>,
    pub ship_to_address: Option<String>,
    pub carrier: Option<String>,
    pub notes: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub handling_charges: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub delivery_charges: Decimal,

    #[validate(length(min = 1, message = "validation.items_required"), nested)]
    pub items: Vec<OrderLinePayload>,
}

fn validate_update_dates(payload: &UpdateOrderPayload) -> Result<(), ValidationError> {
    check_date_range(payload.requested_date, payload.scheduled_date)
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_dates"))]
pub struct UpdateOrderPayload {
    pub requested_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub ship_to_name: Option<String>,
    pub ship_to_address: Option<String>,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub handling_charges: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub delivery_charges: Option<Decimal>,
}

impl UpdateOrderPayload {
    pub fn merge_into(self, current: &OutboundOrder) -> OutboundOrder {
        let mut next = current.clone();
        if let Some(v) = self.requested_date { next.requested_date = v; }
        if let Some(v) = self.scheduled_date { next.scheduled_date = Some(v); }
        if let Some(v) = self.ship_to_name { next.ship_to_name = Some(v); }
        if let Some(v) = self.ship_to_address { next.ship_to_address = Some(v); }
        if let Some(v) = self.carrier { next.carrier = Some(v); }
        if let Some(v) = self.tracking_number { next.tracking_number = Some(v); }
        if let Some(v) = self.notes { next.notes = Some(v); }
        if let Some(v) = self.handling_charges { next.handling_charges = v; }
        if let Some(v) = self.delivery_charges { next.delivery_charges = v; }
        // Cobrança fixa por pedido, não por linha
        next.total_charges = next.handling_charges + next.delivery_charges;
        next
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusPayload {
    #[schema(example = "confirmed")]
    pub status: OrderStatus,
}

fn validate_filter_dates(filter: &OrderFilter) -> Result<(), ValidationError> {
    check_date_range(filter.from, filter.to)
}

#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
#[validate(schema(function = "validate_filter_dates"))]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    /// Data solicitada inicial (inclusiva)
    pub from: Option<NaiveDate>,
    /// Data solicitada final (inclusiva)
    pub to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn status_only_moves_forward() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Shipped));
        assert!(Packed.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Picking));
        assert!(!Confirmed.can_transition_to(Confirmed));
    }

    #[test]
    fn cancel_is_allowed_until_a_terminal_state() {
        for status in [Pending, Confirmed, Picking, Packed, Shipped] {
            assert!(status.can_transition_to(Cancelled), "{} -> cancelled", status);
        }
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn display_matches_the_wire_format() {
        for status in OrderStatus::FLOW.into_iter().chain([Cancelled]) {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn order_payload_needs_at_least_one_valid_line() {
        let mut payload: CreateOrderPayload = serde_json::from_value(serde_json::json!({
            "customerId": Uuid::new_v4(),
            "warehouseId": Uuid::new_v4(),
            "requestedDate": "2026-05-04",
            "items": []
        }))
        .unwrap();
        assert!(payload.validate().is_err());

        payload.items.push(OrderLinePayload { inventory_item_id: Uuid::new_v4(), quantity: 0 });
        assert!(payload.validate().is_err());

        payload.items[0].quantity = 2;
        assert!(payload.validate().is_ok());
        assert_eq!(payload.order_type, OrderType::Shipping);
        assert_eq!(payload.handling_charges, Decimal::ZERO);
    }

    #[test]
    fn scheduled_date_cannot_precede_the_request() {
        let mut payload: CreateOrderPayload = serde_json::from_value(serde_json::json!({
            "customerId": Uuid::new_v4(),
            "warehouseId": Uuid::new_v4(),
            "requestedDate": "2026-03-10",
            "scheduledDate": "2026-03-01",
            "items": [{ "inventoryItemId": Uuid::new_v4(), "quantity": 1 }]
        }))
        .unwrap();
        assert!(payload.validate().is_err());

        payload.scheduled_date = NaiveDate::from_ymd_opt(2026, 3, 10);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn charges_are_limited_to_cents() {
        let payload: CreateOrderPayload = serde_json::from_value(serde_json::json!({
            "customerId": Uuid::new_v4(),
            "warehouseId": Uuid::new_v4(),
            "requestedDate": "2026-03-10",
            "handlingCharges": 0.005,
            "deliveryCharges": 0.005,
            "items": [{ "inventoryItemId": Uuid::new_v4(), "quantity": 1 }]
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("handling_charges"));
        assert!(fields.contains_key("delivery_charges"));
    }
}
