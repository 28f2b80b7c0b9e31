// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::session,
        handlers::auth::logout,
        handlers::auth::request_password_reset,
        handlers::auth::reset_password,
        handlers::auth::request_magic_link,
        handlers::auth::verify_magic_link,

        // --- Users ---
        handlers::users::provision_user,
        handlers::users::list_users,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Warehouses ---
        handlers::warehouses::list_active_warehouses,
        handlers::warehouses::list_warehouses,
        handlers::warehouses::get_warehouse,
        handlers::warehouses::create_warehouse,
        handlers::warehouses::update_warehouse,
        handlers::warehouses::delete_warehouse,

        // --- INVENTORY ---
        handlers::inventory::list_items,
        handlers::inventory::available_for_order,
        handlers::inventory::get_item,
        handlers::inventory::create_item,
        handlers::inventory::update_item,
        handlers::inventory::delete_item,

        // --- ORDERS ---
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::preview_order,
        handlers::orders::create_order,
        handlers::orders::update_order,
        handlers::orders::change_status,
        handlers::orders::delete_order,

        // --- Reports ---
        handlers::reports::get_dashboard,
        handlers::reports::get_summary,
        handlers::reports::get_utilization,

        // --- Portal ---
        handlers::portal::list_my_inventory,
        handlers::portal::list_my_orders,
        handlers::portal::get_my_order,
        handlers::portal::get_my_billing,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::EmailOnlyPayload,
            models::auth::ResetPasswordPayload,
            models::auth::VerifyMagicLinkPayload,
            models::auth::SessionResponse,

            // --- Roles / Users ---
            models::roles::AppRole,
            models::roles::UserRole,
            models::roles::Profile,
            models::roles::ProvisionUserPayload,
            models::roles::ProvisionedUser,
            models::roles::ProvisionUserResponse,
            models::roles::UserSummary,

            // --- Customers ---
            models::customers::CustomerStatus,
            models::customers::Customer,
            models::customers::CustomerPayload,

            // --- Warehouses ---
            models::warehouses::Warehouse,
            models::warehouses::WarehousePayload,

            // --- Inventory ---
            models::inventory::UnitOfMeasure,
            models::inventory::InventoryStatus,
            models::inventory::InventoryItem,
            models::inventory::InventoryListEntry,
            models::inventory::CreateInventoryItemPayload,
            models::inventory::UpdateInventoryItemPayload,

            // --- Orders ---
            models::orders::OrderType,
            models::orders::OrderStatus,
            models::orders::OutboundOrder,
            models::orders::OutboundOrderItem,
            models::orders::OrderLineView,
            models::orders::OrderListEntry,
            models::orders::OrderDetail,
            models::orders::DraftLine,
            models::orders::NewOrder,
            models::orders::OrderLinePayload,
            models::orders::CreateOrderPayload,
            models::orders::UpdateOrderPayload,
            models::orders::UpdateOrderStatusPayload,

            // --- Reports ---
            models::reports::DashboardSummary,
            models::reports::OrderSummary,
            models::reports::StatusCount,
            models::reports::CustomerRevenue,
            models::reports::MonthlyRevenue,
            models::reports::ReportSummary,
            models::reports::WarehouseUtilization,
            models::reports::BillingStatement,
            models::reports::BillingLine,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação, sessão e recuperação de acesso"),
        (name = "Users", description = "Provisionamento de usuários (super_admin)"),
        (name = "Customers", description = "Cadastro de clientes"),
        (name = "Warehouses", description = "Cadastro de armazéns"),
        (name = "Inventory", description = "Estoque dos clientes"),
        (name = "Orders", description = "Pedidos de saída e assistente de criação"),
        (name = "Reports", description = "Painel, receita e ocupação"),
        (name = "Portal", description = "Portal do cliente (somente leitura)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
