// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

/// Monta o router completo da API sobre o estado já inicializado.
pub fn app(app_state: AppState) -> Router {
    // Rotas de autenticação: sessão e logout exigem token, o resto é público
    let auth_routes = Router::new()
        .route("/session", get(handlers::auth::session))
        .route("/logout", post(handlers::auth::logout))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/password-reset", post(handlers::auth::request_password_reset))
        .route("/password-reset/confirm", post(handlers::auth::reset_password))
        .route("/magic-link", post(handlers::auth::request_magic_link))
        .route("/magic-link/verify", post(handlers::auth::verify_magic_link));

    // Armazéns ativos: qualquer usuário autenticado, com ou sem papel
    let warehouse_routes = Router::new()
        .route("/", get(handlers::warehouses::list_active_warehouses))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Portal administrativo: o papel é conferido em cada handler (RequireRole<SuperAdmin>)
    let admin_routes = Router::new()
        .route("/users"
               ,post(handlers::users::provision_user)
               .get(handlers::users::list_users)
        )
        .route("/customers"
               ,post(handlers::customers::create_customer)
               .get(handlers::customers::list_customers)
        )
        .route("/customers/{id}"
               ,get(handlers::customers::get_customer)
               .put(handlers::customers::update_customer)
               .delete(handlers::customers::delete_customer)
        )
        .route("/warehouses"
               ,post(handlers::warehouses::create_warehouse)
               .get(handlers::warehouses::list_warehouses)
        )
        .route("/warehouses/{id}"
               ,get(handlers::warehouses::get_warehouse)
               .put(handlers::warehouses::update_warehouse)
               .delete(handlers::warehouses::delete_warehouse)
        )
        .route("/inventory"
               ,post(handlers::inventory::create_item)
               .get(handlers::inventory::list_items)
        )
        .route("/inventory/available", get(handlers::inventory::available_for_order))
        .route("/inventory/{id}"
               ,get(handlers::inventory::get_item)
               .patch(handlers::inventory::update_item)
               .delete(handlers::inventory::delete_item)
        )
        .route("/orders"
               ,post(handlers::orders::create_order)
               .get(handlers::orders::list_orders)
        )
        .route("/orders/preview", post(handlers::orders::preview_order))
        .route("/orders/{id}"
               ,get(handlers::orders::get_order)
               .patch(handlers::orders::update_order)
               .delete(handlers::orders::delete_order)
        )
        .route("/orders/{id}/status", put(handlers::orders::change_status))
        .route("/dashboard", get(handlers::reports::get_dashboard))
        .route("/reports/summary", get(handlers::reports::get_summary))
        .route("/reports/utilization", get(handlers::reports::get_utilization))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Portal do cliente: PortalCustomer resolve o cliente vinculado
    let portal_routes = Router::new()
        .route("/inventory", get(handlers::portal::list_my_inventory))
        .route("/orders", get(handlers::portal::list_my_orders))
        .route("/orders/{id}", get(handlers::portal::get_my_order))
        .route("/billing", get(handlers::portal::get_my_billing))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/warehouses", warehouse_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/portal", portal_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
