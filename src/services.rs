pub mod auth;
pub mod customer_service;
pub mod inventory_service;
pub mod mailer;
pub mod order_service;
pub mod order_workflow;
pub mod provisioning_service;
pub mod report_service;
pub mod warehouse_service;
