pub mod auth;
pub mod customers;
pub mod inventory;
pub mod orders;
pub mod reports;
pub mod roles;
pub mod validation;
pub mod warehouses;
