pub mod auth;
pub mod customers;
pub mod inventory;
pub mod orders;
pub mod portal;
pub mod reports;
pub mod users;
pub mod warehouses;
