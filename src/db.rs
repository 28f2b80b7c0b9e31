pub mod user_repo;
pub use user_repo::UserRepository;
pub mod role_repo;
pub use role_repo::RoleRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod warehouse_repo;
pub use warehouse_repo::WarehouseRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
