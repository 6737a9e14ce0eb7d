pub mod catalog_repo;
pub mod invoice_repo;
pub mod models;
pub mod side_effects;
pub mod user_repo;
