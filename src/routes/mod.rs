pub mod calculate;
pub mod health;
pub mod index_returns;
pub mod products;
pub mod reports;
