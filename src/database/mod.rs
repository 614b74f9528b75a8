pub mod manager;
pub mod models;
pub mod stores;

pub use manager::{DatabaseError, DatabaseManager};
pub use stores::{StoreError, Stores};
