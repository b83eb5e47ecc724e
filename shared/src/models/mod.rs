//! Domain models shared between server and clients

pub mod inventory;
pub mod product;
pub mod stock_log;

pub use inventory::{CategorySnapshot, IngredientKey, InventorySeed, InvalidIngredientKey};
pub use product::{Addon, MenuCategory, MenuFile, Product, Recipe};
pub use stock_log::{StockLogEntry, StockLogReason};
