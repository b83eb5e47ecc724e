//! Fulfillment - storage, inventory movement, and the order engine
//!
//! - [`storage`]: redb-backed store (inventory registry, stock quantities,
//!   order ledger, stock logs, counters)
//! - [`inventory`]: the atomic conditional multi-key stock update
//! - [`engine`]: the order workflow tying catalog, stock, and ledger together
//! - [`error`]: engine error taxonomy and its public translation

pub mod engine;
pub mod error;
pub mod inventory;
pub mod storage;

pub use engine::FulfillmentEngine;
pub use error::{EngineError, EngineResult};
pub use inventory::{StockChange, StockError, StockRequirement, apply_stock_update};
pub use storage::{PosStorage, StorageError, StorageResult};
