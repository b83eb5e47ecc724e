//! Boba POS Server - order fulfillment node for a bubble-tea shop
//!
//! # Architecture overview
//!
//! - **Catalog** (`catalog`): immutable, indexed menu with per-size recipes
//! - **Fulfillment** (`fulfillment`): redb-backed store, atomic stock
//!   deduction, and the order workflow
//! - **HTTP API** (`api`): RESTful interface for the client shell
//!
//! # Module structure
//!
//! ```text
//! pos-server/src/
//! ├── core/          # Config, state, server
//! ├── catalog.rs     # Menu and recipe index
//! ├── fulfillment/   # Storage, stock updates, order engine
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # Logging and shared helpers
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod fulfillment;
pub mod utils;

// Re-export public types
pub use catalog::RecipeCatalog;
pub use core::{Config, Server, ServerState};
pub use fulfillment::{FulfillmentEngine, PosStorage};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and initialize logging; call once at startup
pub fn setup_environment() {
    dotenv::dotenv().ok();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}
