//! Utility module - shared helpers and re-exports
//!
//! - [`AppError`] / [`ApiResponse`] - unified error and response types (from shared)
//! - [`logger`] - tracing setup

pub mod logger;

pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use logger::{init_logger, init_logger_with_file};
