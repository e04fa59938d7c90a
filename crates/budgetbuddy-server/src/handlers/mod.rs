//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analytics;
pub mod audit;
pub mod auth;
pub mod budgets;
pub mod categories;
pub mod chat;
pub mod expenses;
pub mod plans;

// Re-export all handlers for use in router
pub use analytics::*;
pub use audit::*;
pub use auth::*;
pub use budgets::*;
pub use categories::*;
pub use chat::*;
pub use expenses::*;
pub use plans::*;
