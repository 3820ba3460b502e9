//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod health;
pub mod imports;
pub mod overrides;
pub mod rules;
pub mod summary;
pub mod transactions;

// Re-export all handlers for use in router
pub use health::*;
pub use imports::*;
pub use overrides::*;
pub use rules::*;
pub use summary::*;
pub use transactions::*;
