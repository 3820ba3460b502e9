//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - `init` and shared utilities (open_db)
//! - `import` - Statement import and import history
//! - `transactions` - Ledger browsing, edits, deterministic suggestions
//! - `assist` - On-demand assistive classification
//! - `rules` - Category rule management
//! - `overrides` - Learned merchant overrides
//! - `summary` - Spending summary
//! - `serve` - Web server command

pub mod assist;
pub mod core;
pub mod import;
pub mod overrides;
pub mod rules;
pub mod serve;
pub mod summary;
pub mod transactions;

// Re-export command functions for main.rs
pub use assist::*;
pub use core::*;
pub use import::*;
pub use overrides::*;
pub use rules::*;
pub use serve::*;
pub use summary::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
