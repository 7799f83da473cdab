//! Utility functions.
//!
//! This module provides:
//! - CSS selector parsing utilities
//! - SQL identifier quoting

mod selector;
mod sql;

pub use selector::{parse_selector_unsafe, parse_selector_with_fallback};
pub use sql::quote_ident;
