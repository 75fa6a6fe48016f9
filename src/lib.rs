//! Bookstore Application Library
//!
//! This library provides the application modules mounted by the bookstore
//! server binary.

pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use modules::*;
