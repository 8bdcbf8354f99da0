//! Core types and constants for the overlay engine

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
