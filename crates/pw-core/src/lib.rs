//! # pw-core
//!
//! Core types and utilities for Profile Wizard.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types
//! - Result type aliases
//! - The user identifier type
//! - Configuration types

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::*;
pub use result::*;
pub use types::*;
