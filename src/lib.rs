//! FlavoursVerse Library
//!
//! Ingredient substitutes, flavor profiles, dietary analysis and recipe
//! nutrition, backed by the FlavoursVerse HTTP API.

pub mod api;
pub mod build_info;
pub mod config;
pub mod mcp;
pub mod models;
pub mod session;
pub mod tools;
