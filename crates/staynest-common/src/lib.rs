//! # staynest-common
//!
//! Shared types, configuration, error handling, and utilities used across all StayNest crates.
//! This is the foundation layer: no I/O, just primitives and contracts.

pub mod auth;
pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod stay;
pub mod validation;
