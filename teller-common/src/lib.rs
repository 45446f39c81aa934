//! Teller Common - Shared types and utilities for the Teller portal.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Error types with HTTP status mapping
//! - Logging setup
//! - The portal permission model (RBAC)
//! - Small string utilities

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod rbac;
pub mod util;

pub use config::{AuthConfig, Config, GenerationConfig, ObservabilityConfig, ServerConfig, WarehouseConfig};
pub use error::{Error, Result};
pub use rbac::{check_permission, Permission};
