//! LinkVault: durable bookmark storage with backend fallback and versioned backups.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod providers;
pub mod rpc_handler;
pub mod services;
pub mod types;
