// LinkVault shared type definitions
// Each submodule defines types used across the storage layer.

pub mod backup;
pub mod bookmark;
pub mod errors;
pub mod settings;
