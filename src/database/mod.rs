//! LinkVault database layer.
//!
//! Provides SQLite connection management and schema migrations for the
//! transactional table provider.
//!
//! # Usage
//!
//! ```no_run
//! use linkvault::database::Database;
//!
//! let db = Database::open("linkvault.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
