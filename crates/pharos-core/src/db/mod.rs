//! Database operations and SQLite management for operation plans.
//!
//! This module provides the low-level persistence layer for the Pharos plan
//! engine. It handles SQLite connections, schema management, and the plan
//! queries, including the conditional status updates that back the
//! lifecycle manager's exactly-once guarantees.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod migrations;
pub mod plan_queries;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
