//! The plan lifecycle manager.
//!
//! The [`PlanEngine`] owns every plan after draft time: plans are mutated
//! only through the three defined operations (draft, execute, dismiss) and
//! never directly. Execute is exactly-once under racing callers: the engine
//! serializes concurrent transitions on the same plan through a per-plan
//! async lock, and the store's conditional `WHERE status = 'pending'` update
//! backs the same guarantee at the persistence layer.
//!
//! Blocking SQLite work always runs under [`tokio::task::spawn_blocking`];
//! the engine's own methods are async and safe to call from request
//! handlers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::executor::Executor;

// Module declarations
pub mod builder;
pub mod plan_ops;

// Re-export the main types
pub use builder::EngineBuilder;

/// Main engine interface for managing operation plans.
pub struct PlanEngine {
    pub(crate) db_path: PathBuf,
    pub(crate) executor: Arc<dyn Executor>,
    /// Per-plan locks serializing execute/dismiss against the same plan id.
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl PlanEngine {
    /// Creates a new engine with the given database path and executor.
    pub(crate) fn new(db_path: PathBuf, executor: Arc<dyn Executor>) -> Self {
        Self {
            db_path,
            executor,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lock guarding transitions for one plan id.
    ///
    /// Entries are never evicted: a dismissed or executed plan stops being
    /// contended, and the registry grows with the number of distinct plans
    /// touched by this process, which the request/response model keeps small.
    pub(crate) fn lock_for(&self, plan_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("plan lock registry poisoned");
        locks
            .entry(plan_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
