//! Builder for creating and configuring PlanEngine instances.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task;

use super::PlanEngine;
use crate::{
    db::Database,
    error::{PlanError, Result},
    executor::Executor,
};

/// Builder for creating and configuring PlanEngine instances.
pub struct EngineBuilder {
    database_path: Option<PathBuf>,
    executor: Option<Arc<dyn Executor>>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            executor: None,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/pharos/pharos.db` or `~/.local/share/pharos/pharos.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the executor that applies approved changes to the cluster.
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Builds the configured engine instance.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Configuration` if no executor was supplied
    /// Returns `PlanError::FileSystem` if the database path is invalid
    /// Returns `PlanError::Database` if database initialization fails
    pub async fn build(self) -> Result<PlanEngine> {
        let executor = self.executor.ok_or_else(|| PlanError::Configuration {
            message: "An executor is required to build a PlanEngine".to_string(),
        })?;

        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PlanError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), PlanError>(())
        })
        .await
        .map_err(|e| PlanError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(PlanEngine::new(db_path, executor))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("pharos")
            .place_data_file("pharos.db")
            .map_err(|e| PlanError::XdgDirectory(e.to_string()))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
