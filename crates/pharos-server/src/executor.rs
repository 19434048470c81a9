//! Stand-in executor wired into the server binary.
//!
//! The component that talks to the Kubernetes control plane lives outside
//! this repository; the server ships with a stub that records what would be
//! applied and fabricates the post-apply resource version so the rest of the
//! lifecycle is exercisable end to end.

use async_trait::async_trait;
use log::info;
use pharos_core::executor::{ExecuteChange, Executor, ExecutorError};
use pharos_core::models::ResourceRef;

/// Executor that logs the approved change instead of applying it.
pub struct StubExecutor;

#[async_trait]
impl Executor for StubExecutor {
    async fn apply(
        &self,
        resource: &ResourceRef,
        change: &ExecuteChange,
    ) -> Result<String, ExecutorError> {
        info!(
            "Would apply {} patch operation(s) across {} step(s) to {} {}/{}",
            change.patch.len(),
            change.steps.len(),
            resource.kind,
            resource.namespace,
            resource.name
        );

        // Fabricate the version a real control plane would report back.
        let applied = resource
            .resource_version
            .parse::<u64>()
            .map(|v| (v + 1).to_string())
            .unwrap_or_else(|_| format!("{}-applied", resource.resource_version));
        Ok(applied)
    }
}
