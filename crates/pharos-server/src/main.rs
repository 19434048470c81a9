//! Pharos server binary.
//!
//! Serves the operation plan HTTP surface: drafting, previewing, executing,
//! and dismissing plans. The cluster-mutating executor is stubbed; the
//! component that talks to the control plane lives outside this repository.

mod args;
mod envelope;
mod executor;
mod routes;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use executor::StubExecutor;
use log::info;
use pharos_core::EngineBuilder;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        host,
        port,
    } = Args::parse();

    let engine = EngineBuilder::new()
        .with_database_path(database_file)
        .with_executor(Arc::new(StubExecutor))
        .build()
        .await
        .context("Failed to initialize plan engine")?;

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind server socket")?;

    info!("Pharos listening on {addr}");

    axum::serve(listener, routes::router(Arc::new(engine)))
        .await
        .context("HTTP server failed")?;

    Ok(())
}
