// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `daod`: the DAO coordinator process for one MDS.
//!
//! Wires the concrete collaborators (`FileJournalGateway`, `FileMltClient`,
//! `TcpExecutorClient`, `TcpTransport` + `run_tcp_listener`) into one
//! `Dao<SystemClock>`, runs the startup journal scan, then spawns the
//! long-lived request and timeout workers and awaits a shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use dao_adapters::net::{run_tcp_listener, FileMltClient, TcpExecutorClient, TcpTransport};
use dao_core::clock::SystemClock;
use dao_core::subtree::PeerAddr;
use dao_daemon::Config;
use dao_engine::{run_startup_recovery, run_request_worker, run_timeout_worker, Dao};
use dao_storage::FileJournalGateway;

#[derive(Parser, Debug)]
#[command(name = "daod", about = "Distributed atomic operations coordinator daemon")]
struct Args {
    /// Path to a TOML config file. Missing file falls back to built-in
    /// defaults.
    #[arg(long, default_value = "dao.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let _log_guard = dao_daemon::logging::init(&config.log_dir, &config.log_level)?;

    info!(self_addr = %config.self_addr, bind_addr = %config.bind_addr, "starting daod");

    let journal = Arc::new(FileJournalGateway::open(&config.journal_dir)?);
    let known_journals = journal.known_journal_keys().await?;
    let mlt = Arc::new(FileMltClient::load(&config.mlt_path).await?);
    let executor = TcpExecutorClient::new(config.executor_addr.clone());
    let transport = TcpTransport::new(PeerAddr::new(config.self_addr.clone()));

    let (dao, client_results_rx) = Dao::new(
        PeerAddr::new(config.self_addr.clone()),
        config.engine_config(),
        journal,
        mlt,
        executor,
        transport,
        SystemClock,
    );
    let dao = Arc::new(dao);

    run_startup_recovery(&dao, &known_journals).await?;

    let (inbound_tx, inbound_rx) = tokio::sync::mpsc::channel(1024);
    let listener_bind = config.bind_addr.clone();
    let listener_handle = tokio::spawn(async move {
        if let Err(err) = run_tcp_listener(&listener_bind, inbound_tx).await {
            error!(error = %err, "tcp listener exited");
        }
    });

    let request_worker = tokio::spawn(run_request_worker(Arc::clone(&dao), inbound_rx));
    let timeout_worker = tokio::spawn(run_timeout_worker(Arc::clone(&dao)));
    let result_forwarder = tokio::spawn(dao_daemon::result_forwarder::run(client_results_rx));

    info!("daod ready, accepting peer traffic");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping daod");

    listener_handle.abort();
    request_worker.abort();
    timeout_worker.abort();
    result_forwarder.abort();

    Ok(())
}
