#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use args::{Args, Command};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use voxline_config::{Config, QueueStorage};
use voxline_queue::WorkQueue;
use voxline_server::Server;
use voxline_worker::Worker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    voxline_telemetry::init(&config.telemetry)?;

    tracing::info!(config_path = %args.config.display(), "starting voxline");

    let queue = WorkQueue::from_config(&config.queue)?;

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    match args.command {
        Command::Serve { listen, embedded_worker } => {
            serve(&config, queue, listen, embedded_worker, &shutdown).await?;
        }
        Command::Worker { name } => {
            if matches!(config.queue.storage, QueueStorage::Memory) {
                anyhow::bail!("a standalone worker cannot share in-memory storage; use `serve --embedded-worker`");
            }

            let name = name.unwrap_or_else(default_worker_name);
            let worker = build_worker(&config, queue, name)?;
            worker.run(shutdown).await;
        }
    }

    tracing::info!("voxline stopped");
    Ok(())
}

async fn serve(
    config: &Config,
    queue: WorkQueue,
    listen: Option<std::net::SocketAddr>,
    embedded_worker: bool,
    shutdown: &CancellationToken,
) -> anyhow::Result<()> {
    // Build the worker first so a bad voice model fails startup
    let worker = if embedded_worker {
        let worker = build_worker(config, queue.clone(), default_worker_name())?;
        Some(tokio::spawn(worker.run(shutdown.clone())))
    } else {
        None
    };

    let mut server = Server::new(config, queue);
    if let Some(listen) = listen {
        server = server.with_listen_address(listen);
    }

    let served = server.serve(shutdown.clone()).await;

    // Stop the worker even when the server failed
    shutdown.cancel();
    if let Some(worker) = worker {
        worker.await?;
    }

    served
}

fn build_worker(config: &Config, queue: WorkQueue, name: String) -> anyhow::Result<Worker> {
    let pipeline = voxline_worker::build_pipeline(config)?;
    Ok(Worker::new(name, queue, pipeline, config.queue.dequeue_timeout))
}

fn default_worker_name() -> String {
    format!("worker-{}", std::process::id())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
