#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod cors;
mod error;
mod health;
mod request;
mod submission;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;
use voxline_config::Config;
use voxline_queue::{JobResult, WorkQueue};

pub use error::SubmissionError;
pub use submission::{JobView, SubmissionService};
use request::ExtractText;

/// Assembled HTTP front end with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration around an existing queue
    pub fn new(config: &Config, queue: WorkQueue) -> Self {
        let service = Arc::new(SubmissionService::new(queue, &config.submission));

        let mut app = Router::new()
            .route("/api/tts", post(submit_handler))
            .route("/api/tts/jobs/{id}", get(job_handler))
            .with_state(service);

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, get(health::health_handler));
        }

        app = app.layer(TraceLayer::new_for_http());

        if config.server.cors.enabled {
            app = app.layer(cors::cors_layer(&config.server.cors));
        }

        Self {
            router: app,
            listen_address: config.server.listen_address,
        }
    }

    /// Override the configured listen address
    #[must_use]
    pub fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve requests until `shutdown` is cancelled
    ///
    /// In-flight requests are drained before returning.
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {}: {e}", self.listen_address))?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

/// Enqueue the text and wait for the delivered file
async fn submit_handler(
    State(service): State<Arc<SubmissionService>>,
    ExtractText(text): ExtractText,
) -> Result<Json<JobResult>, SubmissionError> {
    let result = service.submit(text.as_deref()).await?;
    Ok(Json(result))
}

/// Report the current state of a job
async fn job_handler(
    State(service): State<Arc<SubmissionService>>,
    Path(id): Path<String>,
) -> Result<Json<JobView>, SubmissionError> {
    let id = Uuid::parse_str(&id).map_err(|_| SubmissionError::Validation(format!("invalid job id '{id}'")))?;
    let view = service.job(id).await?;
    Ok(Json(view))
}
