//! Test server wrapper that starts voxline on a random port

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use voxline_config::Config;
use voxline_queue::WorkQueue;
use voxline_server::Server;
use voxline_worker::{JobPipeline, Worker};

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    queue: WorkQueue,
    dequeue_timeout: std::time::Duration,
}

impl TestServer {
    /// Start a server over the queue described by `config`
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let queue = WorkQueue::from_config(&config.queue)?;
        Self::start_with_queue(config, queue).await
    }

    /// Start a server over an existing queue
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start_with_queue(config: Config, queue: WorkQueue) -> anyhow::Result<Self> {
        let server = Server::new(&config, queue.clone());
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self {
            addr,
            shutdown,
            client,
            queue,
            dequeue_timeout: config.queue.dequeue_timeout,
        })
    }

    /// Run a worker against the server's queue until the server is dropped
    pub fn spawn_worker(&self, name: &str, pipeline: JobPipeline) {
        let worker = Worker::new(name, self.queue.clone(), pipeline, self.dequeue_timeout);
        tokio::spawn(worker.run(self.shutdown.clone()));
    }

    /// Submit `text` as a urlencoded form
    pub async fn submit(&self, text: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/tts"))
            .form(&[("text", text)])
            .send()
            .await
            .unwrap()
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
