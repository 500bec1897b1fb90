use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Text-to-speech delivery for telephony
#[derive(Debug, Parser)]
#[command(name = "voxline", about = "Synthesize speech, transcode it to GSM and deliver it over SFTP")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "voxline.toml", env = "VOXLINE_CONFIG", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP submission server
    Serve {
        /// Override the listen address
        #[arg(long, env = "VOXLINE_LISTEN")]
        listen: Option<SocketAddr>,

        /// Also run a worker inside the server process
        #[arg(long)]
        embedded_worker: bool,
    },

    /// Run a worker that processes queued jobs
    Worker {
        /// Name recorded on the jobs this worker claims
        #[arg(long, env = "VOXLINE_WORKER_NAME")]
        name: Option<String>,
    },
}
