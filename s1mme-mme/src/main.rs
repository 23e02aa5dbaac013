//! s1ap-mme
//!
//! Runs the S1AP core of the MME as a standalone process. It implements:
//! - CLI argument parsing
//! - Configuration loading and validation
//! - Directory restore and save (`--snapshot`)
//! - Task spawning and graceful shutdown
//!
//! The SCTP transport and the MME application are outside this binary;
//! their channels are drained and logged.
//!
//! # Usage
//!
//! ```bash
//! s1ap-mme -c config/mme.yaml --snapshot /var/lib/mme/s1ap.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use s1mme_common::{init_logging, LogLevel};
use s1mme_mme::{
    load_and_validate_mme_config, Directory, MmeAppMessage, MmeTaskBase, S1apTask, SctpMessage,
    Task, TaskMessage, DEFAULT_CHANNEL_CAPACITY,
};
use s1mme_s1ap::JsonCodec;

/// S1AP core of the MME
#[derive(Parser, Debug)]
#[command(name = "s1ap-mme")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the MME configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "log-level", default_value = "info")]
    log_level: LogLevel,

    /// Directory snapshot restored on start and written on shutdown
    #[arg(long = "snapshot", value_name = "FILE")]
    snapshot: Option<PathBuf>,
}

/// Running MME
struct MmeApp {
    task_base: MmeTaskBase,
    s1ap: JoinHandle<S1apTask>,
    sinks: Vec<JoinHandle<()>>,
    snapshot: Option<PathBuf>,
}

impl MmeApp {
    /// Loads the configuration, restores the directory and spawns the
    /// S1AP task.
    fn start(args: &Args) -> Result<Self> {
        info!("Loading configuration from: {}", args.config_file.display());
        let config = load_and_validate_mme_config(&args.config_file).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                args.config_file.display()
            )
        })?;
        info!(
            "Configuration loaded: {} GUMMEI(s), {} served TAI(s), relative capacity {}",
            config.served_gummeis.len(),
            config.served_tais.len(),
            config.relative_capacity
        );

        let directory = match &args.snapshot {
            Some(path) if path.exists() => restore_directory(path)?,
            _ => Directory::new(),
        };

        let (task_base, s1ap_rx, sctp_rx, app_rx) =
            MmeTaskBase::new(config, DEFAULT_CHANNEL_CAPACITY);

        let mut task =
            S1apTask::with_directory(task_base.clone(), Box::new(JsonCodec), directory);
        let s1ap = tokio::spawn(async move {
            task.run(s1ap_rx).await;
            task
        });
        info!("S1AP task spawned");

        let sinks = vec![
            tokio::spawn(drain_sctp(sctp_rx)),
            tokio::spawn(drain_app(app_rx)),
        ];

        Ok(Self {
            task_base,
            s1ap,
            sinks,
            snapshot: args.snapshot.clone(),
        })
    }

    /// Waits for Ctrl+C or for the S1AP task to stop on its own, then shuts
    /// everything down.
    async fn run(mut self) -> Result<()> {
        info!("MME started, waiting for shutdown signal...");

        let stopped = tokio::select! {
            _ = signal::ctrl_c() => None,
            joined = &mut self.s1ap => Some(joined),
        };
        self.task_base.shutdown_all().await;
        let joined = match stopped {
            Some(joined) => {
                warn!("S1AP task stopped unexpectedly");
                joined
            }
            None => {
                info!("Received Ctrl+C, initiating shutdown...");
                self.s1ap.await
            }
        };
        let task = joined.context("S1AP task panicked")?;

        for sink in self.sinks {
            sink.abort();
        }

        if let Some(path) = &self.snapshot {
            save_directory(&task, path)?;
        }
        if let Some(e) = task.fatal_error() {
            bail!("S1AP task stopped on a fatal error: {e}");
        }
        Ok(())
    }
}

fn restore_directory(path: &Path) -> Result<Directory> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let directory = Directory::restore(&bytes)
        .with_context(|| format!("Failed to restore snapshot {}", path.display()))?;
    info!(
        "Restored {} eNB(s) and {} UE(s) from {}",
        directory.enb_count(),
        directory.ue_count(),
        path.display()
    );
    Ok(directory)
}

fn save_directory(task: &S1apTask, path: &Path) -> Result<()> {
    let bytes = task
        .mme()
        .snapshot()
        .context("Failed to serialize the directory")?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
    info!("Directory saved to {}", path.display());
    Ok(())
}

async fn drain_sctp(mut rx: mpsc::Receiver<TaskMessage<SctpMessage>>) {
    while let Some(TaskMessage::Message(SctpMessage::SendMessage {
        assoc_id,
        stream,
        buffer,
        ..
    })) = rx.recv().await
    {
        debug!(
            "SCTP send: assoc={} stream={} len={}",
            assoc_id,
            stream,
            buffer.len()
        );
    }
}

async fn drain_app(mut rx: mpsc::Receiver<TaskMessage<MmeAppMessage>>) {
    while let Some(TaskMessage::Message(msg)) = rx.recv().await {
        debug!(
            "MME app event: {} imsi={}",
            msg.event.name(),
            msg.imsi
                .as_ref()
                .map_or_else(|| "unknown".to_string(), |imsi| imsi.to_string())
        );
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level);

    println!("s1ap-mme - LTE MME S1AP core");
    println!("============================");

    match run_mme(args).await {
        Ok(()) => {
            info!("MME exited successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("MME failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_mme(args: Args) -> Result<()> {
    let app = MmeApp::start(&args)?;
    app.run().await
}
