//! S1AP Task
//!
//! Async wrapper around [`S1apMme`]. The task runs one message to
//! completion, then flushes the core's outbox: sends go to the SCTP layer,
//! events to the MME application, and timers become tokio sleeps that post
//! their expiry back into the task's own queue.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use s1mme_s1ap::S1apCodec;

use super::directory::Directory;
use super::error::S1apError;
use super::mme::{Action, S1apMme};
use crate::tasks::{MmeAppMessage, MmeTaskBase, S1apMessage, SctpMessage, Task, TaskMessage};

/// S1AP task
pub struct S1apTask {
    task_base: MmeTaskBase,
    mme: S1apMme,
    release_timers: HashMap<u64, JoinHandle<()>>,
    cleanup_timers: HashMap<u32, JoinHandle<()>>,
    fatal_error: Option<S1apError>,
}

impl S1apTask {
    /// Creates a task with an empty directory.
    pub fn new(task_base: MmeTaskBase, codec: Box<dyn S1apCodec>) -> Self {
        Self::with_directory(task_base, codec, Directory::new())
    }

    /// Creates a task around a restored directory. Timers recorded in the
    /// directory are re-armed when the task starts.
    pub fn with_directory(
        task_base: MmeTaskBase,
        codec: Box<dyn S1apCodec>,
        directory: Directory,
    ) -> Self {
        let mme = S1apMme::with_directory(task_base.config.clone(), codec, directory);
        Self {
            task_base,
            mme,
            release_timers: HashMap::new(),
            cleanup_timers: HashMap::new(),
            fatal_error: None,
        }
    }

    /// The protocol core
    pub fn mme(&self) -> &S1apMme {
        &self.mme
    }

    /// Error that stopped the task, if any
    pub fn fatal_error(&self) -> Option<&S1apError> {
        self.fatal_error.as_ref()
    }

    /// Number of armed release timers
    pub fn pending_release_timers(&self) -> usize {
        self.release_timers.len()
    }

    fn handle_message(&mut self, msg: S1apMessage) -> Result<(), S1apError> {
        match msg {
            S1apMessage::NewAssociation {
                assoc_id,
                in_streams,
                out_streams,
                peer_address,
            } => self
                .mme
                .handle_new_association(assoc_id, in_streams, out_streams, peer_address),
            S1apMessage::Disconnection { assoc_id, is_reset } => {
                self.mme.handle_disconnection(assoc_id, is_reset)
            }
            S1apMessage::DataReceived {
                assoc_id,
                stream,
                buffer,
                received_at,
            } => {
                self.mme.record_latency(received_at.elapsed());
                self.mme.handle_pdu(assoc_id, stream, &buffer)
            }
            S1apMessage::SctpDataConfirm {
                assoc_id,
                mme_ue_s1ap_id,
                delivered,
            } => {
                self.mme
                    .handle_data_confirm(assoc_id, mme_ue_s1ap_id, delivered);
                Ok(())
            }
            S1apMessage::Activate => {
                self.mme.activate();
                Ok(())
            }
            S1apMessage::AppRequest(request) => self.mme.handle_app_request(request),
            S1apMessage::ReleaseTimerExpired {
                timer_id,
                mme_ue_s1ap_id,
            } => {
                self.release_timers.remove(&timer_id);
                self.mme
                    .handle_release_timer_expiry(timer_id, mme_ue_s1ap_id)
            }
            S1apMessage::EnbCleanupTimerExpired { assoc_id } => {
                self.cleanup_timers.remove(&assoc_id);
                self.mme.handle_enb_cleanup_timer_expiry(assoc_id);
                Ok(())
            }
        }
    }

    fn spawn_timer(&self, duration: Duration, expiry: S1apMessage) -> JoinHandle<()> {
        let s1ap_tx = self.task_base.s1ap_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Err(e) = s1ap_tx.send(expiry).await {
                debug!("Timer expired after the S1AP task stopped: {}", e);
            }
        })
    }

    /// Executes every action the core queued.
    async fn flush(&mut self) {
        for action in self.mme.drain_actions() {
            match action {
                Action::Send {
                    assoc_id,
                    stream,
                    buffer,
                    mme_ue_s1ap_id,
                } => {
                    let msg = SctpMessage::SendMessage {
                        assoc_id,
                        stream,
                        buffer,
                        mme_ue_s1ap_id,
                    };
                    if let Err(e) = self.task_base.sctp_tx.send(msg).await {
                        error!("Failed to send to SCTP layer: assoc={}: {}", assoc_id, e);
                    }
                }
                Action::Event { imsi, event } => {
                    let name = event.name();
                    if let Err(e) = self
                        .task_base
                        .app_tx
                        .send(MmeAppMessage { imsi, event })
                        .await
                    {
                        error!("Failed to deliver {} to MME app: {}", name, e);
                    }
                }
                Action::StartReleaseTimer {
                    timer_id,
                    mme_ue_s1ap_id,
                    duration,
                } => {
                    let handle = self.spawn_timer(
                        duration,
                        S1apMessage::ReleaseTimerExpired {
                            timer_id,
                            mme_ue_s1ap_id,
                        },
                    );
                    if let Some(old) = self.release_timers.insert(timer_id, handle) {
                        old.abort();
                    }
                    debug!(
                        "Release timer {} armed for mme_ue_s1ap_id={} ({:?})",
                        timer_id, mme_ue_s1ap_id, duration
                    );
                }
                Action::StopReleaseTimer { timer_id } => {
                    if let Some(handle) = self.release_timers.remove(&timer_id) {
                        handle.abort();
                        debug!("Release timer {} stopped", timer_id);
                    }
                }
                Action::StartEnbCleanupTimer { assoc_id, duration } => {
                    let handle =
                        self.spawn_timer(duration, S1apMessage::EnbCleanupTimerExpired { assoc_id });
                    if let Some(old) = self.cleanup_timers.insert(assoc_id, handle) {
                        old.abort();
                    }
                }
            }
        }
    }

    fn abort_timers(&mut self) {
        for (_, handle) in self.release_timers.drain() {
            handle.abort();
        }
        for (_, handle) in self.cleanup_timers.drain() {
            handle.abort();
        }
    }
}

// ============================================================================
// Task Implementation
// ============================================================================

#[async_trait::async_trait]
impl Task for S1apTask {
    type Message = S1apMessage;

    async fn run(&mut self, mut rx: mpsc::Receiver<TaskMessage<Self::Message>>) {
        info!(
            "S1AP task started, {} eNB(s) and {} UE(s) restored",
            self.mme.directory().enb_count(),
            self.mme.directory().ue_count()
        );
        self.mme.rearm_timers();
        self.flush().await;

        loop {
            match rx.recv().await {
                Some(TaskMessage::Message(msg)) => {
                    let result = self.handle_message(msg);
                    self.flush().await;
                    match result {
                        Ok(()) => {}
                        Err(e) if e.is_fatal() => {
                            error!("Fatal S1AP error, stopping task: {}", e);
                            self.fatal_error = Some(e);
                            break;
                        }
                        Err(e) => debug!("S1AP message not processed: {}", e),
                    }
                }
                Some(TaskMessage::Shutdown) => {
                    info!("S1AP task received shutdown signal");
                    break;
                }
                None => {
                    warn!("S1AP task channel closed");
                    break;
                }
            }
        }

        self.abort_timers();
        info!(
            "S1AP task stopped, {} eNB(s), {} UE(s)",
            self.mme.directory().enb_count(),
            self.mme.directory().ue_count()
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
