//! MME Task Framework
//!
//! This module implements the actor-based task model used by the MME S1AP
//! core. Each task runs as an independent async task and communicates via
//! typed message channels.
//!
//! # Architecture
//!
//! ```text
//!                 S1apMessage                      MmeAppMessage
//!  SCTP layer ─────────────────▶ ┌───────────┐ ─────────────────▶ MME app
//!  MME app    ─────────────────▶ │ S1AP task │
//!  timers     ─────────────────▶ └───────────┘ ─────────────────▶ SCTP layer
//!                                                 SctpMessage
//! ```
//!
//! - **S1AP Task**: owns the association directory and runs every S1AP
//!   procedure to completion, one message at a time
//! - **SCTP layer**: delivers association events and payloads, sends
//!   encoded PDUs (external to this crate)
//! - **MME app**: NAS/mobility decisions (external to this crate)

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tokio::sync::mpsc;

use s1mme_common::{Imsi, MmeConfig};
use s1mme_s1ap::ies::MmeUeS1apId;

use crate::s1ap::events::{AppRequest, S1apEvent};

// ============================================================================
// Task Message Envelope
// ============================================================================

/// Task message envelope wrapping typed messages with control signals.
#[derive(Debug)]
pub enum TaskMessage<T> {
    /// Regular message payload
    Message(T),
    /// Shutdown signal - task should terminate gracefully
    Shutdown,
}

impl<T> TaskMessage<T> {
    /// Creates a new message envelope containing the given payload.
    pub fn message(msg: T) -> Self {
        TaskMessage::Message(msg)
    }

    /// Creates a shutdown signal.
    pub fn shutdown() -> Self {
        TaskMessage::Shutdown
    }

    /// Returns true if this is a shutdown signal.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, TaskMessage::Shutdown)
    }

    /// Returns the message payload if present, or None for shutdown.
    pub fn into_message(self) -> Option<T> {
        match self {
            TaskMessage::Message(msg) => Some(msg),
            TaskMessage::Shutdown => None,
        }
    }
}

// ============================================================================
// Task Trait
// ============================================================================

/// Base trait for all MME tasks.
///
/// Tasks are async actors that process messages from their receive channel.
#[async_trait::async_trait]
pub trait Task: Send + 'static {
    /// The message type this task processes.
    type Message: Send;

    /// Runs the task's main loop, processing messages until shutdown.
    async fn run(&mut self, rx: mpsc::Receiver<TaskMessage<Self::Message>>);
}

// ============================================================================
// S1AP Messages
// ============================================================================

/// Messages for the S1AP task.
#[derive(Debug)]
pub enum S1apMessage {
    /// SCTP association established
    NewAssociation {
        /// Association ID
        assoc_id: u32,
        /// Number of inbound streams
        in_streams: u16,
        /// Number of outbound streams
        out_streams: u16,
        /// Control-plane address of the peer
        peer_address: Option<IpAddr>,
    },
    /// SCTP association reset or shut down
    Disconnection {
        /// Association ID
        assoc_id: u32,
        /// True for a reset, false for a shutdown
        is_reset: bool,
    },
    /// S1AP payload received from an eNB
    DataReceived {
        /// Association ID
        assoc_id: u32,
        /// Stream ID
        stream: u16,
        /// Encoded PDU
        buffer: Bytes,
        /// Time the SCTP layer handed the payload over
        received_at: Instant,
    },
    /// Delivery report for a UE-associated downlink send
    SctpDataConfirm {
        /// Association ID
        assoc_id: u32,
        /// UE the payload belonged to
        mme_ue_s1ap_id: MmeUeS1apId,
        /// Whether the payload reached the peer
        delivered: bool,
    },
    /// The subscriber-data interface came up
    Activate,
    /// Request from the MME application layer
    AppRequest(AppRequest),
    /// UE context-release guard timer fired
    ReleaseTimerExpired {
        /// Timer identity recorded in the UE context
        timer_id: u64,
        /// UE the timer guards
        mme_ue_s1ap_id: MmeUeS1apId,
    },
    /// eNB clean-up timer fired
    EnbCleanupTimerExpired {
        /// Association ID
        assoc_id: u32,
    },
}

impl S1apMessage {
    /// Wraps an SCTP payload received now.
    pub fn data(assoc_id: u32, stream: u16, buffer: Bytes) -> Self {
        S1apMessage::DataReceived {
            assoc_id,
            stream,
            buffer,
            received_at: Instant::now(),
        }
    }
}

// ============================================================================
// SCTP Messages
// ============================================================================

/// Messages for the SCTP layer.
#[derive(Debug)]
pub enum SctpMessage {
    /// Send an encoded S1AP PDU to an eNB
    SendMessage {
        /// Association ID
        assoc_id: u32,
        /// Stream ID
        stream: u16,
        /// Encoded PDU
        buffer: Bytes,
        /// UE the payload belongs to, for delivery confirmation
        mme_ue_s1ap_id: Option<MmeUeS1apId>,
    },
}

// ============================================================================
// MME Application Messages
// ============================================================================

/// Event forwarded to the MME application layer.
#[derive(Debug)]
pub struct MmeAppMessage {
    /// Subscriber the event concerns, `None` when not resolvable
    pub imsi: Option<Imsi>,
    /// The event
    pub event: S1apEvent,
}

// ============================================================================
// Task Handle
// ============================================================================

/// Handle for sending messages to a task.
///
/// This is a wrapper around `mpsc::Sender` that provides convenient methods
/// for sending messages and shutdown signals.
#[derive(Debug)]
pub struct TaskHandle<T> {
    tx: mpsc::Sender<TaskMessage<T>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> TaskHandle<T> {
    /// Creates a new task handle from a sender.
    pub fn new(tx: mpsc::Sender<TaskMessage<T>>) -> Self {
        Self { tx }
    }

    /// Sends a message to the task.
    ///
    /// Returns an error if the task has been dropped.
    pub async fn send(&self, msg: T) -> Result<(), mpsc::error::SendError<TaskMessage<T>>> {
        self.tx.send(TaskMessage::Message(msg)).await
    }

    /// Sends a message to the task without waiting.
    ///
    /// Returns an error if the channel is full or the task has been dropped.
    pub fn try_send(&self, msg: T) -> Result<(), mpsc::error::TrySendError<TaskMessage<T>>> {
        self.tx.try_send(TaskMessage::Message(msg))
    }

    /// Sends a shutdown signal to the task.
    pub async fn shutdown(&self) -> Result<(), mpsc::error::SendError<TaskMessage<T>>> {
        self.tx.send(TaskMessage::Shutdown).await
    }

    /// Returns true if the task channel is closed.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// MME Task Base
// ============================================================================

/// Base structure containing the task handles of the MME.
///
/// The S1AP task receives a clone of this structure and uses it to reach the
/// SCTP layer, the application layer and its own queue (timers post back
/// through `s1ap_tx`).
#[derive(Clone)]
pub struct MmeTaskBase {
    /// MME configuration
    pub config: Arc<MmeConfig>,
    /// Handle to the S1AP task
    pub s1ap_tx: TaskHandle<S1apMessage>,
    /// Handle to the SCTP layer
    pub sctp_tx: TaskHandle<SctpMessage>,
    /// Handle to the MME application layer
    pub app_tx: TaskHandle<MmeAppMessage>,
}

impl MmeTaskBase {
    /// Creates a new `MmeTaskBase` with the given configuration and channel
    /// capacity.
    ///
    /// Returns the task base along with receivers for each channel.
    #[allow(clippy::type_complexity)]
    pub fn new(
        config: MmeConfig,
        channel_capacity: usize,
    ) -> (
        Self,
        mpsc::Receiver<TaskMessage<S1apMessage>>,
        mpsc::Receiver<TaskMessage<SctpMessage>>,
        mpsc::Receiver<TaskMessage<MmeAppMessage>>,
    ) {
        let (s1ap_tx, s1ap_rx) = mpsc::channel(channel_capacity);
        let (sctp_tx, sctp_rx) = mpsc::channel(channel_capacity);
        let (app_tx, app_rx) = mpsc::channel(channel_capacity);

        let base = Self {
            config: Arc::new(config),
            s1ap_tx: TaskHandle::new(s1ap_tx),
            sctp_tx: TaskHandle::new(sctp_tx),
            app_tx: TaskHandle::new(app_tx),
        };

        (base, s1ap_rx, sctp_rx, app_rx)
    }

    /// Sends shutdown signals to all channels.
    pub async fn shutdown_all(&self) {
        // Ignore errors - receivers may already be gone
        let _ = self.s1ap_tx.shutdown().await;
        let _ = self.sctp_tx.shutdown().await;
        let _ = self.app_tx.shutdown().await;
    }
}

// ============================================================================
// Constants
// ============================================================================

/// Default channel capacity for task message queues.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// S1AP Payload Protocol ID for SCTP.
pub const S1AP_PPID: u32 = 18;

#[cfg(test)]
mod tests {
    use super::*;
    use s1mme_common::{Gummei, Plmn, Tai};

    fn test_config() -> MmeConfig {
        MmeConfig::new(
            vec![Gummei::new(Plmn::new(1, 1, false), 1, 1)],
            vec![Tai::from_parts(1, 1, false, 1)],
        )
    }

    #[test]
    fn test_task_message_envelope() {
        let msg: TaskMessage<u32> = TaskMessage::message(7);
        assert!(!msg.is_shutdown());
        assert_eq!(msg.into_message(), Some(7));

        let shutdown: TaskMessage<u32> = TaskMessage::shutdown();
        assert!(shutdown.is_shutdown());
        assert_eq!(shutdown.into_message(), None);
    }

    #[tokio::test]
    async fn test_task_handle_send_and_shutdown() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = TaskHandle::new(tx);

        handle.send(S1apMessage::Activate).await.unwrap();
        handle.shutdown().await.unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(TaskMessage::Message(S1apMessage::Activate))
        ));
        assert!(matches!(rx.recv().await, Some(TaskMessage::Shutdown)));
    }

    #[tokio::test]
    async fn test_try_send_full_channel() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = TaskHandle::new(tx);

        handle.try_send(S1apMessage::Activate).unwrap();
        assert!(handle.try_send(S1apMessage::Activate).is_err());
    }

    #[tokio::test]
    async fn test_task_base_channels() {
        let (base, mut s1ap_rx, mut sctp_rx, _app_rx) =
            MmeTaskBase::new(test_config(), DEFAULT_CHANNEL_CAPACITY);

        base.s1ap_tx
            .send(S1apMessage::data(3, 0, Bytes::from_static(b"{}")))
            .await
            .unwrap();
        base.sctp_tx
            .send(SctpMessage::SendMessage {
                assoc_id: 3,
                stream: 0,
                buffer: Bytes::from_static(b"{}"),
                mme_ue_s1ap_id: None,
            })
            .await
            .unwrap();

        match s1ap_rx.recv().await {
            Some(TaskMessage::Message(S1apMessage::DataReceived { assoc_id, stream, .. })) => {
                assert_eq!(assoc_id, 3);
                assert_eq!(stream, 0);
            }
            _ => panic!("expected DataReceived"),
        }
        match sctp_rx.recv().await {
            Some(TaskMessage::Message(SctpMessage::SendMessage { assoc_id, .. })) => {
                assert_eq!(assoc_id, 3);
            }
            _ => panic!("expected SendMessage"),
        }
    }

    #[tokio::test]
    async fn test_handle_closed_after_receiver_drop() {
        let (base, s1ap_rx, sctp_rx, app_rx) = MmeTaskBase::new(test_config(), 4);
        drop(s1ap_rx);
        drop(sctp_rx);
        drop(app_rx);

        assert!(base.s1ap_tx.is_closed());
        assert!(base.sctp_tx.is_closed());
        assert!(base.app_tx.is_closed());
        // shutdown_all must not fail on closed channels
        base.shutdown_all().await;
    }
}
