//! S1AP MME core
//!
//! [`S1apMme`] is the synchronous state machine behind the S1AP task. Every
//! entry point checks the directory out, runs one procedure to completion
//! and appends what must happen next (SCTP sends, events for the MME
//! application, timer starts and stops) to an outbox that the caller drains.
//!
//! # Architecture
//!
//! ```text
//!  bytes ──decode──▶ dispatcher ──▶ procedure handler ──┐
//!  AppRequest ─────▶ dispatcher ──▶ generator ──────────┤
//!  timers, SCTP events ─────────────▶ handler ──────────┤
//!                                                       ▼
//!                           HandlerContext { directory, config, codec, outbox }
//!                                                       │
//!                                   drain_actions() ◀───┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use s1mme_common::{log_s1ap_message, Direction, Imsi, MmeConfig};
use s1mme_s1ap::ies::{EnbUeS1apId, MmeUeS1apId};
use s1mme_s1ap::{S1apCodec, S1apPdu};

use super::directory::{Directory, DirectoryError, StateCache};
use super::enb_context::EnbState;
use super::error::S1apError;
use super::events::{AppRequest, S1apEvent};
use super::ue_context::{UeContext, UeState};
use super::{dispatcher, enb_procedures, ue_procedures};

// ============================================================================
// Outbox
// ============================================================================

/// Side effect requested by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send an encoded PDU to an eNB
    Send {
        /// Association ID
        assoc_id: u32,
        /// Stream ID
        stream: u16,
        /// Encoded PDU
        buffer: bytes::Bytes,
        /// UE the PDU belongs to
        mme_ue_s1ap_id: Option<MmeUeS1apId>,
    },
    /// Report an event to the MME application
    Event {
        /// Subscriber, when known
        imsi: Option<Imsi>,
        /// The event
        event: S1apEvent,
    },
    /// Arm a UE context-release guard timer
    StartReleaseTimer {
        /// Timer identity
        timer_id: u64,
        /// Guarded UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// Expiry
        duration: Duration,
    },
    /// Cancel a UE context-release guard timer
    StopReleaseTimer {
        /// Timer identity
        timer_id: u64,
    },
    /// Arm the clean-up timer of an eNB being shut down
    StartEnbCleanupTimer {
        /// Association ID
        assoc_id: u32,
        /// Expiry
        duration: Duration,
    },
}

/// Pending actions, in the order handlers produced them.
#[derive(Debug, Default)]
pub struct Outbox {
    actions: Vec<Action>,
}

impl Outbox {
    /// Queues an action
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Number of queued actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Takes every queued action
    pub fn drain(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }
}

// ============================================================================
// Handler context
// ============================================================================

/// Everything a procedure handler may touch while the directory is checked
/// out.
pub struct HandlerContext<'a> {
    /// Checked-out directory
    pub dir: &'a mut Directory,
    /// MME configuration
    pub config: &'a MmeConfig,
    /// PDU codec
    pub codec: &'a dyn S1apCodec,
    /// Side effects
    pub outbox: &'a mut Outbox,
    /// Whether the subscriber-data interface is up
    pub hss_associated: bool,
    /// Latency measured for the message being handled
    pub last_latency_us: Option<u64>,
}

impl HandlerContext<'_> {
    /// Encodes `pdu` and queues it for the SCTP layer.
    pub fn send_pdu(
        &mut self,
        assoc_id: u32,
        stream: u16,
        pdu: S1apPdu,
        mme_ue_s1ap_id: Option<MmeUeS1apId>,
    ) -> Result<(), S1apError> {
        let buffer = self.codec.encode(&pdu).map_err(|e| {
            error!("Failed to encode {}: {}", pdu.name(), e);
            S1apError::from(e)
        })?;
        log_s1ap_message(Direction::Tx, pdu.name(), assoc_id, &buffer);
        self.outbox.push(Action::Send {
            assoc_id,
            stream,
            buffer,
            mme_ue_s1ap_id,
        });
        Ok(())
    }

    /// Queues an event for the MME application, tagged with the subscriber
    /// identity when the UE is known.
    pub fn notify(&mut self, mme_ue_s1ap_id: Option<MmeUeS1apId>, event: S1apEvent) {
        let imsi = mme_ue_s1ap_id.and_then(|id| self.dir.imsi(id).cloned());
        debug!(
            "Event {} to MME app: mme_ue_s1ap_id={:?} imsi={}",
            event.name(),
            mme_ue_s1ap_id,
            imsi.as_ref().map_or("unknown".to_string(), Imsi::to_string)
        );
        self.outbox.push(Action::Event { imsi, event });
    }

    /// Arms the release guard timer of a UE.
    ///
    /// Returns false if the UE is unknown or has no MME UE id.
    pub fn arm_release_timer(&mut self, assoc_id: u32, enb_ue_s1ap_id: EnbUeS1apId) -> bool {
        let timer_id = self.dir.allocate_timer_id();
        let Some(ue) = self.dir.ue_mut(assoc_id, enb_ue_s1ap_id) else {
            return false;
        };
        let Some(mme_ue_s1ap_id) = ue.mme_ue_s1ap_id else {
            return false;
        };
        let previous = ue.release_timer.id.replace(timer_id);
        let duration = Duration::from_millis(ue.release_timer.duration_ms);
        if let Some(timer_id) = previous {
            self.outbox.push(Action::StopReleaseTimer { timer_id });
        }
        debug!(
            "Release timer {} armed for mme_ue_s1ap_id={} ({:?})",
            timer_id, mme_ue_s1ap_id, duration
        );
        self.outbox.push(Action::StartReleaseTimer {
            timer_id,
            mme_ue_s1ap_id,
            duration,
        });
        true
    }

    /// Removes a UE context, cancelling its guard timer.
    pub fn remove_ue(&mut self, assoc_id: u32, enb_ue_s1ap_id: EnbUeS1apId) -> Option<UeContext> {
        let ue = self.dir.remove_ue(assoc_id, enb_ue_s1ap_id)?;
        if let Some(timer_id) = ue.release_timer.id {
            self.outbox.push(Action::StopReleaseTimer { timer_id });
        }
        Some(ue)
    }

    /// Clean-up shared by Release Complete and guard timer expiry: tells the
    /// MME application the context is gone, then deletes it.
    pub fn complete_ue_release(&mut self, assoc_id: u32, enb_ue_s1ap_id: EnbUeS1apId) {
        let enb_id = self
            .dir
            .enb(assoc_id)
            .and_then(|enb| enb.enb_id)
            .unwrap_or_default();
        let Some(mme_ue_s1ap_id) = self
            .dir
            .ue(assoc_id, enb_ue_s1ap_id)
            .and_then(|ue| ue.mme_ue_s1ap_id)
        else {
            self.remove_ue(assoc_id, enb_ue_s1ap_id);
            return;
        };
        self.notify(
            Some(mme_ue_s1ap_id),
            S1apEvent::UeContextReleaseComplete {
                mme_ue_s1ap_id,
                enb_ue_s1ap_id,
                enb_id,
            },
        );
        self.remove_ue(assoc_id, enb_ue_s1ap_id);
    }
}

// ============================================================================
// S1AP MME
// ============================================================================

/// S1AP protocol core of the MME.
pub struct S1apMme {
    state: StateCache,
    config: Arc<MmeConfig>,
    codec: Box<dyn S1apCodec>,
    outbox: Outbox,
    hss_associated: bool,
    last_latency_us: Option<u64>,
}

impl S1apMme {
    /// Creates a core with an empty directory
    pub fn new(config: Arc<MmeConfig>, codec: Box<dyn S1apCodec>) -> Self {
        Self::with_directory(config, codec, Directory::new())
    }

    /// Creates a core around a restored directory
    pub fn with_directory(
        config: Arc<MmeConfig>,
        codec: Box<dyn S1apCodec>,
        directory: Directory,
    ) -> Self {
        let persist = config.s1ap.persist_state;
        let hss_associated = config.hss_associated;
        Self {
            state: StateCache::new(directory, persist),
            config,
            codec,
            outbox: Outbox::default(),
            hss_associated,
            last_latency_us: None,
        }
    }

    /// Read-only view of the directory
    pub fn directory(&self) -> &Directory {
        self.state.directory()
    }

    /// Configuration in use
    pub fn config(&self) -> &MmeConfig {
        &self.config
    }

    /// Serializes the directory.
    pub fn snapshot(&self) -> Result<Vec<u8>, DirectoryError> {
        self.state.directory().save()
    }

    /// Snapshot taken at the last check-in, when `persist_state` is set
    pub fn last_snapshot(&self) -> Option<&[u8]> {
        self.state.last_snapshot()
    }

    /// Whether the subscriber-data interface is up
    pub fn is_hss_associated(&self) -> bool {
        self.hss_associated
    }

    /// Takes every action queued since the last call.
    pub fn drain_actions(&mut self) -> Vec<Action> {
        self.outbox.drain()
    }

    /// Records the queueing latency of the message about to be handled.
    pub fn record_latency(&mut self, latency: Duration) {
        self.last_latency_us = Some(u64::try_from(latency.as_micros()).unwrap_or(u64::MAX));
    }

    fn with_context<R>(&mut self, f: impl FnOnce(&mut HandlerContext<'_>) -> R) -> R {
        let mut guard = self.state.checkout();
        let mut ctx = HandlerContext {
            dir: &mut guard,
            config: &self.config,
            codec: self.codec.as_ref(),
            outbox: &mut self.outbox,
            hss_associated: self.hss_associated,
            last_latency_us: self.last_latency_us,
        };
        f(&mut ctx)
    }

    /// Handles an S1AP payload received on `assoc_id`/`stream`.
    ///
    /// A payload that does not decode is dropped before any state is touched.
    pub fn handle_pdu(&mut self, assoc_id: u32, stream: u16, bytes: &[u8]) -> Result<(), S1apError> {
        let pdu = match self.codec.decode(bytes) {
            Ok(pdu) => pdu,
            Err(e) => {
                warn!(
                    "Failed to decode S1AP PDU: assoc={} stream={} len={}: {}",
                    assoc_id,
                    stream,
                    bytes.len(),
                    e
                );
                return Err(e.into());
            }
        };
        log_s1ap_message(Direction::Rx, pdu.name(), assoc_id, bytes);
        self.with_context(|ctx| dispatcher::dispatch(ctx, assoc_id, stream, pdu))
    }

    /// Handles a new SCTP association.
    pub fn handle_new_association(
        &mut self,
        assoc_id: u32,
        in_streams: u16,
        out_streams: u16,
        peer_address: Option<std::net::IpAddr>,
    ) -> Result<(), S1apError> {
        self.with_context(|ctx| {
            enb_procedures::handle_new_association(
                ctx,
                assoc_id,
                in_streams,
                out_streams,
                peer_address,
            )
        })
    }

    /// Handles an SCTP reset (`is_reset`) or shutdown of an association.
    pub fn handle_disconnection(&mut self, assoc_id: u32, is_reset: bool) -> Result<(), S1apError> {
        self.with_context(|ctx| enb_procedures::handle_disconnection(ctx, assoc_id, is_reset))
    }

    /// Runs the generator for a request of the MME application.
    pub fn handle_app_request(&mut self, request: AppRequest) -> Result<(), S1apError> {
        debug!("App request: {}", request.name());
        self.with_context(|ctx| dispatcher::dispatch_app_request(ctx, request))
    }

    /// Handles expiry of a UE context-release guard timer.
    pub fn handle_release_timer_expiry(
        &mut self,
        timer_id: u64,
        mme_ue_s1ap_id: MmeUeS1apId,
    ) -> Result<(), S1apError> {
        self.with_context(|ctx| {
            ue_procedures::handle_release_timer_expiry(ctx, timer_id, mme_ue_s1ap_id)
        })
    }

    /// Handles expiry of an eNB clean-up timer.
    pub fn handle_enb_cleanup_timer_expiry(&mut self, assoc_id: u32) {
        self.with_context(|ctx| enb_procedures::handle_enb_cleanup_timer_expiry(ctx, assoc_id))
    }

    /// Forwards an SCTP delivery report for a UE-associated send.
    pub fn handle_data_confirm(
        &mut self,
        assoc_id: u32,
        mme_ue_s1ap_id: MmeUeS1apId,
        delivered: bool,
    ) {
        self.with_context(|ctx| {
            ue_procedures::handle_data_confirm(ctx, assoc_id, mme_ue_s1ap_id, delivered)
        })
    }

    /// Marks the subscriber-data interface as up; S1 Setup is accepted from
    /// now on.
    pub fn activate(&mut self) {
        if !self.hss_associated {
            info!("S1AP activated, accepting S1 Setup");
        }
        self.hss_associated = true;
    }

    /// Queues timer starts for every timer recorded in the directory, after
    /// a restore.
    pub fn rearm_timers(&mut self) {
        let cleanup = self.config.s1ap.enb_cleanup_timer_ms;
        let mut actions = Vec::new();
        for enb in self.state.directory().enbs() {
            if enb.state == EnbState::Shutdown {
                if let Some(ms) = cleanup {
                    actions.push(Action::StartEnbCleanupTimer {
                        assoc_id: enb.sctp_assoc_id,
                        duration: Duration::from_millis(ms),
                    });
                }
            }
            for ue in enb.ues.values() {
                if ue.state != UeState::WaitingContextReleaseComplete {
                    continue;
                }
                if let (Some(timer_id), Some(mme_ue_s1ap_id)) =
                    (ue.release_timer.id, ue.mme_ue_s1ap_id)
                {
                    actions.push(Action::StartReleaseTimer {
                        timer_id,
                        mme_ue_s1ap_id,
                        duration: Duration::from_millis(ue.release_timer.duration_ms),
                    });
                }
            }
        }
        if !actions.is_empty() {
            info!("Re-arming {} timer(s) from restored state", actions.len());
        }
        for action in actions {
            self.outbox.push(action);
        }
    }
}
