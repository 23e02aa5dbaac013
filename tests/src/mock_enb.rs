//! Mock eNB and MME harness for integration testing
//!
//! [`MmeHarness`] spawns a real [`S1apTask`] on its channels and plays the
//! SCTP layer and the MME application around it: it can read every PDU the
//! task hands to SCTP and every event it reports upstream. [`MockEnb`] plays
//! one eNodeB association and encodes the uplink S1AP messages an eNB sends.
//!
//! ```text
//!  MockEnb ──S1apMessage──▶ S1apTask ──SctpMessage───▶ MmeHarness::next_sent
//!                              │      ──MmeAppMessage─▶ MmeHarness::next_event
//!  MmeHarness::request ────────┘
//! ```

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;

use s1mme_common::MmeConfig;
use s1mme_mme::{
    AppRequest, MmeAppMessage, MmeTaskBase, S1apEvent, S1apMessage, S1apTask, SctpMessage, Task,
    TaskHandle, TaskMessage, DEFAULT_CHANNEL_CAPACITY,
};
use s1mme_s1ap::ies::{
    Cause, EnbIdChoice, EnbUeS1apId, ErabSetupItem, GlobalEnbId, MmeUeS1apId, PagingDrx,
    PlmnIdentity, RrcEstablishmentCause, SupportedTaItem, UeS1apIds,
};
use s1mme_s1ap::procedures::{
    InitialContextSetupResponse, InitialUeMessage, S1SetupRequest, UeContextReleaseComplete,
    UeContextReleaseRequest, UplinkNasTransport,
};
use s1mme_s1ap::{
    decode_s1ap_pdu, encode_s1ap_pdu, InitiatingMessageValue, JsonCodec, S1apCodecError, S1apPdu,
    SuccessfulOutcomeValue, UnsuccessfulOutcomeValue,
};

use crate::test_fixtures::{TestEnbConfig, TestUeConfig, TEST_PLMN};
use crate::test_utils::{DEFAULT_TEST_TIMEOUT, QUIET_PERIOD};

/// Errors raised by the mock eNB and the harness
#[derive(Debug, Error)]
pub enum MockEnbError {
    #[error("S1AP task channel closed")]
    ChannelClosed,
    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("Codec error: {0}")]
    Codec(#[from] S1apCodecError),
    #[error("Invalid test parameter: {0}")]
    InvalidParameter(String),
    #[error("Unexpected message: {0}")]
    Unexpected(&'static str),
    #[error("S1AP task panicked")]
    TaskPanicked,
}

/// A PDU the S1AP task handed to the SCTP layer
#[derive(Debug, Clone, PartialEq)]
pub struct SentPdu {
    /// Association
    pub assoc_id: u32,
    /// Stream
    pub stream: u16,
    /// Decoded PDU
    pub pdu: S1apPdu,
    /// UE the payload was tagged with
    pub mme_ue_s1ap_id: Option<MmeUeS1apId>,
}

impl SentPdu {
    /// Message name, for assertions and panics
    pub fn name(&self) -> &'static str {
        self.pdu.name()
    }

    /// Initiating message body, if this is one
    pub fn initiating(&self) -> Option<&InitiatingMessageValue> {
        match &self.pdu {
            S1apPdu::InitiatingMessage(m) => Some(&m.value),
            _ => None,
        }
    }

    /// Successful outcome body, if this is one
    pub fn successful(&self) -> Option<&SuccessfulOutcomeValue> {
        match &self.pdu {
            S1apPdu::SuccessfulOutcome(m) => Some(&m.value),
            _ => None,
        }
    }

    /// Unsuccessful outcome body, if this is one
    pub fn unsuccessful(&self) -> Option<&UnsuccessfulOutcomeValue> {
        match &self.pdu {
            S1apPdu::UnsuccessfulOutcome(m) => Some(&m.value),
            _ => None,
        }
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A running S1AP task with the SCTP and application sides captured
pub struct MmeHarness {
    base: MmeTaskBase,
    task: JoinHandle<S1apTask>,
    sctp_rx: mpsc::Receiver<TaskMessage<SctpMessage>>,
    app_rx: mpsc::Receiver<TaskMessage<MmeAppMessage>>,
}

impl MmeHarness {
    /// Spawns an S1AP task with an empty directory.
    pub fn start(config: MmeConfig) -> Self {
        let (base, s1ap_rx, sctp_rx, app_rx) = MmeTaskBase::new(config, DEFAULT_CHANNEL_CAPACITY);
        let mut task = S1apTask::new(base.clone(), Box::new(JsonCodec));
        let task = tokio::spawn(async move {
            task.run(s1ap_rx).await;
            task
        });
        Self {
            base,
            task,
            sctp_rx,
            app_rx,
        }
    }

    /// Mock eNB bound to this harness's S1AP channel
    pub fn enb(&self, config: TestEnbConfig) -> MockEnb {
        MockEnb {
            config,
            tx: self.base.s1ap_tx.clone(),
        }
    }

    /// Configuration the task runs with
    pub fn config(&self) -> &MmeConfig {
        &self.base.config
    }

    /// Plays the MME application: hands a request to the S1AP task.
    pub async fn request(&self, request: AppRequest) -> Result<(), MockEnbError> {
        debug!("Harness request: {}", request.name());
        self.base
            .s1ap_tx
            .send(S1apMessage::AppRequest(request))
            .await
            .map_err(|_| MockEnbError::ChannelClosed)
    }

    /// Plays the SCTP layer: reports a delivery outcome.
    pub async fn confirm_delivery(
        &self,
        assoc_id: u32,
        mme_ue_s1ap_id: MmeUeS1apId,
        delivered: bool,
    ) -> Result<(), MockEnbError> {
        self.base
            .s1ap_tx
            .send(S1apMessage::SctpDataConfirm {
                assoc_id,
                mme_ue_s1ap_id,
                delivered,
            })
            .await
            .map_err(|_| MockEnbError::ChannelClosed)
    }

    /// Next PDU sent towards any eNB.
    pub async fn next_sent(&mut self) -> Result<SentPdu, MockEnbError> {
        match timeout(DEFAULT_TEST_TIMEOUT, self.sctp_rx.recv()).await {
            Ok(Some(TaskMessage::Message(SctpMessage::SendMessage {
                assoc_id,
                stream,
                buffer,
                mme_ue_s1ap_id,
            }))) => Ok(SentPdu {
                assoc_id,
                stream,
                pdu: decode_s1ap_pdu(&buffer)?,
                mme_ue_s1ap_id,
            }),
            Ok(Some(TaskMessage::Shutdown)) | Ok(None) => Err(MockEnbError::ChannelClosed),
            Err(_) => Err(MockEnbError::Timeout("an SCTP send")),
        }
    }

    /// Next event reported to the MME application.
    pub async fn next_event(&mut self) -> Result<MmeAppMessage, MockEnbError> {
        match timeout(DEFAULT_TEST_TIMEOUT, self.app_rx.recv()).await {
            Ok(Some(TaskMessage::Message(msg))) => Ok(msg),
            Ok(Some(TaskMessage::Shutdown)) | Ok(None) => Err(MockEnbError::ChannelClosed),
            Err(_) => Err(MockEnbError::Timeout("an application event")),
        }
    }

    /// True if nothing is sent towards the eNBs for a short while.
    pub async fn nothing_sent(&mut self) -> bool {
        timeout(QUIET_PERIOD, self.sctp_rx.recv()).await.is_err()
    }

    /// True if no event reaches the application for `period`.
    pub async fn no_event_within(&mut self, period: Duration) -> bool {
        timeout(period, self.app_rx.recv()).await.is_err()
    }

    /// Brings `enb` up and consumes its S1 Setup Response.
    pub async fn setup_enb(&mut self, enb: &MockEnb) -> Result<(), MockEnbError> {
        enb.connect_and_setup().await?;
        let sent = self.next_sent().await?;
        match sent.successful() {
            Some(SuccessfulOutcomeValue::S1SetupResponse(_)) if sent.assoc_id == enb.assoc_id() => {
                Ok(())
            }
            _ => Err(MockEnbError::Unexpected(sent.name())),
        }
    }

    /// Runs Initial UE Message on `stream` and binds the UE's MME UE id,
    /// consuming the establishment indication.
    pub async fn attach_ue(
        &mut self,
        enb: &MockEnb,
        stream: u16,
        ue: &TestUeConfig,
    ) -> Result<(), MockEnbError> {
        enb.initial_ue_message(stream, ue).await?;
        let msg = self.next_event().await?;
        if !matches!(msg.event, S1apEvent::EstablishIndication(_)) {
            return Err(MockEnbError::Unexpected(msg.event.name()));
        }
        self.request(AppRequest::MmeUeIdNotification {
            assoc_id: enb.assoc_id(),
            enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
            mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
        })
        .await
    }

    /// Stops the task and hands it back for inspection.
    pub async fn stop(self) -> Result<S1apTask, MockEnbError> {
        self.base
            .s1ap_tx
            .shutdown()
            .await
            .map_err(|_| MockEnbError::ChannelClosed)?;
        self.task.await.map_err(|_| MockEnbError::TaskPanicked)
    }
}

// ============================================================================
// Mock eNB
// ============================================================================

/// One simulated eNodeB association
#[derive(Debug, Clone)]
pub struct MockEnb {
    config: TestEnbConfig,
    tx: TaskHandle<S1apMessage>,
}

impl MockEnb {
    /// Association id
    pub fn assoc_id(&self) -> u32 {
        self.config.assoc_id
    }

    /// eNB id
    pub fn enb_id(&self) -> u32 {
        self.config.enb_id
    }

    /// eNB configuration
    pub fn config(&self) -> &TestEnbConfig {
        &self.config
    }

    async fn deliver(&self, msg: S1apMessage) -> Result<(), MockEnbError> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| MockEnbError::ChannelClosed)
    }

    /// Sends an encoded PDU on `stream`.
    pub async fn send_pdu(&self, stream: u16, pdu: S1apPdu) -> Result<(), MockEnbError> {
        debug!(
            "eNB {:#x} -> MME: {} on stream {}",
            self.config.enb_id,
            pdu.name(),
            stream
        );
        let buffer = encode_s1ap_pdu(&pdu)?;
        self.deliver(S1apMessage::data(self.config.assoc_id, stream, buffer))
            .await
    }

    /// Sends raw bytes on `stream`.
    pub async fn send_raw(&self, stream: u16, buffer: Bytes) -> Result<(), MockEnbError> {
        self.deliver(S1apMessage::data(self.config.assoc_id, stream, buffer))
            .await
    }

    /// Sends an initiating message on `stream`.
    pub async fn send(&self, stream: u16, value: InitiatingMessageValue) -> Result<(), MockEnbError> {
        self.send_pdu(stream, S1apPdu::from(value)).await
    }

    /// Sends a successful outcome on `stream`.
    pub async fn respond(
        &self,
        stream: u16,
        value: SuccessfulOutcomeValue,
    ) -> Result<(), MockEnbError> {
        self.send_pdu(stream, S1apPdu::from(value)).await
    }

    /// Sends an unsuccessful outcome on `stream`.
    pub async fn reject(
        &self,
        stream: u16,
        value: UnsuccessfulOutcomeValue,
    ) -> Result<(), MockEnbError> {
        self.send_pdu(stream, S1apPdu::from(value)).await
    }

    /// SCTP association comes up.
    pub async fn connect(&self) -> Result<(), MockEnbError> {
        self.deliver(S1apMessage::NewAssociation {
            assoc_id: self.config.assoc_id,
            in_streams: self.config.in_streams,
            out_streams: self.config.out_streams,
            peer_address: None,
        })
        .await
    }

    /// SCTP association goes away.
    pub async fn disconnect(&self, is_reset: bool) -> Result<(), MockEnbError> {
        self.deliver(S1apMessage::Disconnection {
            assoc_id: self.config.assoc_id,
            is_reset,
        })
        .await
    }

    /// S1 Setup Request for this eNB
    pub fn s1_setup_request(&self) -> Result<InitiatingMessageValue, MockEnbError> {
        let enb_id = EnbIdChoice::macro_enb(self.config.enb_id)
            .map_err(|e| MockEnbError::InvalidParameter(e.to_string()))?;
        Ok(InitiatingMessageValue::S1SetupRequest(S1SetupRequest {
            global_enb_id: GlobalEnbId {
                plmn_identity: PlmnIdentity::from(TEST_PLMN),
                enb_id,
            },
            enb_name: Some(format!("enb-{:x}", self.config.enb_id)),
            supported_tas: vec![SupportedTaItem {
                tac: self.config.tac,
                broadcast_plmns: vec![PlmnIdentity::from(TEST_PLMN)],
            }],
            default_paging_drx: PagingDrx::V128,
        }))
    }

    /// Sends S1 Setup Request on stream 0.
    pub async fn s1_setup(&self) -> Result<(), MockEnbError> {
        let request = self.s1_setup_request()?;
        self.send(0, request).await
    }

    /// Connects and sends S1 Setup Request.
    pub async fn connect_and_setup(&self) -> Result<(), MockEnbError> {
        self.connect().await?;
        self.s1_setup().await
    }

    /// Sends Initial UE Message for `ue` on `stream`.
    pub async fn initial_ue_message(
        &self,
        stream: u16,
        ue: &TestUeConfig,
    ) -> Result<(), MockEnbError> {
        self.send(
            stream,
            InitiatingMessageValue::InitialUeMessage(InitialUeMessage {
                enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
                nas_pdu: ue.nas_pdu.clone(),
                tai: self.config.tai_ie(),
                eutran_cgi: self.config.eutran_cgi(),
                rrc_establishment_cause: RrcEstablishmentCause::MoSignalling,
                s_tmsi: None,
                csg_id: None,
                gummei: None,
            }),
        )
        .await
    }

    /// Sends Uplink NAS Transport for `ue`.
    pub async fn uplink_nas(
        &self,
        stream: u16,
        ue: &TestUeConfig,
        nas_pdu: Bytes,
    ) -> Result<(), MockEnbError> {
        self.send(
            stream,
            InitiatingMessageValue::UplinkNasTransport(UplinkNasTransport {
                mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
                enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
                nas_pdu,
                eutran_cgi: self.config.eutran_cgi(),
                tai: self.config.tai_ie(),
            }),
        )
        .await
    }

    /// Answers an Initial Context Setup Request with every bearer set up.
    pub async fn initial_context_setup_response(
        &self,
        stream: u16,
        ue: &TestUeConfig,
        e_rab_setup_list: Vec<ErabSetupItem>,
    ) -> Result<(), MockEnbError> {
        self.respond(
            stream,
            SuccessfulOutcomeValue::InitialContextSetupResponse(InitialContextSetupResponse {
                mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
                enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
                e_rab_setup_list,
                e_rab_failed_to_setup_list: None,
            }),
        )
        .await
    }

    /// Asks the MME to release `ue`.
    pub async fn ue_context_release_request(
        &self,
        stream: u16,
        ue: &TestUeConfig,
        cause: Cause,
    ) -> Result<(), MockEnbError> {
        self.send(
            stream,
            InitiatingMessageValue::UeContextReleaseRequest(UeContextReleaseRequest {
                mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
                enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
                cause,
            }),
        )
        .await
    }

    /// Completes a UE context release.
    pub async fn ue_context_release_complete(
        &self,
        stream: u16,
        ue: &TestUeConfig,
    ) -> Result<(), MockEnbError> {
        self.respond(
            stream,
            SuccessfulOutcomeValue::UeContextReleaseComplete(UeContextReleaseComplete {
                mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
                enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
            }),
        )
        .await
    }
}

/// Ids of a UE Context Release Command, if `sent` is one.
pub fn release_command_ids(sent: &SentPdu) -> Option<UeS1apIds> {
    match sent.initiating()? {
        InitiatingMessageValue::UeContextReleaseCommand(cmd) => Some(cmd.ue_s1ap_ids),
        _ => None,
    }
}

/// Unwraps an event, panicking with the event name otherwise.
#[macro_export]
macro_rules! expect_event {
    ($msg:expr, $pattern:pat => $body:expr) => {
        match $msg.event {
            $pattern => $body,
            other => panic!("unexpected event {}: {:?}", other.name(), other),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::TestMmeConfig;

    #[tokio::test]
    async fn test_harness_start_stop() {
        let harness = MmeHarness::start(TestMmeConfig::default().build());
        assert_eq!(harness.config().served_tais.len(), 1);
        let task = harness.stop().await.unwrap();
        assert!(task.fatal_error().is_none());
        assert_eq!(task.mme().directory().enb_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_enb_setup() {
        let mut harness = MmeHarness::start(TestMmeConfig::default().build());
        let enb = harness.enb(TestEnbConfig::default());
        enb.connect_and_setup().await.unwrap();

        let sent = harness.next_sent().await.unwrap();
        assert_eq!((sent.assoc_id, sent.stream), (enb.assoc_id(), 0));
        assert_eq!(sent.name(), "S1SetupResponse");
        assert!(sent.mme_ue_s1ap_id.is_none());

        let task = harness.stop().await.unwrap();
        assert_eq!(task.mme().directory().connected_enbs(), 1);
    }

    #[test]
    fn test_invalid_enb_id_rejected() {
        let (base, _s1ap_rx, _sctp_rx, _app_rx) =
            MmeTaskBase::new(TestMmeConfig::default().build(), 4);
        let enb = MockEnb {
            config: TestEnbConfig::with_ids(1, 0x1FF_FFFF),
            tx: base.s1ap_tx.clone(),
        };
        assert!(matches!(
            enb.s1_setup_request(),
            Err(MockEnbError::InvalidParameter(_))
        ));
    }
}
