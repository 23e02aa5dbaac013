//! S1 handover integration tests
//!
//! Handover preparation, execution and completion between two mock eNBs,
//! plus cancellation and X2 path switch.

use bytes::Bytes;

use s1mme_common::Imsi;
use s1mme_mme::s1ap::events::{
    DownlinkNasRequest, HandoverCommandRequest, HandoverResourceRequest, PathSwitchAckParams,
};
use s1mme_mme::{AppRequest, S1apEvent, UeState};
use s1mme_s1ap::ies::{
    Cause, CauseRadioNetwork, EnbIdChoice, EnbUeS1apId, GlobalEnbId, HandoverType, MmeUeS1apId,
    PlmnIdentity, SecurityContext, TargetEnbId, TargetId, NEXT_HOP_SIZE,
};
use s1mme_s1ap::procedures::{
    HandoverCancel, HandoverNotify, HandoverRequestAcknowledge, HandoverRequired,
    PathSwitchRequest, StatusTransfer,
};
use s1mme_s1ap::{InitiatingMessageValue, SuccessfulOutcomeValue};
use s1mme_tests::{
    default_ambr, default_security_capabilities, enb_bearer, expect_event, handover_bearer,
    init_test_logging, release_command_ids, MmeHarness, MockEnb, TestEnbConfig, TestMmeConfig,
    TestUeConfig, TEST_PLMN,
};

const TARGET_ENB_UE: u32 = 77;

struct Scenario {
    harness: MmeHarness,
    source: MockEnb,
    target: MockEnb,
    ue: TestUeConfig,
}

/// Two ready eNBs and a connected UE on the first one.
async fn scenario() -> Scenario {
    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let source = harness.enb(TestEnbConfig::with_ids(1, 0x101));
    let target = harness.enb(TestEnbConfig::with_ids(2, 0x102));
    harness.setup_enb(&source).await.unwrap();
    harness.setup_enb(&target).await.unwrap();

    let ue = TestUeConfig::default();
    harness.attach_ue(&source, 1, &ue).await.unwrap();
    harness
        .request(AppRequest::DownlinkNas(DownlinkNasRequest {
            assoc_id: source.assoc_id(),
            enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
            mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
            nas_pdu: Bytes::from_static(&[0x07, 0x42]),
            imsi: Imsi::parse(&ue.imsi).ok(),
        }))
        .await
        .unwrap();
    harness.next_sent().await.unwrap();

    Scenario {
        harness,
        source,
        target,
        ue,
    }
}

fn handover_required(ue: &TestUeConfig, target: &MockEnb) -> InitiatingMessageValue {
    InitiatingMessageValue::HandoverRequired(HandoverRequired {
        mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
        enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
        handover_type: HandoverType::IntraLte,
        cause: Cause::RadioNetwork(CauseRadioNetwork::HandoverDesirableForRadioReason),
        target_id: TargetId::TargetEnbId(TargetEnbId {
            global_enb_id: GlobalEnbId {
                plmn_identity: PlmnIdentity::from(TEST_PLMN),
                enb_id: EnbIdChoice::macro_enb(target.enb_id()).unwrap(),
            },
            selected_tai: target.config().tai_ie(),
        }),
        source_to_target_transparent_container: Bytes::from_static(b"source-to-target"),
    })
}

fn resource_request(ue: &TestUeConfig, target: &MockEnb) -> AppRequest {
    AppRequest::HandoverRequest(HandoverResourceRequest {
        mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
        target_assoc_id: target.assoc_id(),
        handover_type: HandoverType::IntraLte,
        cause: Cause::RadioNetwork(CauseRadioNetwork::HandoverDesirableForRadioReason),
        ue_aggregate_maximum_bitrate: default_ambr(),
        e_rabs: vec![handover_bearer(5)],
        source_to_target_container: Bytes::from_static(b"source-to-target"),
        ue_security_capabilities: default_security_capabilities(),
        security_context: SecurityContext {
            next_hop_chaining_count: 2,
            next_hop_parameter: Bytes::from(vec![0x5A; NEXT_HOP_SIZE]),
        },
    })
}

/// Runs Handover Required through Handover Command, checking each leg.
async fn prepare(s: &mut Scenario) {
    let mme_ue_s1ap_id = MmeUeS1apId(s.ue.mme_ue_s1ap_id);

    s.source
        .send(1, handover_required(&s.ue, &s.target))
        .await
        .unwrap();
    let required = expect_event!(s.harness.next_event().await.unwrap(),
        S1apEvent::HandoverRequired(ev) => ev);
    assert_eq!(required.mme_ue_s1ap_id, mme_ue_s1ap_id);
    assert_eq!((required.source_assoc_id, required.source_enb_id), (1, 0x101));
    assert_eq!((required.target_assoc_id, required.target_enb_id), (2, 0x102));

    s.harness
        .request(resource_request(&s.ue, &s.target))
        .await
        .unwrap();
    let sent = s.harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (2, 1));
    match sent.initiating() {
        Some(InitiatingMessageValue::HandoverRequest(req)) => {
            assert_eq!(req.mme_ue_s1ap_id, mme_ue_s1ap_id);
            assert!(req.e_rab_to_be_setup_list[0].data_forwarding_not_possible);
        }
        other => panic!("expected Handover Request, got {other:?}"),
    }

    s.target
        .respond(
            1,
            SuccessfulOutcomeValue::HandoverRequestAcknowledge(HandoverRequestAcknowledge {
                mme_ue_s1ap_id,
                enb_ue_s1ap_id: EnbUeS1apId::new(TARGET_ENB_UE),
                e_rab_admitted_list: vec![enb_bearer(5, 30)],
                e_rab_failed_to_setup_list: None,
                target_to_source_transparent_container: Bytes::from_static(b"target-to-source"),
            }),
        )
        .await
        .unwrap();
    let ack = expect_event!(s.harness.next_event().await.unwrap(),
        S1apEvent::HandoverRequestAck(ev) => ev);
    assert_eq!(ack.source_enb_ue_s1ap_id, EnbUeS1apId::new(s.ue.enb_ue_s1ap_id));
    assert_eq!(ack.target_enb_ue_s1ap_id, EnbUeS1apId::new(TARGET_ENB_UE));

    s.harness
        .request(AppRequest::HandoverCommand(HandoverCommandRequest {
            mme_ue_s1ap_id,
            source_assoc_id: ack.source_assoc_id,
            source_enb_id: ack.source_enb_id,
            target_enb_id: ack.target_enb_id,
            target_enb_ue_s1ap_id: ack.target_enb_ue_s1ap_id,
            handover_type: ack.handover_type,
            target_to_source_container: ack.target_to_source_container.clone(),
        }))
        .await
        .unwrap();
    let sent = s.harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 1));
    match sent.successful() {
        Some(SuccessfulOutcomeValue::HandoverCommand(cmd)) => {
            assert_eq!(&cmd.target_to_source_transparent_container[..], b"target-to-source");
        }
        other => panic!("expected Handover Command, got {other:?}"),
    }
}

/// Test a complete S1 handover, including the source-side release
#[tokio::test]
async fn test_s1_handover_complete() {
    init_test_logging();

    let mut s = scenario().await;
    prepare(&mut s).await;
    let mme_ue_s1ap_id = MmeUeS1apId(s.ue.mme_ue_s1ap_id);

    s.source
        .send(
            1,
            InitiatingMessageValue::EnbStatusTransfer(StatusTransfer {
                mme_ue_s1ap_id,
                enb_ue_s1ap_id: EnbUeS1apId::new(s.ue.enb_ue_s1ap_id),
                status_transfer_transparent_container: Bytes::from_static(b"pdcp-sn"),
            }),
        )
        .await
        .unwrap();
    let sent = s.harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (2, 1));
    match sent.initiating() {
        Some(InitiatingMessageValue::MmeStatusTransfer(transfer)) => {
            assert_eq!(transfer.enb_ue_s1ap_id, EnbUeS1apId::new(TARGET_ENB_UE));
            assert_eq!(&transfer.status_transfer_transparent_container[..], b"pdcp-sn");
        }
        other => panic!("expected MME Status Transfer, got {other:?}"),
    }

    s.target
        .send(
            1,
            InitiatingMessageValue::HandoverNotify(HandoverNotify {
                mme_ue_s1ap_id,
                enb_ue_s1ap_id: EnbUeS1apId::new(TARGET_ENB_UE),
                eutran_cgi: s.target.config().eutran_cgi(),
                tai: s.target.config().tai_ie(),
            }),
        )
        .await
        .unwrap();
    let notify = expect_event!(s.harness.next_event().await.unwrap(),
        S1apEvent::HandoverNotify(ev) => ev);
    assert_eq!(notify.target_assoc_id, 2);
    assert_eq!(notify.target_enb_ue_s1ap_id, EnbUeS1apId::new(TARGET_ENB_UE));
    assert_eq!(notify.ecgi.enb_id(), 0x102);

    // the source asks to drop its leg
    s.source
        .ue_context_release_request(
            1,
            &s.ue,
            Cause::RadioNetwork(CauseRadioNetwork::SuccessfulHandover),
        )
        .await
        .unwrap();
    let sent = s.harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 1));
    assert!(release_command_ids(&sent).is_some());

    // the late Release Complete from the source leaves the target context alone
    s.source
        .ue_context_release_complete(1, &s.ue)
        .await
        .unwrap();
    assert!(
        s.harness
            .no_event_within(std::time::Duration::from_millis(100))
            .await
    );

    let task = s.harness.stop().await.unwrap();
    let dir = task.mme().directory();
    assert_eq!(
        dir.locate_ue(mme_ue_s1ap_id),
        Some((2, EnbUeS1apId::new(TARGET_ENB_UE)))
    );
    assert!(dir.enb(1).unwrap().ues.is_empty());
    let ue = dir.ue(2, EnbUeS1apId::new(TARGET_ENB_UE)).unwrap();
    assert_eq!(ue.state, UeState::Connected);
    assert_eq!(ue.sctp_stream_send, 1);
}

/// Test Handover Cancel after the Handover Command
#[tokio::test]
async fn test_handover_cancel() {
    init_test_logging();

    let mut s = scenario().await;
    prepare(&mut s).await;
    let mme_ue_s1ap_id = MmeUeS1apId(s.ue.mme_ue_s1ap_id);

    s.source
        .send(
            2,
            InitiatingMessageValue::HandoverCancel(HandoverCancel {
                mme_ue_s1ap_id,
                enb_ue_s1ap_id: EnbUeS1apId::new(s.ue.enb_ue_s1ap_id),
                cause: Cause::RadioNetwork(CauseRadioNetwork::HandoverCancelled),
            }),
        )
        .await
        .unwrap();
    let sent = s.harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 2));
    match sent.successful() {
        Some(SuccessfulOutcomeValue::HandoverCancelAcknowledge(ack)) => {
            assert_eq!(ack.mme_ue_s1ap_id, mme_ue_s1ap_id);
        }
        other => panic!("expected Handover Cancel Acknowledge, got {other:?}"),
    }

    let task = s.harness.stop().await.unwrap();
    let ue = task
        .mme()
        .directory()
        .ue(1, EnbUeS1apId::new(s.ue.enb_ue_s1ap_id))
        .unwrap()
        .clone();
    assert_eq!(ue.state, UeState::Connected);
    assert!(ue.handover.is_none());
}

/// Test X2 path switch moving the UE to the target eNB
#[tokio::test]
async fn test_path_switch() {
    init_test_logging();

    let mut s = scenario().await;
    let mme_ue_s1ap_id = MmeUeS1apId(s.ue.mme_ue_s1ap_id);

    s.target
        .send(
            3,
            InitiatingMessageValue::PathSwitchRequest(PathSwitchRequest {
                enb_ue_s1ap_id: EnbUeS1apId::new(88),
                e_rab_to_be_switched_dl_list: vec![enb_bearer(5, 40), enb_bearer(6, 40)],
                source_mme_ue_s1ap_id: mme_ue_s1ap_id,
                eutran_cgi: s.target.config().eutran_cgi(),
                tai: s.target.config().tai_ie(),
                ue_security_capabilities: default_security_capabilities(),
            }),
        )
        .await
        .unwrap();
    let request = expect_event!(s.harness.next_event().await.unwrap(),
        S1apEvent::PathSwitchRequest(ev) => ev);
    assert_eq!((request.assoc_id, request.enb_id), (2, 0x102));
    assert_eq!(request.e_rabs.len(), 2);

    s.harness
        .request(AppRequest::PathSwitchRequestAck(PathSwitchAckParams {
            mme_ue_s1ap_id,
            enb_ue_s1ap_id: EnbUeS1apId::new(88),
            ue_aggregate_maximum_bitrate: None,
            next_hop_chaining_count: 3,
            next_hop: Some(Bytes::from(vec![0x11; NEXT_HOP_SIZE])),
        }))
        .await
        .unwrap();
    let sent = s.harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (2, 1));
    match sent.successful() {
        Some(SuccessfulOutcomeValue::PathSwitchRequestAcknowledge(ack)) => {
            assert_eq!(ack.security_context.next_hop_chaining_count, 3);
            assert_eq!(ack.security_context.next_hop_parameter.len(), NEXT_HOP_SIZE);
        }
        other => panic!("expected Path Switch Request Acknowledge, got {other:?}"),
    }

    let task = s.harness.stop().await.unwrap();
    let dir = task.mme().directory();
    assert_eq!(
        dir.locate_ue(mme_ue_s1ap_id),
        Some((2, EnbUeS1apId::new(88)))
    );
    assert_eq!(dir.ue_count(), 1);
}
