//! UE attach integration tests
//!
//! Initial UE Message through NAS transport, Initial Context Setup and
//! UE context release, with the mock eNB on one side and the harness
//! playing the MME application on the other.

use bytes::Bytes;

use s1mme_common::Imsi;
use s1mme_mme::s1ap::events::{ConnectionEstablishmentCnf, DownlinkNasRequest};
use s1mme_mme::{AppRequest, ReleaseCause, S1apEvent, UeState};
use s1mme_s1ap::ies::{
    Cause, CauseRadioNetwork, EnbUeS1apId, MmeUeS1apId, UeS1apIds, SECURITY_KEY_SIZE,
};
use s1mme_s1ap::InitiatingMessageValue;
use s1mme_tests::{
    default_ambr, default_bearer, default_security_capabilities, enb_bearer, expect_event,
    init_test_logging, release_command_ids, MmeHarness, MockEnb, TestEnbConfig, TestMmeConfig,
    TestUeConfig,
};

const IMSI: &str = "001010000000001";

fn downlink(enb: &MockEnb, ue: &TestUeConfig, nas: &'static [u8]) -> AppRequest {
    AppRequest::DownlinkNas(DownlinkNasRequest {
        assoc_id: enb.assoc_id(),
        enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
        mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
        nas_pdu: Bytes::from_static(nas),
        imsi: Imsi::parse(&ue.imsi).ok(),
    })
}

/// Brings up one eNB and attaches `ue` up to the first downlink NAS.
async fn attached(harness: &mut MmeHarness, ue: &TestUeConfig) -> MockEnb {
    let enb = harness.enb(TestEnbConfig::default());
    harness.setup_enb(&enb).await.unwrap();
    harness.attach_ue(&enb, 1, ue).await.unwrap();
    harness.request(downlink(&enb, ue, &[0x07, 0x52])).await.unwrap();
    let sent = harness.next_sent().await.unwrap();
    assert_eq!(sent.name(), "DownlinkNasTransport");
    enb
}

/// Test the establishment indication and the NAS exchange that follows
#[tokio::test]
async fn test_attach_nas_exchange() {
    init_test_logging();

    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let enb = harness.enb(TestEnbConfig::with_ids(1, 0x101));
    harness.setup_enb(&enb).await.unwrap();

    let ue = TestUeConfig::with_ids(7, 100).with_imsi(IMSI);
    enb.initial_ue_message(2, &ue).await.unwrap();
    let msg = harness.next_event().await.unwrap();
    assert!(msg.imsi.is_none());
    expect_event!(msg, S1apEvent::EstablishIndication(ind) => {
        assert_eq!(ind.assoc_id, 1);
        assert_eq!(ind.enb_id, 0x101);
        assert_eq!(ind.enb_ue_s1ap_id, EnbUeS1apId::new(7));
        assert_eq!(ind.nas_pdu, ue.nas_pdu);
        assert_eq!(ind.tai, enb.config().tai());
        assert_eq!(ind.ecgi.enb_id(), 0x101);
    });

    harness
        .request(AppRequest::MmeUeIdNotification {
            assoc_id: 1,
            enb_ue_s1ap_id: EnbUeS1apId::new(7),
            mme_ue_s1ap_id: MmeUeS1apId(100),
        })
        .await
        .unwrap();
    harness
        .request(downlink(&enb, &ue, &[0x07, 0x52]))
        .await
        .unwrap();

    // arrived on stream 2, answered on the first allocated stream
    let sent = harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 1));
    assert_eq!(sent.mme_ue_s1ap_id, Some(MmeUeS1apId(100)));
    match sent.initiating() {
        Some(InitiatingMessageValue::DownlinkNasTransport(dl)) => {
            assert_eq!(dl.enb_ue_s1ap_id, EnbUeS1apId::new(7));
            assert_eq!(&dl.nas_pdu[..], &[0x07, 0x52]);
        }
        other => panic!("expected Downlink NAS Transport, got {other:?}"),
    }

    harness
        .confirm_delivery(1, MmeUeS1apId(100), true)
        .await
        .unwrap();
    expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::NasDlDataConfirm { mme_ue_s1ap_id, delivered } => {
            assert_eq!(mme_ue_s1ap_id, MmeUeS1apId(100));
            assert!(delivered);
        });

    enb.uplink_nas(2, &ue, Bytes::from_static(&[0x07, 0x53]))
        .await
        .unwrap();
    let msg = harness.next_event().await.unwrap();
    assert_eq!(msg.imsi.as_ref().map(|imsi| imsi.digits()), Some(IMSI));
    expect_event!(msg, S1apEvent::UplinkNas { mme_ue_s1ap_id, nas_pdu, .. } => {
        assert_eq!(mme_ue_s1ap_id, MmeUeS1apId(100));
        assert_eq!(&nas_pdu[..], &[0x07, 0x53]);
    });

    let task = harness.stop().await.unwrap();
    let ue = task
        .mme()
        .directory()
        .ue(1, EnbUeS1apId::new(7))
        .unwrap()
        .clone();
    assert_eq!(ue.state, UeState::Connected);
    assert_eq!((ue.sctp_stream_recv, ue.sctp_stream_send), (2, 1));
}

/// Test Initial Context Setup request and response
#[tokio::test]
async fn test_initial_context_setup() {
    init_test_logging();

    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let ue = TestUeConfig::default();
    let enb = attached(&mut harness, &ue).await;

    harness
        .request(AppRequest::ConnectionEstablishmentCnf(
            ConnectionEstablishmentCnf {
                mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
                ue_aggregate_maximum_bitrate: default_ambr(),
                e_rabs: vec![default_bearer(5)],
                ue_security_capabilities: default_security_capabilities(),
                security_key: Bytes::from(vec![0xAB; SECURITY_KEY_SIZE]),
                ue_radio_capability: None,
                cs_fallback_indicator: None,
            },
        ))
        .await
        .unwrap();

    let sent = harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 1));
    match sent.initiating() {
        Some(InitiatingMessageValue::InitialContextSetupRequest(req)) => {
            assert_eq!(req.enb_ue_s1ap_id, EnbUeS1apId::new(ue.enb_ue_s1ap_id));
            assert_eq!(req.e_rab_to_be_setup_list.len(), 1);
            assert_eq!(req.security_key.len(), SECURITY_KEY_SIZE);
        }
        other => panic!("expected Initial Context Setup Request, got {other:?}"),
    }

    enb.initial_context_setup_response(1, &ue, vec![enb_bearer(5, 20)])
        .await
        .unwrap();
    expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::InitialContextSetupResponse { mme_ue_s1ap_id, e_rab_setup_list, e_rab_failed_list } => {
            assert_eq!(mme_ue_s1ap_id, MmeUeS1apId(ue.mme_ue_s1ap_id));
            assert_eq!(e_rab_setup_list, vec![enb_bearer(5, 20)]);
            assert!(e_rab_failed_list.is_empty());
        });

    harness.stop().await.unwrap();
}

/// Test that a short security key is refused without signalling
#[tokio::test]
async fn test_initial_context_setup_bad_key() {
    init_test_logging();

    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let ue = TestUeConfig::default();
    attached(&mut harness, &ue).await;

    harness
        .request(AppRequest::ConnectionEstablishmentCnf(
            ConnectionEstablishmentCnf {
                mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
                ue_aggregate_maximum_bitrate: default_ambr(),
                e_rabs: vec![default_bearer(5)],
                ue_security_capabilities: default_security_capabilities(),
                security_key: Bytes::from_static(&[0x01; 16]),
                ue_radio_capability: None,
                cs_fallback_indicator: None,
            },
        ))
        .await
        .unwrap();
    assert!(harness.nothing_sent().await);

    let task = harness.stop().await.unwrap();
    assert!(task.fatal_error().is_none());
}

/// Test eNB-initiated release through Release Complete
#[tokio::test]
async fn test_enb_initiated_release() {
    init_test_logging();

    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let ue = TestUeConfig::default();
    let enb = attached(&mut harness, &ue).await;

    enb.ue_context_release_request(
        1,
        &ue,
        Cause::RadioNetwork(CauseRadioNetwork::UserInactivity),
    )
    .await
    .unwrap();

    expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::UeContextReleaseRequest { mme_ue_s1ap_id, enb_id, cause, .. } => {
            assert_eq!(mme_ue_s1ap_id, MmeUeS1apId(ue.mme_ue_s1ap_id));
            assert_eq!(enb_id, enb.enb_id());
            assert_eq!(cause, ReleaseCause::RadioEutranGeneratedReason);
        });
    let sent = harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 1));
    assert_eq!(
        release_command_ids(&sent),
        Some(UeS1apIds::Pair {
            mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
            enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
        })
    );

    enb.ue_context_release_complete(1, &ue).await.unwrap();
    expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::UeContextReleaseComplete { mme_ue_s1ap_id, enb_ue_s1ap_id, .. } => {
            assert_eq!(mme_ue_s1ap_id, MmeUeS1apId(ue.mme_ue_s1ap_id));
            assert_eq!(enb_ue_s1ap_id, EnbUeS1apId::new(ue.enb_ue_s1ap_id));
        });

    let task = harness.stop().await.unwrap();
    assert_eq!(task.mme().directory().ue_count(), 0);
    assert_eq!(task.pending_release_timers(), 0);
}

/// Test uplink NAS for an MME UE id nobody knows
#[tokio::test]
async fn test_uplink_nas_for_unknown_ue() {
    init_test_logging();

    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let enb = harness.enb(TestEnbConfig::default());
    harness.setup_enb(&enb).await.unwrap();

    let stale = TestUeConfig::with_ids(9, 999);
    enb.uplink_nas(3, &stale, Bytes::from_static(&[0x07, 0x53]))
        .await
        .unwrap();

    let sent = harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 3));
    assert!(release_command_ids(&sent).is_some());
    expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::RemoveStaleUeContext { enb_ue_s1ap_id, enb_id } => {
            assert_eq!(enb_ue_s1ap_id, EnbUeS1apId::new(9));
            assert_eq!(enb_id, enb.enb_id());
        });

    harness.stop().await.unwrap();
}

/// Test that a duplicate Initial UE Message leaves the first context alone
#[tokio::test]
async fn test_duplicate_initial_ue_message() {
    init_test_logging();

    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let enb = harness.enb(TestEnbConfig::default());
    harness.setup_enb(&enb).await.unwrap();

    let ue = TestUeConfig::default();
    harness.attach_ue(&enb, 1, &ue).await.unwrap();
    enb.initial_ue_message(2, &ue).await.unwrap();
    assert!(
        harness
            .no_event_within(std::time::Duration::from_millis(100))
            .await
    );

    let task = harness.stop().await.unwrap();
    let dir = task.mme().directory();
    assert_eq!(dir.ue_count(), 1);
    assert_eq!(
        dir.locate_ue(MmeUeS1apId(ue.mme_ue_s1ap_id)),
        Some((1, EnbUeS1apId::new(ue.enb_ue_s1ap_id)))
    );
}
