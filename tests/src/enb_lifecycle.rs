//! eNB lifecycle integration tests
//!
//! S1 Setup, eNB-initiated Reset, SCTP reset and shutdown, and paging
//! fan-out, driven through a running S1AP task.

use std::time::Duration;

use s1mme_common::Tai;
use s1mme_mme::s1ap::events::{EnbResetAck, PagingRequest, ResetKind};
use s1mme_mme::{AppRequest, EnbState, ReleaseCause, S1apEvent};
use s1mme_s1ap::ies::{
    Cause, CauseMisc, CnDomain, EnbUeS1apId, MmeUeS1apId, TimeToWait, UePagingIdentity,
};
use s1mme_s1ap::procedures::{Reset, ResetType};
use s1mme_s1ap::{InitiatingMessageValue, SuccessfulOutcomeValue, UnsuccessfulOutcomeValue};
use s1mme_tests::{
    expect_event, init_test_logging, MmeHarness, TestEnbConfig, TestMmeConfig, TestUeConfig,
    TEST_PLMN,
};

/// Test S1 Setup of an eNB broadcasting a served TAC
#[tokio::test]
async fn test_s1_setup_accepted() {
    init_test_logging();

    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let enb = harness.enb(TestEnbConfig::with_ids(1, 0x101));
    enb.connect_and_setup().await.unwrap();

    let sent = harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 0));
    match sent.successful() {
        Some(SuccessfulOutcomeValue::S1SetupResponse(rsp)) => {
            assert_eq!(rsp.mme_name.as_deref(), Some("Test-MME"));
        }
        other => panic!("expected S1 Setup Response, got {other:?}"),
    }

    let task = harness.stop().await.unwrap();
    let enb = task.mme().directory().enb(1).unwrap();
    assert_eq!(enb.state, EnbState::Ready);
    assert_eq!(enb.enb_id, Some(0x101));
}

/// Test S1 Setup rejected when no broadcast TAC is served
#[tokio::test]
async fn test_s1_setup_rejected_for_unknown_tac() {
    init_test_logging();

    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let enb = harness.enb(TestEnbConfig::with_ids(1, 0x101).with_tac(9));
    enb.connect_and_setup().await.unwrap();

    let sent = harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 0));
    match sent.unsuccessful() {
        Some(UnsuccessfulOutcomeValue::S1SetupFailure(failure)) => {
            assert_eq!(failure.time_to_wait, Some(TimeToWait::V20s));
        }
        other => panic!("expected S1 Setup Failure, got {other:?}"),
    }

    let task = harness.stop().await.unwrap();
    assert_eq!(task.mme().directory().connected_enbs(), 0);
}

/// Test eNB-initiated full Reset and its acknowledgement
#[tokio::test]
async fn test_enb_reset_acknowledged() {
    init_test_logging();

    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let enb = harness.enb(TestEnbConfig::default());
    harness.setup_enb(&enb).await.unwrap();
    harness
        .attach_ue(&enb, 1, &TestUeConfig::with_ids(1, 100))
        .await
        .unwrap();

    enb.send(
        0,
        InitiatingMessageValue::Reset(Reset {
            cause: Cause::Misc(CauseMisc::OmIntervention),
            reset_type: ResetType::S1Interface,
        }),
    )
    .await
    .unwrap();

    let request = expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::EnbResetRequest(request) => request);
    assert_eq!(request.kind, ResetKind::Full);
    assert_eq!(request.ues.len(), 1);
    assert_eq!(request.ues[0].mme_ue_s1ap_id, Some(MmeUeS1apId(100)));

    harness
        .request(AppRequest::EnbResetAck(EnbResetAck {
            assoc_id: request.assoc_id,
            stream: request.stream,
            kind: request.kind,
            ues: request.ues.clone(),
        }))
        .await
        .unwrap();

    let sent = harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 0));
    match sent.successful() {
        Some(SuccessfulOutcomeValue::ResetAcknowledge(ack)) => {
            assert!(ack.ue_associated_logical_s1_connections.is_none());
        }
        other => panic!("expected Reset Acknowledge, got {other:?}"),
    }

    harness.stop().await.unwrap();
}

/// Test SCTP reset: deregistration in batches, then back to Init once the
/// application has released every UE
#[tokio::test]
async fn test_sctp_reset_deregisters_in_batches() {
    init_test_logging();

    let mut harness =
        MmeHarness::start(TestMmeConfig::default().with_deregister_batch(2).build());
    let enb = harness.enb(TestEnbConfig::default());
    harness.setup_enb(&enb).await.unwrap();
    for i in 1..=3 {
        harness
            .attach_ue(&enb, 1, &TestUeConfig::with_ids(i, 100 + i))
            .await
            .unwrap();
    }

    enb.disconnect(true).await.unwrap();

    let mut deregistered = Vec::new();
    let mut batches = Vec::new();
    while deregistered.len() < 3 {
        let ues = expect_event!(harness.next_event().await.unwrap(),
            S1apEvent::EnbDeregistered { enb_id, assoc_id, ues } => {
                assert_eq!(enb_id, Some(enb.enb_id()));
                assert_eq!(assoc_id, enb.assoc_id());
                ues
            });
        batches.push(ues.len());
        deregistered.extend(ues);
    }
    assert_eq!(batches, vec![2, 1]);

    for ue in &deregistered {
        harness
            .request(AppRequest::UeContextReleaseCommand {
                mme_ue_s1ap_id: ue.mme_ue_s1ap_id,
                enb_ue_s1ap_id: ue.enb_ue_s1ap_id,
                cause: ReleaseCause::SctpShutdownOrReset,
            })
            .await
            .unwrap();
    }
    assert!(harness.nothing_sent().await);

    let task = harness.stop().await.unwrap();
    let dir = task.mme().directory();
    assert_eq!(dir.ue_count(), 0);
    assert_eq!(dir.enb(1).unwrap().state, EnbState::Init);
}

/// Test that a UE without an MME UE id is dropped on disconnection
#[tokio::test]
async fn test_pending_ue_dropped_on_reset() {
    init_test_logging();

    let mut harness = MmeHarness::start(TestMmeConfig::default().build());
    let enb = harness.enb(TestEnbConfig::default());
    harness.setup_enb(&enb).await.unwrap();
    enb.initial_ue_message(1, &TestUeConfig::default())
        .await
        .unwrap();
    expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::EstablishIndication(ind) => {
            assert_eq!(ind.enb_ue_s1ap_id, EnbUeS1apId::new(1));
        });

    enb.disconnect(true).await.unwrap();
    assert!(harness.no_event_within(Duration::from_millis(100)).await);

    let task = harness.stop().await.unwrap();
    let dir = task.mme().directory();
    assert_eq!(dir.ue_count(), 0);
    assert_eq!(dir.enb(1).unwrap().state, EnbState::Init);
}

/// Test SCTP shutdown with the clean-up timer removing the eNB
#[tokio::test]
async fn test_sctp_shutdown_cleanup_timer() {
    init_test_logging();

    let mut harness =
        MmeHarness::start(TestMmeConfig::default().with_enb_cleanup_timer_ms(30).build());
    let enb = harness.enb(TestEnbConfig::default());
    harness.setup_enb(&enb).await.unwrap();
    harness
        .attach_ue(&enb, 1, &TestUeConfig::default())
        .await
        .unwrap();

    enb.disconnect(false).await.unwrap();
    expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::EnbDeregistered { ues, .. } => assert_eq!(ues.len(), 1));

    // nobody releases the UE, the timer does
    tokio::time::sleep(Duration::from_millis(150)).await;

    let task = harness.stop().await.unwrap();
    let dir = task.mme().directory();
    assert!(dir.enb(1).is_none());
    assert!(dir.locate_ue(MmeUeS1apId(100)).is_none());
}

/// Test paging fan-out to every ready eNB serving the tracking area
#[tokio::test]
async fn test_paging_fan_out() {
    init_test_logging();

    let mut harness = MmeHarness::start(
        TestMmeConfig {
            tacs: vec![1, 2],
            ..TestMmeConfig::default()
        }
        .build(),
    );
    let enbs = [
        harness.enb(TestEnbConfig::with_ids(3, 0x103)),
        harness.enb(TestEnbConfig::with_ids(1, 0x101)),
        harness.enb(TestEnbConfig::with_ids(2, 0x102).with_tac(2)),
    ];
    for enb in &enbs {
        harness.setup_enb(enb).await.unwrap();
    }

    let imsi = s1mme_common::Imsi::parse("001010123456789").unwrap();
    harness
        .request(AppRequest::Paging(PagingRequest {
            imsi: imsi.clone(),
            s_tmsi: None,
            cn_domain: CnDomain::Ps,
            paging_drx: None,
            tai_list: vec![Tai::new(TEST_PLMN, 1)],
        }))
        .await
        .unwrap();

    let mut paged = Vec::new();
    for _ in 0..2 {
        let sent = harness.next_sent().await.unwrap();
        assert_eq!(sent.stream, 0);
        assert!(sent.mme_ue_s1ap_id.is_none());
        match sent.initiating() {
            Some(InitiatingMessageValue::Paging(paging)) => {
                assert_eq!(
                    paging.ue_paging_id,
                    UePagingIdentity::Imsi("001010123456789".to_string())
                );
                assert_eq!(
                    u64::from(paging.ue_identity_index_value),
                    imsi.to_imsi64() % 1024
                );
            }
            other => panic!("expected Paging, got {other:?}"),
        }
        paged.push(sent.assoc_id);
    }
    assert_eq!(paged, vec![1, 3]);
    assert!(harness.nothing_sent().await);

    harness.stop().await.unwrap();
}
