//! UE context release guard timer integration tests
//!
//! The S1AP task arms a guard timer with every UE Context Release Command;
//! these tests run it with a short timer so expiry is observable.

use std::time::Duration;

use bytes::Bytes;

use s1mme_mme::s1ap::events::DownlinkNasRequest;
use s1mme_mme::{AppRequest, ReleaseCause, S1apEvent};
use s1mme_s1ap::ies::{EnbUeS1apId, MmeUeS1apId};
use s1mme_tests::{
    expect_event, init_test_logging, release_command_ids, MmeHarness, MockEnb, TestEnbConfig,
    TestMmeConfig, TestUeConfig, FAST_RELEASE_TIMER_MS,
};

fn fast_harness() -> MmeHarness {
    MmeHarness::start(
        TestMmeConfig::default()
            .with_release_timer_ms(FAST_RELEASE_TIMER_MS)
            .build(),
    )
}

/// Attaches `ue` and asks for its release, consuming the Release Command.
async fn release_commanded(harness: &mut MmeHarness, ue: &TestUeConfig) -> MockEnb {
    let enb = harness.enb(TestEnbConfig::default());
    harness.setup_enb(&enb).await.unwrap();
    harness.attach_ue(&enb, 1, ue).await.unwrap();

    harness
        .request(AppRequest::UeContextReleaseCommand {
            mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
            enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
            cause: ReleaseCause::NasDetach,
        })
        .await
        .unwrap();
    let sent = harness.next_sent().await.unwrap();
    assert_eq!((sent.assoc_id, sent.stream), (1, 1));
    assert!(release_command_ids(&sent).is_some());
    enb
}

/// Test that an unanswered Release Command is completed by the timer
#[tokio::test]
async fn test_release_timer_expiry() {
    init_test_logging();

    let mut harness = fast_harness();
    let ue = TestUeConfig::default();
    release_commanded(&mut harness, &ue).await;

    expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::UeContextReleaseComplete { mme_ue_s1ap_id, enb_ue_s1ap_id, enb_id } => {
            assert_eq!(mme_ue_s1ap_id, MmeUeS1apId(ue.mme_ue_s1ap_id));
            assert_eq!(enb_ue_s1ap_id, EnbUeS1apId::new(ue.enb_ue_s1ap_id));
            assert_eq!(enb_id, TestEnbConfig::default().enb_id);
        });

    let task = harness.stop().await.unwrap();
    assert_eq!(task.mme().directory().ue_count(), 0);
    assert_eq!(task.pending_release_timers(), 0);
}

/// Test that Release Complete stops the timer and reports once
#[tokio::test]
async fn test_release_complete_stops_timer() {
    init_test_logging();

    let mut harness = fast_harness();
    let ue = TestUeConfig::default();
    let enb = release_commanded(&mut harness, &ue).await;

    enb.ue_context_release_complete(1, &ue).await.unwrap();
    expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::UeContextReleaseComplete { mme_ue_s1ap_id, .. } => {
            assert_eq!(mme_ue_s1ap_id, MmeUeS1apId(ue.mme_ue_s1ap_id));
        });
    assert!(
        harness
            .no_event_within(Duration::from_millis(FAST_RELEASE_TIMER_MS * 4))
            .await
    );

    let task = harness.stop().await.unwrap();
    assert_eq!(task.pending_release_timers(), 0);
}

/// Test that downlink NAS is refused while the release is pending
#[tokio::test]
async fn test_downlink_nas_refused_during_release() {
    init_test_logging();

    let mut harness = fast_harness();
    let ue = TestUeConfig::default();
    let enb = release_commanded(&mut harness, &ue).await;

    harness
        .request(AppRequest::DownlinkNas(DownlinkNasRequest {
            assoc_id: enb.assoc_id(),
            enb_ue_s1ap_id: EnbUeS1apId::new(ue.enb_ue_s1ap_id),
            mme_ue_s1ap_id: MmeUeS1apId(ue.mme_ue_s1ap_id),
            nas_pdu: Bytes::from_static(&[0x07, 0x46]),
            imsi: None,
        }))
        .await
        .unwrap();
    assert!(harness.nothing_sent().await);

    expect_event!(harness.next_event().await.unwrap(),
        S1apEvent::UeContextReleaseComplete { .. } => ());
    harness.stop().await.unwrap();
}

/// Test that releasing an unknown UE is a no-op
#[tokio::test]
async fn test_release_of_unknown_ue() {
    init_test_logging();

    let mut harness = fast_harness();
    let enb = harness.enb(TestEnbConfig::default());
    harness.setup_enb(&enb).await.unwrap();

    harness
        .request(AppRequest::UeContextReleaseCommand {
            mme_ue_s1ap_id: MmeUeS1apId(4242),
            enb_ue_s1ap_id: EnbUeS1apId::new(1),
            cause: ReleaseCause::NasNormalRelease,
        })
        .await
        .unwrap();
    assert!(harness.nothing_sent().await);
    assert!(
        harness
            .no_event_within(Duration::from_millis(FAST_RELEASE_TIMER_MS * 2))
            .await
    );

    let task = harness.stop().await.unwrap();
    assert!(task.fatal_error().is_none());
    assert_eq!(task.pending_release_timers(), 0);
}
