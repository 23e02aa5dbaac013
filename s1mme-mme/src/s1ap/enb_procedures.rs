//! eNB lifecycle procedures
//!
//! S1 Setup, eNB-initiated Reset, eNB Configuration Transfer and the SCTP
//! association events (new association, reset, shutdown) that drive the eNB
//! state machine:
//!
//! ```text
//!   new association          S1 Setup OK
//!  ────────────────▶ Init ──────────────▶ Ready
//!                     ▲                     │ SCTP reset / shutdown
//!                     │ last UE removed     ▼
//!                     └────────────── Resetting / Shutdown ──▶ removed
//! ```

use std::net::IpAddr;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use s1mme_s1ap::ies::{
    Cause, CauseProtocol, CauseTransport, TimeToWait, UeAssociatedLogicalS1ConnectionItem,
};
use s1mme_s1ap::pdu::{
    InitiatingMessage, InitiatingMessageValue, ProcedureCode, SuccessfulOutcomeValue,
    UnsuccessfulOutcomeValue,
};
use s1mme_s1ap::procedures::{
    Reset, ResetAcknowledge, ResetType, S1SetupFailure, S1SetupRequest, S1SetupResponse,
    MAX_BROADCAST_PLMNS, MAX_SUPPORTED_TAS,
};
use s1mme_s1ap::S1apPdu;

use super::enb_context::{EnbContext, EnbState, SupportedTa};
use super::error::S1apError;
use super::events::{EnbResetAck, EnbResetRequest, ResetKind, S1apEvent, S1_SETUP_HSS_DOWN_CAUSE};
use super::mme::{Action, HandlerContext};
use super::ta_list::{compare_ta_lists, TaMatch};
use super::ue_context::INVALID_MME_UE_S1AP_ID;

// ============================================================================
// SCTP association events
// ============================================================================

/// Creates the eNB context for a new association, or re-initializes an
/// existing one.
pub fn handle_new_association(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    in_streams: u16,
    out_streams: u16,
    peer_address: Option<IpAddr>,
) -> Result<(), S1apError> {
    if let Some(enb) = ctx.dir.enb_mut(assoc_id) {
        if enb.state.is_tearing_down() {
            warn!(
                "New association on assoc={} while eNB is {}, ignoring",
                assoc_id, enb.state
            );
            return Err(S1apError::InvalidState(format!(
                "association {assoc_id} is {}",
                enb.state
            )));
        }
        enb.on_association_up(in_streams, out_streams, peer_address);
        info!(
            "SCTP association re-established: assoc={} in={} out={}",
            assoc_id, in_streams, out_streams
        );
        return Ok(());
    }

    ctx.dir.insert_enb(EnbContext::new(
        assoc_id,
        in_streams,
        out_streams,
        peer_address,
    ));
    info!(
        "SCTP association up: assoc={} in={} out={} peer={:?}",
        assoc_id, in_streams, out_streams, peer_address
    );
    Ok(())
}

/// Handles an SCTP reset (`is_reset`) or shutdown of an association.
///
/// UE contexts that never got an MME UE id are unknown upstream and go away
/// with the association. The remaining UEs are reported to the MME
/// application in batches; the eNB waits in `Resetting`/`Shutdown` until the
/// application released them all.
pub fn handle_disconnection(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    is_reset: bool,
) -> Result<(), S1apError> {
    let Some(enb) = ctx.dir.enb(assoc_id) else {
        warn!("SCTP disconnection on unknown assoc={}", assoc_id);
        return Err(S1apError::UnknownAssociation(assoc_id));
    };
    let enb_id = enb.enb_id;
    let pending: Vec<_> = enb
        .ues
        .values()
        .filter(|ue| ue.mme_ue_s1ap_id.is_none())
        .map(|ue| ue.enb_ue_s1ap_id)
        .collect();
    info!(
        "SCTP {} on assoc={} enb_id={:?}: {} UE(s)",
        if is_reset { "reset" } else { "shutdown" },
        assoc_id,
        enb_id,
        enb.ues.len()
    );

    for enb_ue_s1ap_id in pending {
        debug!(
            "Dropping pending UE context: assoc={} enb_ue_s1ap_id={}",
            assoc_id, enb_ue_s1ap_id
        );
        ctx.remove_ue(assoc_id, enb_ue_s1ap_id);
    }

    let Some(enb) = ctx.dir.enb_mut(assoc_id) else {
        return Ok(());
    };
    if enb.ues.is_empty() {
        if is_reset {
            enb.state = EnbState::Init;
            info!("eNB assoc={} back to Init", assoc_id);
        } else {
            ctx.dir.remove_enb(assoc_id);
            info!("eNB assoc={} removed", assoc_id);
        }
        return Ok(());
    }

    if is_reset {
        // Pending UEs are already gone, so every remaining context is bound
        // and a mismatch here means the directory itself is corrupt.
        if let Err((counter, bound)) = enb.check_ue_count_invariant() {
            error!(
                "eNB assoc={} UE count {} does not match {} owned UE contexts",
                assoc_id, counter, bound
            );
            return Err(S1apError::InvariantViolation(format!(
                "assoc {assoc_id}: nb_ue_associated={counter}, owned={bound}"
            )));
        }
    }

    let batches = enb.deregistration_batches(ctx.config.s1ap.ue_per_deregister_message);
    enb.state = if is_reset {
        EnbState::Resetting
    } else {
        EnbState::Shutdown
    };
    debug!(
        "eNB assoc={} now {}, {} deregistration batch(es)",
        assoc_id,
        enb.state,
        batches.len()
    );
    for ues in batches {
        ctx.notify(
            None,
            S1apEvent::EnbDeregistered {
                enb_id,
                assoc_id,
                ues,
            },
        );
    }

    if !is_reset {
        if let Some(ms) = ctx.config.s1ap.enb_cleanup_timer_ms {
            ctx.outbox.push(Action::StartEnbCleanupTimer {
                assoc_id,
                duration: Duration::from_millis(ms),
            });
        }
    }
    Ok(())
}

/// Force-removes an eNB still in `Shutdown` when its clean-up timer fires.
pub fn handle_enb_cleanup_timer_expiry(ctx: &mut HandlerContext<'_>, assoc_id: u32) {
    let Some(enb) = ctx.dir.enb(assoc_id) else {
        debug!("Clean-up timer for assoc={}: eNB already gone", assoc_id);
        return;
    };
    if enb.state != EnbState::Shutdown {
        debug!(
            "Clean-up timer for assoc={}: eNB is {}, nothing to do",
            assoc_id, enb.state
        );
        return;
    }
    let ues: Vec<_> = enb.ues.keys().copied().collect();
    warn!(
        "Clean-up timer expired for assoc={}, removing eNB with {} UE(s)",
        assoc_id,
        ues.len()
    );
    for enb_ue_s1ap_id in ues {
        ctx.remove_ue(assoc_id, enb_ue_s1ap_id);
    }
    ctx.dir.remove_enb(assoc_id);
}

// ============================================================================
// S1 Setup
// ============================================================================

fn send_s1_setup_failure(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    cause: Cause,
    time_to_wait: Option<TimeToWait>,
) -> Result<(), S1apError> {
    warn!(
        "Rejecting S1 Setup: assoc={} cause={} time_to_wait={:?}",
        assoc_id, cause, time_to_wait
    );
    let pdu = S1apPdu::unsuccessful(UnsuccessfulOutcomeValue::S1SetupFailure(S1SetupFailure {
        cause,
        time_to_wait,
    }));
    ctx.send_pdu(assoc_id, 0, pdu, None)
}

fn supported_tas(request: &S1SetupRequest) -> Vec<SupportedTa> {
    if request.supported_tas.len() > MAX_SUPPORTED_TAS {
        warn!(
            "S1 Setup carries {} supported TAs, keeping the first {}",
            request.supported_tas.len(),
            MAX_SUPPORTED_TAS
        );
    }
    request
        .supported_tas
        .iter()
        .take(MAX_SUPPORTED_TAS)
        .map(|item| {
            let mut ta = SupportedTa::from(item);
            ta.broadcast_plmns.truncate(MAX_BROADCAST_PLMNS);
            ta
        })
        .collect()
}

/// Removes every other eNB context registered under `enb_id`, together with
/// its UEs.
fn evict_stale_enb(ctx: &mut HandlerContext<'_>, enb_id: u32, assoc_id: u32) {
    let Some(stale_assoc) = ctx
        .dir
        .assoc_for_enb_id(enb_id)
        .filter(|stale| *stale != assoc_id)
    else {
        return;
    };
    let ues: Vec<_> = ctx
        .dir
        .enb(stale_assoc)
        .map(|enb| enb.ues.keys().copied().collect())
        .unwrap_or_default();
    warn!(
        "eNB id {:#x} re-registered on assoc={}, evicting stale assoc={} with {} UE(s)",
        enb_id,
        assoc_id,
        stale_assoc,
        ues.len()
    );
    for enb_ue_s1ap_id in ues {
        ctx.complete_ue_release(stale_assoc, enb_ue_s1ap_id);
    }
    ctx.dir.remove_enb(stale_assoc);
}

/// S1 Setup Request
pub fn handle_s1_setup_request(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    stream: u16,
    request: S1SetupRequest,
) -> Result<(), S1apError> {
    if !ctx.hss_associated {
        warn!("S1 Setup on assoc={} while HSS is not associated", assoc_id);
        return send_s1_setup_failure(ctx, assoc_id, S1_SETUP_HSS_DOWN_CAUSE, None);
    }
    if stream != 0 {
        warn!("S1 Setup on assoc={} received on stream {}", assoc_id, stream);
        return send_s1_setup_failure(
            ctx,
            assoc_id,
            Cause::Protocol(CauseProtocol::Unspecified),
            None,
        );
    }
    let Some(enb) = ctx.dir.enb(assoc_id) else {
        // The new-association event may still be in flight; the eNB retries.
        warn!("S1 Setup on unknown assoc={}, ignoring", assoc_id);
        return Ok(());
    };
    if enb.state.is_tearing_down() {
        if let Err((counter, bound)) = enb.check_ue_count_invariant() {
            error!(
                "eNB assoc={} UE count {} does not match {} owned UE contexts",
                assoc_id, counter, bound
            );
            return Err(S1apError::InvariantViolation(format!(
                "assoc {assoc_id}: nb_ue_associated={counter}, owned={bound}"
            )));
        }
        warn!(
            "S1 Setup on assoc={} while eNB is {}, asking to retry",
            assoc_id, enb.state
        );
        return send_s1_setup_failure(
            ctx,
            assoc_id,
            Cause::Transport(CauseTransport::TransportResourceUnavailable),
            Some(TimeToWait::V20s),
        );
    }

    let tas = supported_tas(&request);
    let ta_match = compare_ta_lists(&tas, ctx.config);
    if let Some(cause) = ta_match.failure_cause() {
        warn!(
            "S1 Setup on assoc={}: supported TA list does not match ({})",
            assoc_id, ta_match
        );
        return send_s1_setup_failure(ctx, assoc_id, cause, Some(TimeToWait::V20s));
    }
    debug_assert_eq!(ta_match, TaMatch::Full);

    let enb_id = request.global_enb_id.enb_id.enb_id();
    evict_stale_enb(ctx, enb_id, assoc_id);

    if let Some(enb) = ctx.dir.enb_mut(assoc_id) {
        enb.supported_tas = tas;
        enb.enb_name = request.enb_name.clone();
        enb.default_paging_drx = request.default_paging_drx;
    }
    ctx.dir.set_enb_id(assoc_id, enb_id)?;

    let response = S1SetupResponse::from_gummeis(
        ctx.config.mme_name.clone(),
        &ctx.config.served_gummeis,
        ctx.config.relative_capacity,
    );
    let pdu = S1apPdu::successful(SuccessfulOutcomeValue::S1SetupResponse(response));
    if let Err(e) = ctx.send_pdu(assoc_id, 0, pdu, None) {
        error!(
            "S1 Setup Response for eNB {:#x} failed, removing assoc={}",
            enb_id, assoc_id
        );
        ctx.dir.remove_enb(assoc_id);
        return Err(e);
    }

    if let Some(enb) = ctx.dir.enb_mut(assoc_id) {
        enb.state = EnbState::Ready;
    }
    info!(
        "eNB {:#x} ({}) ready on assoc={}, {} eNB(s) connected",
        enb_id,
        request.enb_name.as_deref().unwrap_or("unnamed"),
        assoc_id,
        ctx.dir.connected_enbs()
    );
    Ok(())
}

// ============================================================================
// Reset
// ============================================================================

/// Resolves one connection of a partial reset to the ids reported upstream.
fn resolve_reset_item(
    ctx: &HandlerContext<'_>,
    assoc_id: u32,
    item: &UeAssociatedLogicalS1ConnectionItem,
) -> UeAssociatedLogicalS1ConnectionItem {
    if let Some(mme_ue_s1ap_id) = item.mme_ue_s1ap_id {
        return match ctx.dir.ue_by_mme_id(mme_ue_s1ap_id) {
            Some(ue) => match item.enb_ue_s1ap_id {
                Some(enb_ue_s1ap_id) if enb_ue_s1ap_id != ue.enb_ue_s1ap_id => {
                    warn!(
                        "Reset item mme_ue_s1ap_id={} enb_ue_s1ap_id={}: context has enb_ue_s1ap_id={}",
                        mme_ue_s1ap_id, enb_ue_s1ap_id, ue.enb_ue_s1ap_id
                    );
                    *item
                }
                _ => UeAssociatedLogicalS1ConnectionItem {
                    mme_ue_s1ap_id: Some(mme_ue_s1ap_id),
                    enb_ue_s1ap_id: Some(ue.enb_ue_s1ap_id),
                },
            },
            None => {
                debug!("Reset item mme_ue_s1ap_id={} unknown", mme_ue_s1ap_id);
                UeAssociatedLogicalS1ConnectionItem {
                    mme_ue_s1ap_id: Some(INVALID_MME_UE_S1AP_ID),
                    enb_ue_s1ap_id: item.enb_ue_s1ap_id,
                }
            }
        };
    }
    match item.enb_ue_s1ap_id {
        Some(enb_ue_s1ap_id) => UeAssociatedLogicalS1ConnectionItem {
            mme_ue_s1ap_id: Some(
                ctx.dir
                    .ue(assoc_id, enb_ue_s1ap_id)
                    .map_or(INVALID_MME_UE_S1AP_ID, |ue| ue.mme_id_or_invalid()),
            ),
            enb_ue_s1ap_id: Some(enb_ue_s1ap_id),
        },
        None => UeAssociatedLogicalS1ConnectionItem {
            mme_ue_s1ap_id: Some(INVALID_MME_UE_S1AP_ID),
            enb_ue_s1ap_id: None,
        },
    }
}

/// eNB-initiated Reset, forwarded to the MME application which answers with
/// [`send_reset_acknowledge`].
pub fn handle_reset(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    stream: u16,
    reset: Reset,
) -> Result<(), S1apError> {
    let enb = ctx
        .dir
        .enb(assoc_id)
        .ok_or(S1apError::UnknownAssociation(assoc_id))?;
    if !enb.is_ready() {
        warn!("Reset on assoc={} while eNB is {}", assoc_id, enb.state);
        return Err(S1apError::InvalidState(format!(
            "reset on assoc {assoc_id} in state {}",
            enb.state
        )));
    }
    let enb_id = enb.enb_id.unwrap_or_default();

    let (kind, ues) = match &reset.reset_type {
        ResetType::S1Interface => {
            let mut ues: Vec<_> = enb
                .ues
                .values()
                .map(|ue| UeAssociatedLogicalS1ConnectionItem {
                    mme_ue_s1ap_id: ue.mme_ue_s1ap_id,
                    enb_ue_s1ap_id: Some(ue.enb_ue_s1ap_id),
                })
                .collect();
            ues.sort_by_key(|item| item.enb_ue_s1ap_id);
            (ResetKind::Full, ues)
        }
        ResetType::PartOfS1Interface(items) => {
            if items.is_empty() {
                return Err(S1apError::Validation(
                    "partial reset without connections".into(),
                ));
            }
            let ues = items
                .iter()
                .map(|item| resolve_reset_item(ctx, assoc_id, item))
                .collect();
            (ResetKind::Partial, ues)
        }
    };

    info!(
        "Reset from eNB {:#x} on assoc={}: {:?}, {} connection(s), cause {}",
        enb_id,
        assoc_id,
        kind,
        ues.len(),
        reset.cause
    );
    ctx.notify(
        None,
        S1apEvent::EnbResetRequest(EnbResetRequest {
            assoc_id,
            stream,
            enb_id,
            kind,
            ues,
        }),
    );
    Ok(())
}

/// Reset Acknowledge for an eNB-initiated Reset.
pub fn send_reset_acknowledge(
    ctx: &mut HandlerContext<'_>,
    ack: EnbResetAck,
) -> Result<(), S1apError> {
    if ctx.dir.enb(ack.assoc_id).is_none() {
        return Err(S1apError::UnknownAssociation(ack.assoc_id));
    }
    let connections = match ack.kind {
        ResetKind::Full => None,
        ResetKind::Partial => {
            if ack.ues.is_empty() {
                return Err(S1apError::Validation(
                    "partial reset acknowledge without connections".into(),
                ));
            }
            Some(
                ack.ues
                    .iter()
                    .map(|item| UeAssociatedLogicalS1ConnectionItem {
                        mme_ue_s1ap_id: item
                            .mme_ue_s1ap_id
                            .filter(|id| *id != INVALID_MME_UE_S1AP_ID),
                        enb_ue_s1ap_id: item.enb_ue_s1ap_id,
                    })
                    .collect(),
            )
        }
    };
    let pdu = S1apPdu::successful(SuccessfulOutcomeValue::ResetAcknowledge(ResetAcknowledge {
        ue_associated_logical_s1_connections: connections,
    }));
    ctx.send_pdu(ack.assoc_id, ack.stream, pdu, None)
}

// ============================================================================
// Configuration Transfer
// ============================================================================

/// eNB Configuration Transfer, relayed as MME Configuration Transfer to the
/// target eNB named in the SON container.
pub fn handle_enb_configuration_transfer(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    _stream: u16,
    pdu: S1apPdu,
) -> Result<(), S1apError> {
    let enb = ctx
        .dir
        .enb(assoc_id)
        .ok_or(S1apError::UnknownAssociation(assoc_id))?;
    if !enb.is_ready() {
        return Err(S1apError::InvalidState(format!(
            "configuration transfer on assoc {assoc_id} in state {}",
            enb.state
        )));
    }

    let (criticality, transfer) = match pdu {
        S1apPdu::InitiatingMessage(InitiatingMessage {
            criticality,
            value: InitiatingMessageValue::EnbConfigurationTransfer(transfer),
            ..
        }) => (criticality, transfer),
        other => {
            return Err(S1apError::Dispatch(format!(
                "{} is not an eNB Configuration Transfer",
                other.name()
            )))
        }
    };
    let Some(son) = transfer.son_configuration_transfer.as_ref() else {
        return Err(S1apError::Validation(
            "configuration transfer without SON container".into(),
        ));
    };
    let target_enb_id = son.target_enb_id.global_enb_id.enb_id.enb_id();
    let target_assoc = ctx
        .dir
        .assoc_for_enb_id(target_enb_id)
        .ok_or(S1apError::UnknownEnb(target_enb_id))?;

    debug!(
        "Relaying configuration transfer assoc={} -> eNB {:#x} assoc={}",
        assoc_id, target_enb_id, target_assoc
    );
    let forwarded = S1apPdu::InitiatingMessage(InitiatingMessage {
        procedure_code: ProcedureCode::MmeConfigurationTransfer.value(),
        criticality,
        value: InitiatingMessageValue::MmeConfigurationTransfer(transfer),
    });
    ctx.send_pdu(target_assoc, 0, forwarded, None)
}
