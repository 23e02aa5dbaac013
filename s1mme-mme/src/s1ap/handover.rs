//! S1 handover and path switch
//!
//! # Architecture
//!
//! ```text
//!  source eNB            MME core             target eNB
//!      │ HandoverRequired   │                      │
//!      │───────────────────►│ ──► app              │
//!      │                    │ HandoverRequest      │
//!      │                    │─────────────────────►│
//!      │                    │ HandoverRequestAck   │
//!      │                    │◄─────────────────────│
//!      │ HandoverCommand    │                      │
//!      │◄───────────────────│  (UE: HandoverInProgress)
//!      │ eNBStatusTransfer  │ MMEStatusTransfer    │
//!      │───────────────────►│─────────────────────►│
//!      │                    │ HandoverNotify       │
//!      │                    │◄─────────────────────│
//!      │                    │  (UE context moves to the target)
//! ```
//!
//! The UE context lives on the source association until Notify (or Path
//! Switch Request) relocates it; the handover sub-state records both sides'
//! ids and streams in between.

use bytes::Bytes;
use tracing::{debug, info, warn};

use s1mme_common::UnsupportedHandoverPolicy;
use s1mme_s1ap::ies::{
    Cause, CauseRadioNetwork, EnbUeS1apId, HandoverType, MmeUeS1apId, SecurityContext, TargetId,
    NEXT_HOP_SIZE,
};
use s1mme_s1ap::pdu::{InitiatingMessage, ProcedureCode};
use s1mme_s1ap::procedures::{
    HandoverCancel, HandoverCancelAcknowledge, HandoverCommand, HandoverFailure, HandoverNotify,
    HandoverPreparationFailure, HandoverRequest, HandoverRequestAcknowledge, HandoverRequired,
    PathSwitchRequest, PathSwitchRequestAcknowledge, PathSwitchRequestFailure,
};
use s1mme_s1ap::{InitiatingMessageValue, S1apPdu, SuccessfulOutcomeValue, UnsuccessfulOutcomeValue};

use super::directory::DirectoryError;
use super::error::S1apError;
use super::events::{
    HandoverCommandRequest, HandoverNotifyEvent, HandoverRequestAckEvent, HandoverRequiredEvent,
    HandoverResourceRequest, PathSwitchAckParams, PathSwitchRequestEvent, S1apEvent,
};
use super::mme::HandlerContext;
use super::ue_context::{HandoverState, UeContext, UeState};
use super::ue_procedures::{enb_id_of, resolve_ue_pair, ue_or_unknown};

/// Cause of a Path Switch Request Failure.
pub const PATH_SWITCH_FAILURE_CAUSE: Cause =
    Cause::RadioNetwork(CauseRadioNetwork::HoFailureInTargetEpcEnbOrTargetSystem);

/// Cause of a Handover Preparation Failure for an unsupported handover.
pub const UNSUPPORTED_HANDOVER_CAUSE: Cause = Cause::RadioNetwork(CauseRadioNetwork::Unspecified);

fn unknown_mme_id(mme_ue_s1ap_id: MmeUeS1apId) -> S1apError {
    S1apError::UnknownUe(format!("mme_ue_s1ap_id={mme_ue_s1ap_id}"))
}

fn locate(ctx: &HandlerContext<'_>, mme_ue_s1ap_id: MmeUeS1apId) -> Result<(u32, EnbUeS1apId), S1apError> {
    ctx.dir.locate_ue(mme_ue_s1ap_id).ok_or_else(|| {
        warn!("No UE context for mme_ue_s1ap_id={}", mme_ue_s1ap_id);
        unknown_mme_id(mme_ue_s1ap_id)
    })
}

fn reject_if_taken(
    ctx: &HandlerContext<'_>,
    assoc_id: u32,
    enb_ue_s1ap_id: EnbUeS1apId,
) -> Result<(), S1apError> {
    if ctx.dir.ue(assoc_id, enb_ue_s1ap_id).is_some() {
        warn!(
            "enb_ue_s1ap_id={} already in use on assoc={}",
            enb_ue_s1ap_id, assoc_id
        );
        return Err(DirectoryError::DuplicateUe {
            assoc_id,
            enb_ue_s1ap_id,
        }
        .into());
    }
    Ok(())
}

// ============================================================================
// Handover preparation
// ============================================================================

fn reject_unsupported_handover(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    msg: &HandoverRequired,
    reason: String,
) -> Result<(), S1apError> {
    match ctx.config.s1ap.unsupported_handover_policy {
        UnsupportedHandoverPolicy::Drop => {
            warn!(
                "Dropping Handover Required for mme_ue_s1ap_id={}: {}",
                msg.mme_ue_s1ap_id, reason
            );
            Err(S1apError::Validation(reason))
        }
        UnsupportedHandoverPolicy::SendPreparationFailure => {
            let stream = ue_or_unknown(ctx, assoc_id, msg.enb_ue_s1ap_id)?.sctp_stream_send;
            info!(
                "Rejecting Handover Required for mme_ue_s1ap_id={}: {}",
                msg.mme_ue_s1ap_id, reason
            );
            let pdu = S1apPdu::from(UnsuccessfulOutcomeValue::HandoverPreparationFailure(
                HandoverPreparationFailure {
                    mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
                    enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
                    cause: UNSUPPORTED_HANDOVER_CAUSE,
                },
            ));
            ctx.send_pdu(assoc_id, stream, pdu, Some(msg.mme_ue_s1ap_id))
        }
    }
}

/// Handover Required (source eNB)
pub fn handle_handover_required(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    _stream: u16,
    msg: HandoverRequired,
) -> Result<(), S1apError> {
    let (ue_assoc, _) = resolve_ue_pair(ctx, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
    if ue_assoc != assoc_id {
        return Err(S1apError::Validation(format!(
            "mme_ue_s1ap_id={} is not served by assoc {assoc_id}",
            msg.mme_ue_s1ap_id
        )));
    }
    if msg.handover_type != HandoverType::IntraLte {
        let reason = format!("handover type {:?} not supported", msg.handover_type);
        return reject_unsupported_handover(ctx, assoc_id, &msg, reason);
    }
    let target_enb_id = match msg.target_id {
        TargetId::TargetEnbId(target) => target.global_enb_id.enb_id.enb_id(),
        _ => {
            let reason = "target is not an eNB".to_string();
            return reject_unsupported_handover(ctx, assoc_id, &msg, reason);
        }
    };
    let Some(target_assoc_id) = ctx.dir.assoc_for_enb_id(target_enb_id) else {
        warn!(
            "Handover Required for mme_ue_s1ap_id={}: no eNB {:#x}",
            msg.mme_ue_s1ap_id, target_enb_id
        );
        return Err(S1apError::UnknownEnb(target_enb_id));
    };
    let source_enb_id = enb_id_of(ctx, assoc_id);

    info!(
        "Handover Required: mme_ue_s1ap_id={} eNB {:#x} -> {:#x} cause={}",
        msg.mme_ue_s1ap_id, source_enb_id, target_enb_id, msg.cause
    );
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::HandoverRequired(HandoverRequiredEvent {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            source_enb_id,
            source_assoc_id: assoc_id,
            target_enb_id,
            target_assoc_id,
            handover_type: msg.handover_type,
            cause: msg.cause,
            source_to_target_container: msg.source_to_target_transparent_container,
        }),
    );
    Ok(())
}

/// Handover Request towards the target eNB (generator)
pub fn send_handover_request(
    ctx: &mut HandlerContext<'_>,
    req: HandoverResourceRequest,
) -> Result<(), S1apError> {
    let (source_assoc_id, source_enb_ue_s1ap_id) = locate(ctx, req.mme_ue_s1ap_id)?;
    let ue = ue_or_unknown(ctx, source_assoc_id, source_enb_ue_s1ap_id)?;
    if ue.state != UeState::Connected {
        return Err(S1apError::InvalidState(format!(
            "handover request for mme_ue_s1ap_id={} in state {}",
            req.mme_ue_s1ap_id, ue.state
        )));
    }
    let (source_stream_recv, source_stream_send) = (ue.sctp_stream_recv, ue.sctp_stream_send);
    let source_enb_id = enb_id_of(ctx, source_assoc_id);

    let target = ctx
        .dir
        .enb_mut(req.target_assoc_id)
        .ok_or(S1apError::UnknownAssociation(req.target_assoc_id))?;
    if !target.is_ready() {
        return Err(S1apError::InvalidState(format!(
            "handover target assoc {} in state {}",
            req.target_assoc_id, target.state
        )));
    }
    let target_enb_id = target.enb_id.unwrap_or_default();
    let target_stream = target.next_stream();

    // indirect forwarding is not supported
    let e_rab_to_be_setup_list = req
        .e_rabs
        .into_iter()
        .map(|mut e_rab| {
            e_rab.data_forwarding_not_possible = true;
            e_rab
        })
        .collect();
    let pdu = S1apPdu::from(InitiatingMessageValue::HandoverRequest(HandoverRequest {
        mme_ue_s1ap_id: req.mme_ue_s1ap_id,
        handover_type: req.handover_type,
        cause: req.cause,
        ue_aggregate_maximum_bitrate: req.ue_aggregate_maximum_bitrate,
        e_rab_to_be_setup_list,
        source_to_target_transparent_container: req.source_to_target_container,
        ue_security_capabilities: req.ue_security_capabilities,
        security_context: req.security_context,
    }));
    ctx.send_pdu(
        req.target_assoc_id,
        target_stream,
        pdu,
        Some(req.mme_ue_s1ap_id),
    )?;

    if let Some(ue) = ctx.dir.ue_mut(source_assoc_id, source_enb_ue_s1ap_id) {
        ue.handover = Some(HandoverState {
            source_enb_id,
            target_enb_id,
            source_enb_ue_s1ap_id: Some(source_enb_ue_s1ap_id),
            target_enb_ue_s1ap_id: None,
            source_sctp_stream_recv: source_stream_recv,
            source_sctp_stream_send: source_stream_send,
            target_sctp_stream_recv: target_stream,
            target_sctp_stream_send: target_stream,
            e_rab_admitted_list: Vec::new(),
        });
    }
    debug!(
        "Handover Request: mme_ue_s1ap_id={} target assoc={} stream={}",
        req.mme_ue_s1ap_id, req.target_assoc_id, target_stream
    );
    Ok(())
}

/// Handover Request Acknowledge (target eNB)
pub fn handle_handover_request_ack(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    stream: u16,
    msg: HandoverRequestAcknowledge,
) -> Result<(), S1apError> {
    let (source_assoc_id, source_enb_ue_s1ap_id) = locate(ctx, msg.mme_ue_s1ap_id)?;
    let source_enb_id = enb_id_of(ctx, source_assoc_id);
    let target_enb_id = enb_id_of(ctx, assoc_id);

    let ue = ctx
        .dir
        .ue_mut(source_assoc_id, source_enb_ue_s1ap_id)
        .ok_or_else(|| unknown_mme_id(msg.mme_ue_s1ap_id))?;
    let Some(ho) = ue.handover.as_mut() else {
        warn!(
            "Handover Request Acknowledge for mme_ue_s1ap_id={} without a prepared handover",
            msg.mme_ue_s1ap_id
        );
        return Err(S1apError::InvalidState(
            "handover request acknowledge without handover request".into(),
        ));
    };
    ho.target_enb_id = target_enb_id;
    ho.target_enb_ue_s1ap_id = Some(msg.enb_ue_s1ap_id);
    ho.target_sctp_stream_recv = stream;
    ho.e_rab_admitted_list = msg.e_rab_admitted_list;

    if let Some(failed) = msg.e_rab_failed_to_setup_list.as_ref().filter(|l| !l.is_empty()) {
        warn!(
            "Target eNB {:#x} did not admit {} bearer(s) for mme_ue_s1ap_id={}",
            target_enb_id,
            failed.len(),
            msg.mme_ue_s1ap_id
        );
    }
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::HandoverRequestAck(HandoverRequestAckEvent {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            source_assoc_id,
            source_enb_id,
            source_enb_ue_s1ap_id,
            target_assoc_id: assoc_id,
            target_enb_id,
            target_enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
            handover_type: HandoverType::IntraLte,
            target_to_source_container: msg.target_to_source_transparent_container,
        }),
    );
    Ok(())
}

/// Handover Command towards the source eNB (generator)
pub fn send_handover_command(
    ctx: &mut HandlerContext<'_>,
    req: HandoverCommandRequest,
) -> Result<(), S1apError> {
    let (assoc_id, enb_ue_s1ap_id) = locate(ctx, req.mme_ue_s1ap_id)?;
    if assoc_id != req.source_assoc_id {
        warn!(
            "Handover Command for mme_ue_s1ap_id={}: UE is on assoc={}, not {}",
            req.mme_ue_s1ap_id, assoc_id, req.source_assoc_id
        );
    }
    let ue = ue_or_unknown(ctx, assoc_id, enb_ue_s1ap_id)?;
    if !ue.state.can_transition_to(UeState::HandoverInProgress) {
        return Err(S1apError::InvalidState(format!(
            "handover command for mme_ue_s1ap_id={} in state {}",
            req.mme_ue_s1ap_id, ue.state
        )));
    }
    let stream = ue.sctp_stream_send;

    let pdu = S1apPdu::from(SuccessfulOutcomeValue::HandoverCommand(HandoverCommand {
        mme_ue_s1ap_id: req.mme_ue_s1ap_id,
        enb_ue_s1ap_id,
        handover_type: req.handover_type,
        target_to_source_transparent_container: req.target_to_source_container,
    }));
    ctx.send_pdu(assoc_id, stream, pdu, Some(req.mme_ue_s1ap_id))?;

    if let Some(ue) = ctx.dir.ue_mut(assoc_id, enb_ue_s1ap_id) {
        ue.transition(UeState::HandoverInProgress);
        let (recv, send) = (ue.sctp_stream_recv, ue.sctp_stream_send);
        let ho = ue.handover_mut();
        ho.source_enb_id = req.source_enb_id;
        ho.target_enb_id = req.target_enb_id;
        ho.source_enb_ue_s1ap_id = Some(enb_ue_s1ap_id);
        ho.target_enb_ue_s1ap_id = Some(req.target_enb_ue_s1ap_id);
        ho.source_sctp_stream_recv = recv;
        ho.source_sctp_stream_send = send;
    }
    info!(
        "Handover Command: mme_ue_s1ap_id={} target eNB {:#x} enb_ue_s1ap_id={}",
        req.mme_ue_s1ap_id, req.target_enb_id, req.target_enb_ue_s1ap_id
    );
    Ok(())
}

// ============================================================================
// Completion and abort
// ============================================================================

/// Handover Notify (target eNB): moves the UE context to the target.
pub fn handle_handover_notify(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    _stream: u16,
    msg: HandoverNotify,
) -> Result<(), S1apError> {
    if ctx.dir.enb(assoc_id).is_none() {
        return Err(S1apError::UnknownAssociation(assoc_id));
    }
    let source = locate(ctx, msg.mme_ue_s1ap_id)?;
    reject_if_taken(ctx, assoc_id, msg.enb_ue_s1ap_id)?;

    let old = ue_or_unknown(ctx, source.0, source.1)?;
    let Some(ho) = old.handover.clone() else {
        warn!(
            "Handover Notify for mme_ue_s1ap_id={} without handover state",
            msg.mme_ue_s1ap_id
        );
        return Err(S1apError::InvalidState(
            "handover notify without handover".into(),
        ));
    };
    let mut ue = UeContext::new(
        assoc_id,
        msg.enb_ue_s1ap_id,
        ho.target_sctp_stream_recv,
        ho.target_sctp_stream_send,
        old.release_timer.duration_ms,
    );
    ue.mme_ue_s1ap_id = old.mme_ue_s1ap_id;
    ue.release_timer = old.release_timer;
    ue.state = UeState::Connected;
    // the source eNB may still ask for its side to be released
    ue.handover = Some(ho.clone());

    let target_enb_id = enb_id_of(ctx, assoc_id);
    ctx.dir.relocate_ue(source, ue)?;

    info!(
        "Handover complete: mme_ue_s1ap_id={} now on assoc={} enb_ue_s1ap_id={}",
        msg.mme_ue_s1ap_id, assoc_id, msg.enb_ue_s1ap_id
    );
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::HandoverNotify(HandoverNotifyEvent {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            target_assoc_id: assoc_id,
            target_enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
            ecgi: msg.eutran_cgi.ecgi().with_enb_id(target_enb_id),
            tai: msg.tai.tai(),
            admitted: ho.e_rab_admitted_list,
        }),
    );
    Ok(())
}

/// Handover Cancel (source eNB)
pub fn handle_handover_cancel(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    stream: u16,
    msg: HandoverCancel,
) -> Result<(), S1apError> {
    let (ue_assoc, enb_ue_s1ap_id) = locate(ctx, msg.mme_ue_s1ap_id)?;
    info!(
        "Handover Cancel from assoc={} for mme_ue_s1ap_id={} cause={}",
        assoc_id, msg.mme_ue_s1ap_id, msg.cause
    );
    if let Some(ue) = ctx.dir.ue_mut(ue_assoc, enb_ue_s1ap_id) {
        if !ue.abort_handover() {
            info!(
                "mme_ue_s1ap_id={} not in handover, state left as {}",
                msg.mme_ue_s1ap_id, ue.state
            );
        }
    }
    let pdu = S1apPdu::from(SuccessfulOutcomeValue::HandoverCancelAcknowledge(
        HandoverCancelAcknowledge {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
        },
    ));
    ctx.send_pdu(assoc_id, stream, pdu, Some(msg.mme_ue_s1ap_id))
}

/// Handover Failure (target eNB): answers the source with a Handover
/// Preparation Failure.
pub fn handle_handover_failure(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    _stream: u16,
    msg: HandoverFailure,
) -> Result<(), S1apError> {
    let (source_assoc_id, enb_ue_s1ap_id) = locate(ctx, msg.mme_ue_s1ap_id)?;
    warn!(
        "Handover Failure from assoc={} for mme_ue_s1ap_id={} cause={}",
        assoc_id, msg.mme_ue_s1ap_id, msg.cause
    );
    let ue = ctx
        .dir
        .ue_mut(source_assoc_id, enb_ue_s1ap_id)
        .ok_or_else(|| unknown_mme_id(msg.mme_ue_s1ap_id))?;
    if !ue.abort_handover() {
        info!(
            "mme_ue_s1ap_id={} not in handover, state left as {}",
            msg.mme_ue_s1ap_id, ue.state
        );
    }
    let stream = ue.sctp_stream_send;

    let pdu = S1apPdu::from(UnsuccessfulOutcomeValue::HandoverPreparationFailure(
        HandoverPreparationFailure {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            cause: msg.cause,
        },
    ));
    ctx.send_pdu(source_assoc_id, stream, pdu, Some(msg.mme_ue_s1ap_id))
}

/// eNB Status Transfer: relayed to the target eNB as MME Status Transfer
/// with the target's eNB UE id.
pub fn handle_enb_status_transfer(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    _stream: u16,
    pdu: S1apPdu,
) -> Result<(), S1apError> {
    let (criticality, mut transfer) = match pdu {
        S1apPdu::InitiatingMessage(InitiatingMessage {
            criticality,
            value: InitiatingMessageValue::EnbStatusTransfer(transfer),
            ..
        }) => (criticality, transfer),
        other => {
            return Err(S1apError::Dispatch(format!(
                "{} is not an eNB Status Transfer",
                other.name()
            )))
        }
    };
    let (ue_assoc, enb_ue_s1ap_id) = locate(ctx, transfer.mme_ue_s1ap_id)?;
    let ue = ue_or_unknown(ctx, ue_assoc, enb_ue_s1ap_id)?;
    let Some((target_enb_id, Some(target_enb_ue_s1ap_id), target_stream)) =
        ue.handover.as_ref().map(|ho| {
            (
                ho.target_enb_id,
                ho.target_enb_ue_s1ap_id,
                ho.target_sctp_stream_recv,
            )
        })
    else {
        warn!(
            "eNB Status Transfer for mme_ue_s1ap_id={} before the target answered",
            transfer.mme_ue_s1ap_id
        );
        return Err(S1apError::InvalidState(
            "status transfer without handover target".into(),
        ));
    };
    let target_assoc_id = ctx
        .dir
        .assoc_for_enb_id(target_enb_id)
        .ok_or(S1apError::UnknownEnb(target_enb_id))?;

    debug!(
        "Relaying status transfer for mme_ue_s1ap_id={}: assoc={} -> assoc={}",
        transfer.mme_ue_s1ap_id, assoc_id, target_assoc_id
    );
    let mme_ue_s1ap_id = transfer.mme_ue_s1ap_id;
    transfer.enb_ue_s1ap_id = target_enb_ue_s1ap_id;
    let forwarded = S1apPdu::InitiatingMessage(InitiatingMessage {
        procedure_code: ProcedureCode::MmeStatusTransfer.value(),
        criticality,
        value: InitiatingMessageValue::MmeStatusTransfer(transfer),
    });
    ctx.send_pdu(
        target_assoc_id,
        target_stream,
        forwarded,
        Some(mme_ue_s1ap_id),
    )
}

// ============================================================================
// Path switch
// ============================================================================

fn send_path_switch_failure(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    stream: u16,
    mme_ue_s1ap_id: MmeUeS1apId,
    enb_ue_s1ap_id: EnbUeS1apId,
) -> Result<(), S1apError> {
    let pdu = S1apPdu::from(UnsuccessfulOutcomeValue::PathSwitchRequestFailure(
        PathSwitchRequestFailure {
            mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            cause: PATH_SWITCH_FAILURE_CAUSE,
        },
    ));
    ctx.send_pdu(assoc_id, stream, pdu, Some(mme_ue_s1ap_id))
}

/// Path Switch Request (target eNB): moves the UE context to the
/// requesting eNB.
pub fn handle_path_switch_request(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    stream: u16,
    msg: PathSwitchRequest,
) -> Result<(), S1apError> {
    if ctx.dir.enb(assoc_id).is_none() {
        return Err(S1apError::UnknownAssociation(assoc_id));
    }
    let mme_ue_s1ap_id = msg.source_mme_ue_s1ap_id;
    if msg.all_erab_ids_same() {
        warn!(
            "Path Switch Request for mme_ue_s1ap_id={} repeats one E-RAB id",
            mme_ue_s1ap_id
        );
        send_path_switch_failure(ctx, assoc_id, stream, mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
        return Err(S1apError::Validation(
            "path switch request with identical E-RAB ids".into(),
        ));
    }
    let source = locate(ctx, mme_ue_s1ap_id)?;
    reject_if_taken(ctx, assoc_id, msg.enb_ue_s1ap_id)?;

    let old = ue_or_unknown(ctx, source.0, source.1)?;
    let (state, release_timer) = (old.state, old.release_timer);
    let enb = ctx
        .dir
        .enb_mut(assoc_id)
        .ok_or(S1apError::UnknownAssociation(assoc_id))?;
    let enb_id = enb.enb_id.unwrap_or_default();
    let send_stream = enb.next_stream();

    let mut ue = UeContext::new(
        assoc_id,
        msg.enb_ue_s1ap_id,
        stream,
        send_stream,
        release_timer.duration_ms,
    );
    ue.mme_ue_s1ap_id = Some(mme_ue_s1ap_id);
    ue.release_timer = release_timer;
    ue.state = state;
    ctx.dir.relocate_ue(source, ue)?;

    info!(
        "Path switch: mme_ue_s1ap_id={} now on assoc={} enb_ue_s1ap_id={}",
        mme_ue_s1ap_id, assoc_id, msg.enb_ue_s1ap_id
    );
    ctx.notify(
        Some(mme_ue_s1ap_id),
        S1apEvent::PathSwitchRequest(PathSwitchRequestEvent {
            assoc_id,
            enb_id,
            enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
            mme_ue_s1ap_id,
            e_rabs: msg.e_rab_to_be_switched_dl_list,
            ecgi: msg.eutran_cgi.ecgi().with_enb_id(enb_id),
            tai: msg.tai.tai(),
            ue_security_capabilities: msg.ue_security_capabilities,
        }),
    );
    Ok(())
}

/// Path Switch Request Acknowledge (generator)
pub fn send_path_switch_request_ack(
    ctx: &mut HandlerContext<'_>,
    params: PathSwitchAckParams,
) -> Result<(), S1apError> {
    let (assoc_id, enb_ue_s1ap_id) =
        resolve_ue_pair(ctx, params.mme_ue_s1ap_id, params.enb_ue_s1ap_id)?;
    let stream = ue_or_unknown(ctx, assoc_id, enb_ue_s1ap_id)?.sctp_stream_send;

    let next_hop_parameter = match params.next_hop {
        Some(nh) if nh.len() != NEXT_HOP_SIZE => {
            return Err(S1apError::Validation(format!(
                "next hop of {} octets",
                nh.len()
            )));
        }
        Some(nh) => nh,
        None => {
            warn!(
                "Path Switch Request Acknowledge for mme_ue_s1ap_id={} without next hop",
                params.mme_ue_s1ap_id
            );
            Bytes::new()
        }
    };
    let pdu = S1apPdu::from(SuccessfulOutcomeValue::PathSwitchRequestAcknowledge(
        PathSwitchRequestAcknowledge {
            mme_ue_s1ap_id: params.mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            ue_aggregate_maximum_bitrate: params.ue_aggregate_maximum_bitrate,
            e_rab_to_be_switched_ul_list: None,
            security_context: SecurityContext {
                next_hop_chaining_count: params.next_hop_chaining_count,
                next_hop_parameter,
            },
        },
    ));
    ctx.send_pdu(assoc_id, stream, pdu, Some(params.mme_ue_s1ap_id))
}

/// Path Switch Request Failure (generator)
pub fn send_path_switch_request_failure(
    ctx: &mut HandlerContext<'_>,
    mme_ue_s1ap_id: MmeUeS1apId,
    enb_ue_s1ap_id: EnbUeS1apId,
) -> Result<(), S1apError> {
    let (assoc_id, known_enb_ue) = locate(ctx, mme_ue_s1ap_id)?;
    let stream = ue_or_unknown(ctx, assoc_id, known_enb_ue)?.sctp_stream_send;
    send_path_switch_failure(ctx, assoc_id, stream, mme_ue_s1ap_id, enb_ue_s1ap_id)
}
