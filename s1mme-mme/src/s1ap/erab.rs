//! E-RAB management
//!
//! Setup and Release are MME-initiated; the eNB answers with a response (or
//! a Setup Failure). Modification is eNB-initiated and confirmed by the MME.
//! Every eNB message is accepted only for a matching MME/eNB UE id pair.

use tracing::{debug, info, warn};

use s1mme_s1ap::ies::{ErabIdItem, ErabItem, ErabModificationItem, ErabToBeSetupItem};
use s1mme_s1ap::procedures::{
    ErabModificationConfirm, ErabModificationIndication, ErabReleaseCommand,
    ErabReleaseResponse, ErabSetupFailure, ErabSetupRequest, ErabSetupResponse,
};
use s1mme_s1ap::{InitiatingMessageValue, S1apPdu, SuccessfulOutcomeValue};

use super::error::S1apError;
use super::events::{
    BearerEndpoint, ErabModificationConfirmParams, ErabReleaseParams, ErabSetupParams,
    S1apEvent, ERAB_RELEASE_CAUSE,
};
use super::mme::HandlerContext;
use super::ue_context::UeState;
use super::ue_procedures::{mark_connected, resolve_ue_pair, ue_or_unknown};

/// Drops the GBR block of a bearer when all four rates are zero.
fn normalize_qos(mut item: ErabToBeSetupItem) -> ErabToBeSetupItem {
    let qos = &mut item.e_rab_level_qos_parameters;
    qos.gbr_qos_information = qos.gbr_qos_information.and_then(|gbr| gbr.if_present());
    item
}

/// E-RAB Setup Request (generator)
pub fn send_erab_setup_request(
    ctx: &mut HandlerContext<'_>,
    params: ErabSetupParams,
) -> Result<(), S1apError> {
    let Some((assoc_id, enb_ue_s1ap_id)) = ctx.dir.locate_ue(params.mme_ue_s1ap_id) else {
        warn!(
            "E-RAB setup for unknown mme_ue_s1ap_id={}",
            params.mme_ue_s1ap_id
        );
        return Err(S1apError::UnknownUe(format!(
            "mme_ue_s1ap_id={}",
            params.mme_ue_s1ap_id
        )));
    };
    if enb_ue_s1ap_id != params.enb_ue_s1ap_id {
        debug!(
            "E-RAB setup: enb_ue_s1ap_id {} superseded by {}",
            params.enb_ue_s1ap_id, enb_ue_s1ap_id
        );
    }
    let ue = ue_or_unknown(ctx, assoc_id, enb_ue_s1ap_id)?;
    if ue.state == UeState::WaitingContextReleaseComplete {
        return Err(S1apError::InvalidState(format!(
            "E-RAB setup for mme_ue_s1ap_id={} during release",
            params.mme_ue_s1ap_id
        )));
    }
    let stream = ue.sctp_stream_send;

    let e_rab_to_be_setup_list: Vec<ErabToBeSetupItem> =
        params.e_rabs.into_iter().map(normalize_qos).collect();
    debug!(
        "E-RAB Setup Request: mme_ue_s1ap_id={} e_rabs={:?}",
        params.mme_ue_s1ap_id,
        e_rab_to_be_setup_list
            .iter()
            .map(|e| e.e_rab_id)
            .collect::<Vec<_>>()
    );
    let pdu = S1apPdu::from(InitiatingMessageValue::ErabSetupRequest(ErabSetupRequest {
        mme_ue_s1ap_id: params.mme_ue_s1ap_id,
        enb_ue_s1ap_id,
        ue_aggregate_maximum_bitrate: params.ue_aggregate_maximum_bitrate,
        e_rab_to_be_setup_list,
    }));
    ctx.send_pdu(assoc_id, stream, pdu, Some(params.mme_ue_s1ap_id))?;

    if let Some(ue) = ctx.dir.ue_mut(assoc_id, enb_ue_s1ap_id) {
        mark_connected(ue)?;
    }
    Ok(())
}

/// E-RAB Setup Response
pub fn handle_erab_setup_response(
    ctx: &mut HandlerContext<'_>,
    _assoc_id: u32,
    _stream: u16,
    msg: ErabSetupResponse,
) -> Result<(), S1apError> {
    resolve_ue_pair(ctx, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
    let e_rab_setup_list = msg.e_rab_setup_list.unwrap_or_default();
    let e_rab_failed_list = msg.e_rab_failed_to_setup_list.unwrap_or_default();
    info!(
        "E-RAB Setup Response: mme_ue_s1ap_id={} setup={} failed={}",
        msg.mme_ue_s1ap_id,
        e_rab_setup_list.len(),
        e_rab_failed_list.len()
    );
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::ErabSetupResponse {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
            e_rab_setup_list,
            e_rab_failed_list,
        },
    );
    Ok(())
}

/// E-RAB Setup Failure: reported upstream as a setup response in which
/// every bearer failed with the message cause.
pub fn handle_erab_setup_failure(
    ctx: &mut HandlerContext<'_>,
    _assoc_id: u32,
    _stream: u16,
    msg: ErabSetupFailure,
) -> Result<(), S1apError> {
    resolve_ue_pair(ctx, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
    warn!(
        "E-RAB Setup Failure: mme_ue_s1ap_id={} e_rabs={:?} cause={}",
        msg.mme_ue_s1ap_id, msg.e_rab_ids, msg.cause
    );
    let e_rab_failed_list = msg
        .e_rab_ids
        .iter()
        .map(|&e_rab_id| ErabItem {
            e_rab_id,
            cause: msg.cause,
        })
        .collect();
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::ErabSetupResponse {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
            e_rab_setup_list: Vec::new(),
            e_rab_failed_list,
        },
    );
    Ok(())
}

/// E-RAB Release Command (generator)
pub fn send_erab_release_command(
    ctx: &mut HandlerContext<'_>,
    params: ErabReleaseParams,
) -> Result<(), S1apError> {
    let (assoc_id, enb_ue_s1ap_id) =
        resolve_ue_pair(ctx, params.mme_ue_s1ap_id, params.enb_ue_s1ap_id)?;
    let stream = ue_or_unknown(ctx, assoc_id, enb_ue_s1ap_id)?.sctp_stream_send;

    let e_rab_to_be_released_list = params
        .e_rab_ids
        .iter()
        .map(|&e_rab_id| ErabItem {
            e_rab_id,
            cause: ERAB_RELEASE_CAUSE,
        })
        .collect();
    let pdu = S1apPdu::from(InitiatingMessageValue::ErabReleaseCommand(
        ErabReleaseCommand {
            mme_ue_s1ap_id: params.mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            ue_aggregate_maximum_bitrate: params.ue_aggregate_maximum_bitrate,
            e_rab_to_be_released_list,
            nas_pdu: params.nas_pdu,
        },
    ));
    ctx.send_pdu(assoc_id, stream, pdu, Some(params.mme_ue_s1ap_id))
}

/// E-RAB Release Response
pub fn handle_erab_release_response(
    ctx: &mut HandlerContext<'_>,
    _assoc_id: u32,
    _stream: u16,
    msg: ErabReleaseResponse,
) -> Result<(), S1apError> {
    resolve_ue_pair(ctx, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
    let released = msg
        .e_rab_release_list
        .unwrap_or_default()
        .into_iter()
        .map(|item| item.e_rab_id)
        .collect();
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::ErabReleaseResponse {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
            released,
            failed: msg.e_rab_failed_to_release_list.unwrap_or_default(),
        },
    );
    Ok(())
}

fn bearer_endpoint(item: &ErabModificationItem) -> Result<BearerEndpoint, S1apError> {
    let address = item.transport_layer_address.ip_addr().map_err(|e| {
        S1apError::Validation(format!("E-RAB {} transport address: {e}", item.e_rab_id))
    })?;
    Ok(BearerEndpoint {
        e_rab_id: item.e_rab_id,
        address,
        teid: item.dl_gtp_teid,
    })
}

/// E-RAB Modification Indication
pub fn handle_erab_modification_indication(
    ctx: &mut HandlerContext<'_>,
    _assoc_id: u32,
    _stream: u16,
    msg: ErabModificationIndication,
) -> Result<(), S1apError> {
    resolve_ue_pair(ctx, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
    let to_be_modified = msg
        .e_rab_to_be_modified_list
        .iter()
        .map(bearer_endpoint)
        .collect::<Result<Vec<_>, _>>()?;
    let not_to_be_modified = msg
        .e_rab_not_to_be_modified_list
        .unwrap_or_default()
        .iter()
        .map(bearer_endpoint)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        "E-RAB Modification Indication: mme_ue_s1ap_id={} modify={} keep={}",
        msg.mme_ue_s1ap_id,
        to_be_modified.len(),
        not_to_be_modified.len()
    );
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::ErabModificationIndication {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
            to_be_modified,
            not_to_be_modified,
        },
    );
    Ok(())
}

/// E-RAB Modification Confirm (generator)
pub fn send_erab_modification_confirm(
    ctx: &mut HandlerContext<'_>,
    params: ErabModificationConfirmParams,
) -> Result<(), S1apError> {
    let (assoc_id, enb_ue_s1ap_id) =
        resolve_ue_pair(ctx, params.mme_ue_s1ap_id, params.enb_ue_s1ap_id)?;
    let stream = ue_or_unknown(ctx, assoc_id, enb_ue_s1ap_id)?.sctp_stream_send;

    let modified: Vec<ErabIdItem> = params
        .modified
        .iter()
        .map(|&e_rab_id| ErabIdItem { e_rab_id })
        .collect();
    let pdu = S1apPdu::from(SuccessfulOutcomeValue::ErabModificationConfirm(
        ErabModificationConfirm {
            mme_ue_s1ap_id: params.mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            e_rab_modify_list: (!modified.is_empty()).then_some(modified),
            e_rab_failed_to_modify_list: (!params.failed.is_empty()).then_some(params.failed),
        },
    ));
    ctx.send_pdu(assoc_id, stream, pdu, Some(params.mme_ue_s1ap_id))
}
