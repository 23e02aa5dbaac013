//! UE-associated procedures
//!
//! Initial UE Message, NAS transport, Initial Context Setup, UE Context
//! Modification and the UE Context Release family, including the release
//! guard timer. Generators (`send_*`) run on requests of the MME application;
//! handlers (`handle_*`) run on PDUs from an eNB.

use std::net::IpAddr;

use tracing::{debug, error, info, warn};

use s1mme_common::{ErrorIndicationPolicy, Tai};
use s1mme_s1ap::ies::{
    Cause, CauseRadioNetwork, EnbUeS1apId, ErabSetupItem, EutranCgi, MmeUeS1apId,
    TransportLayerAddress, UeS1apIds, SECURITY_KEY_SIZE,
};
use s1mme_s1ap::procedures::{
    DownlinkNasTransport, ErrorIndication, InitialContextSetupFailure,
    InitialContextSetupRequest, InitialContextSetupResponse, InitialUeMessage,
    NasNonDeliveryIndication, UeCapabilityInfoIndication, UeContextModificationFailure,
    UeContextModificationRequest, UeContextModificationResponse, UeContextReleaseCommand,
    UeContextReleaseComplete, UeContextReleaseRequest, UplinkNasTransport,
};
use s1mme_s1ap::{InitiatingMessageValue, S1apPdu};

use super::directory::DirectoryError;
use super::error::S1apError;
use super::events::{
    ConnectionEstablishmentCnf, DownlinkNasRequest, EstablishIndication, ReleaseCause, S1apEvent,
    UeContextModificationParams,
};
use super::mme::HandlerContext;
use super::ue_context::{UeContext, UeState, INVALID_MME_UE_S1AP_ID};

// ============================================================================
// Helpers
// ============================================================================

/// Resolves a UE by MME UE id and checks that the eNB UE id matches.
pub(crate) fn resolve_ue_pair(
    ctx: &HandlerContext<'_>,
    mme_ue_s1ap_id: MmeUeS1apId,
    enb_ue_s1ap_id: EnbUeS1apId,
) -> Result<(u32, EnbUeS1apId), S1apError> {
    let (assoc_id, known_enb_ue) = ctx
        .dir
        .locate_ue(mme_ue_s1ap_id)
        .ok_or_else(|| S1apError::UnknownUe(format!("mme_ue_s1ap_id={mme_ue_s1ap_id}")))?;
    if known_enb_ue != enb_ue_s1ap_id {
        warn!(
            "UE id mismatch: mme_ue_s1ap_id={} enb_ue_s1ap_id={} (context has {})",
            mme_ue_s1ap_id, enb_ue_s1ap_id, known_enb_ue
        );
        return Err(S1apError::Validation(format!(
            "mme_ue_s1ap_id={mme_ue_s1ap_id} is not paired with enb_ue_s1ap_id={enb_ue_s1ap_id}"
        )));
    }
    Ok((assoc_id, known_enb_ue))
}

/// eNB id of the association, 0 before S1 Setup.
pub(crate) fn enb_id_of(ctx: &HandlerContext<'_>, assoc_id: u32) -> u32 {
    ctx.dir
        .enb(assoc_id)
        .and_then(|enb| enb.enb_id)
        .unwrap_or_default()
}

fn serving_cell(eutran_cgi: &EutranCgi, enb_id: u32) -> s1mme_common::Ecgi {
    eutran_cgi.ecgi().with_enb_id(enb_id)
}

pub(crate) fn ue_or_unknown<'d>(
    ctx: &'d HandlerContext<'_>,
    assoc_id: u32,
    enb_ue_s1ap_id: EnbUeS1apId,
) -> Result<&'d UeContext, S1apError> {
    ctx.dir
        .ue(assoc_id, enb_ue_s1ap_id)
        .ok_or_else(|| S1apError::UnknownUe(format!("assoc={assoc_id} enb_ue_s1ap_id={enb_ue_s1ap_id}")))
}

/// Moves a UE to `Connected` as a side effect of an MME-initiated message.
///
/// A UE being released is refused; a handover in progress is left alone
/// until Notify, Cancel or Failure.
pub(crate) fn mark_connected(ue: &mut UeContext) -> Result<(), S1apError> {
    match ue.state {
        UeState::WaitingContextReleaseComplete => Err(S1apError::InvalidState(format!(
            "enb_ue_s1ap_id={} is being released",
            ue.enb_ue_s1ap_id
        ))),
        UeState::HandoverInProgress => Ok(()),
        UeState::WaitingInitialContextResponse | UeState::Connected => {
            ue.state = UeState::Connected;
            Ok(())
        }
    }
}

// ============================================================================
// Initial UE Message / MME UE id
// ============================================================================

/// Initial UE Message: creates the UE context and reports the establishment
/// upstream.
pub fn handle_initial_ue_message(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    stream: u16,
    msg: InitialUeMessage,
) -> Result<(), S1apError> {
    if let (Some(max), Some(latency)) = (ctx.config.s1ap.max_latency_us, ctx.last_latency_us) {
        if latency > max {
            warn!(
                "Dropping Initial UE Message on assoc={}: latency {}us above {}us",
                assoc_id, latency, max
            );
            return Ok(());
        }
    }

    let release_timer_ms = ctx.config.s1ap.release_timer_ms;
    let enb = ctx
        .dir
        .enb_mut(assoc_id)
        .ok_or(S1apError::UnknownAssociation(assoc_id))?;
    if !enb.is_ready() {
        warn!(
            "Initial UE Message on assoc={} while eNB is {}",
            assoc_id, enb.state
        );
        return Err(S1apError::InvalidState(format!(
            "initial UE message on assoc {assoc_id} in state {}",
            enb.state
        )));
    }
    let enb_ue_s1ap_id = msg.enb_ue_s1ap_id;
    if enb.ues.contains_key(&enb_ue_s1ap_id) {
        warn!(
            "Duplicate Initial UE Message: assoc={} enb_ue_s1ap_id={}",
            assoc_id, enb_ue_s1ap_id
        );
        return Err(DirectoryError::DuplicateUe {
            assoc_id,
            enb_ue_s1ap_id,
        }
        .into());
    }
    let enb_id = enb.enb_id.unwrap_or_default();
    let send_stream = enb.next_stream();

    ctx.dir.insert_ue(UeContext::new(
        assoc_id,
        enb_ue_s1ap_id,
        stream,
        send_stream,
        release_timer_ms,
    ))?;

    let tai = msg.tai.tai();
    let ecgi = serving_cell(&msg.eutran_cgi, enb_id);
    info!(
        "New UE: assoc={} enb_id={:#x} enb_ue_s1ap_id={} tai={} streams={}/{}",
        assoc_id, enb_id, enb_ue_s1ap_id, tai, stream, send_stream
    );
    ctx.notify(
        None,
        S1apEvent::EstablishIndication(EstablishIndication {
            assoc_id,
            enb_id,
            enb_ue_s1ap_id,
            nas_pdu: msg.nas_pdu,
            tai,
            ecgi,
            rrc_establishment_cause: msg.rrc_establishment_cause,
            s_tmsi: msg.s_tmsi,
            csg_id: msg.csg_id,
            gummei: msg.gummei.map(|g| g.gummei()),
        }),
    );
    Ok(())
}

/// Binds the MME UE id allocated by the application to a pending UE.
pub fn handle_mme_ue_id_notification(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    enb_ue_s1ap_id: EnbUeS1apId,
    mme_ue_s1ap_id: MmeUeS1apId,
) -> Result<(), S1apError> {
    if !ctx.dir.bind_mme_id(assoc_id, enb_ue_s1ap_id, mme_ue_s1ap_id) {
        warn!(
            "MME UE id {} for unknown UE assoc={} enb_ue_s1ap_id={}",
            mme_ue_s1ap_id, assoc_id, enb_ue_s1ap_id
        );
        return Err(S1apError::UnknownUe(format!(
            "assoc={assoc_id} enb_ue_s1ap_id={enb_ue_s1ap_id}"
        )));
    }
    debug!(
        "Bound mme_ue_s1ap_id={} to assoc={} enb_ue_s1ap_id={}",
        mme_ue_s1ap_id, assoc_id, enb_ue_s1ap_id
    );
    Ok(())
}

// ============================================================================
// NAS transport
// ============================================================================

/// Uplink NAS Transport
pub fn handle_uplink_nas_transport(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    stream: u16,
    msg: UplinkNasTransport,
) -> Result<(), S1apError> {
    if ctx.dir.enb(assoc_id).is_none() {
        return Err(S1apError::UnknownAssociation(assoc_id));
    }
    let enb_id = enb_id_of(ctx, assoc_id);

    // A present MME id is authoritative; the eNB id is only consulted
    // when the eNB did not know the MME id.
    let located = if msg.mme_ue_s1ap_id != INVALID_MME_UE_S1AP_ID {
        ctx.dir.locate_ue(msg.mme_ue_s1ap_id)
    } else {
        ctx.dir
            .ue(assoc_id, msg.enb_ue_s1ap_id)
            .map(|ue| (assoc_id, ue.enb_ue_s1ap_id))
    };

    let Some((ue_assoc, ue_enb_ue)) = located else {
        warn!(
            "Uplink NAS for unknown UE: assoc={} mme_ue_s1ap_id={} enb_ue_s1ap_id={}",
            assoc_id, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id
        );
        let command = UeContextReleaseCommand {
            ue_s1ap_ids: UeS1apIds::Pair {
                mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
                enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
            },
            cause: Cause::RadioNetwork(CauseRadioNetwork::UnknownMmeUeS1apId),
        };
        ctx.send_pdu(
            assoc_id,
            stream,
            S1apPdu::from(InitiatingMessageValue::UeContextReleaseCommand(command)),
            None,
        )?;
        ctx.notify(
            None,
            S1apEvent::RemoveStaleUeContext {
                enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
                enb_id,
            },
        );
        return Err(S1apError::UnknownUe(format!(
            "mme_ue_s1ap_id={}",
            msg.mme_ue_s1ap_id
        )));
    };

    let ue = ue_or_unknown(ctx, ue_assoc, ue_enb_ue)?;
    if ue.state != UeState::Connected {
        warn!(
            "Uplink NAS for mme_ue_s1ap_id={} in state {}, dropping",
            ue.mme_id_or_invalid(),
            ue.state
        );
        return Err(S1apError::InvalidState(format!(
            "uplink NAS in state {}",
            ue.state
        )));
    }
    let mme_ue_s1ap_id = ue.mme_id_or_invalid();
    let tai: Tai = msg.tai.tai();
    let ecgi = serving_cell(&msg.eutran_cgi, enb_id);
    debug!(
        "Uplink NAS: mme_ue_s1ap_id={} enb_ue_s1ap_id={} len={}",
        mme_ue_s1ap_id,
        ue_enb_ue,
        msg.nas_pdu.len()
    );
    ctx.notify(
        Some(mme_ue_s1ap_id),
        S1apEvent::UplinkNas {
            mme_ue_s1ap_id,
            nas_pdu: msg.nas_pdu,
            tai,
            ecgi,
        },
    );
    Ok(())
}

/// Downlink NAS Transport (generator)
pub fn send_downlink_nas_transport(
    ctx: &mut HandlerContext<'_>,
    req: DownlinkNasRequest,
) -> Result<(), S1apError> {
    let located = ctx.dir.locate_ue(req.mme_ue_s1ap_id).or_else(|| {
        ctx.dir
            .ue(req.assoc_id, req.enb_ue_s1ap_id)
            .map(|ue| (req.assoc_id, ue.enb_ue_s1ap_id))
    });
    let Some((assoc_id, enb_ue_s1ap_id)) = located else {
        warn!(
            "Downlink NAS for unknown UE: mme_ue_s1ap_id={} assoc={} enb_ue_s1ap_id={}",
            req.mme_ue_s1ap_id, req.assoc_id, req.enb_ue_s1ap_id
        );
        return Err(S1apError::UnknownUe(format!(
            "mme_ue_s1ap_id={}",
            req.mme_ue_s1ap_id
        )));
    };

    if let Some(imsi) = req.imsi {
        ctx.dir.set_imsi(req.mme_ue_s1ap_id, imsi);
    }

    let ue = ctx
        .dir
        .ue_mut(assoc_id, enb_ue_s1ap_id)
        .ok_or_else(|| S1apError::UnknownUe(format!("mme_ue_s1ap_id={}", req.mme_ue_s1ap_id)))?;
    if mark_connected(ue).is_err() {
        error!(
            "Downlink NAS for mme_ue_s1ap_id={} while waiting for release complete, dropping",
            req.mme_ue_s1ap_id
        );
        return Err(S1apError::InvalidState(
            "downlink NAS during context release".into(),
        ));
    }
    let stream = ue.sctp_stream_send;
    let enb_ue_s1ap_id = ue.enb_ue_s1ap_id;

    let pdu = S1apPdu::from(InitiatingMessageValue::DownlinkNasTransport(
        DownlinkNasTransport {
            mme_ue_s1ap_id: req.mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            nas_pdu: req.nas_pdu,
        },
    ));
    ctx.send_pdu(assoc_id, stream, pdu, Some(req.mme_ue_s1ap_id))
}

/// NAS Non Delivery Indication
pub fn handle_nas_non_delivery_indication(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    stream: u16,
    msg: NasNonDeliveryIndication,
) -> Result<(), S1apError> {
    if stream == 0 {
        warn!(
            "NAS Non Delivery Indication on stream 0 of assoc={}, dropping",
            assoc_id
        );
        return Err(S1apError::Validation(
            "UE-associated message on stream 0".into(),
        ));
    }
    if ctx.dir.locate_ue(msg.mme_ue_s1ap_id).is_none() {
        warn!(
            "NAS Non Delivery Indication for unknown mme_ue_s1ap_id={}",
            msg.mme_ue_s1ap_id
        );
        return Err(S1apError::UnknownUe(format!(
            "mme_ue_s1ap_id={}",
            msg.mme_ue_s1ap_id
        )));
    }
    info!(
        "NAS not delivered: mme_ue_s1ap_id={} cause={}",
        msg.mme_ue_s1ap_id, msg.cause
    );
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::NasNonDelivery {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            nas_pdu: msg.nas_pdu,
            cause: msg.cause,
        },
    );
    Ok(())
}

/// SCTP delivery report of a UE-associated send.
pub fn handle_data_confirm(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    mme_ue_s1ap_id: MmeUeS1apId,
    delivered: bool,
) {
    if ctx.dir.locate_ue(mme_ue_s1ap_id).is_none() {
        debug!(
            "Data confirm for released mme_ue_s1ap_id={} on assoc={}",
            mme_ue_s1ap_id, assoc_id
        );
        return;
    }
    ctx.notify(
        Some(mme_ue_s1ap_id),
        S1apEvent::NasDlDataConfirm {
            mme_ue_s1ap_id,
            delivered,
        },
    );
}

// ============================================================================
// UE capability
// ============================================================================

/// UE Capability Info Indication
pub fn handle_ue_capability_info_indication(
    ctx: &mut HandlerContext<'_>,
    _assoc_id: u32,
    stream: u16,
    msg: UeCapabilityInfoIndication,
) -> Result<(), S1apError> {
    let (assoc_id, enb_ue_s1ap_id) =
        resolve_ue_pair(ctx, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
    let ue = ue_or_unknown(ctx, assoc_id, enb_ue_s1ap_id)?;
    if ue.sctp_stream_recv != stream {
        warn!(
            "UE capability for mme_ue_s1ap_id={} on stream {} (expected {})",
            msg.mme_ue_s1ap_id, stream, ue.sctp_stream_recv
        );
    }
    debug!(
        "UE radio capability: mme_ue_s1ap_id={} len={}",
        msg.mme_ue_s1ap_id,
        msg.ue_radio_capability.len()
    );
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::UeCapabilityIndication {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            ue_radio_capability: msg.ue_radio_capability,
        },
    );
    Ok(())
}

// ============================================================================
// Initial Context Setup
// ============================================================================

/// Initial Context Setup Request (generator)
pub fn send_initial_context_setup_request(
    ctx: &mut HandlerContext<'_>,
    cnf: ConnectionEstablishmentCnf,
) -> Result<(), S1apError> {
    let Some((assoc_id, enb_ue_s1ap_id)) = ctx.dir.locate_ue(cnf.mme_ue_s1ap_id) else {
        warn!(
            "Connection establishment for unknown mme_ue_s1ap_id={}",
            cnf.mme_ue_s1ap_id
        );
        return Err(S1apError::UnknownUe(format!(
            "mme_ue_s1ap_id={}",
            cnf.mme_ue_s1ap_id
        )));
    };
    if cnf.security_key.len() != SECURITY_KEY_SIZE {
        return Err(S1apError::Validation(format!(
            "security key of {} octets",
            cnf.security_key.len()
        )));
    }
    let stream = ue_or_unknown(ctx, assoc_id, enb_ue_s1ap_id)?.sctp_stream_send;

    debug!(
        "Initial Context Setup: mme_ue_s1ap_id={} e_rabs={}",
        cnf.mme_ue_s1ap_id,
        cnf.e_rabs.len()
    );
    let pdu = S1apPdu::from(InitiatingMessageValue::InitialContextSetupRequest(
        InitialContextSetupRequest {
            mme_ue_s1ap_id: cnf.mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            ue_aggregate_maximum_bitrate: cnf.ue_aggregate_maximum_bitrate,
            e_rab_to_be_setup_list: cnf.e_rabs,
            ue_security_capabilities: cnf.ue_security_capabilities,
            security_key: cnf.security_key,
            ue_radio_capability: cnf.ue_radio_capability,
            cs_fallback_indicator: cnf.cs_fallback_indicator,
        },
    ));
    ctx.send_pdu(assoc_id, stream, pdu, Some(cnf.mme_ue_s1ap_id))
}

/// Replaces a private IPv4 S1-U address with the address the association
/// was observed on.
fn correct_private_address(item: &mut ErabSetupItem, peer: IpAddr) {
    match item.transport_layer_address.ip_addr() {
        Ok(IpAddr::V4(addr)) if addr.is_private() && IpAddr::V4(addr) != peer => {
            debug!(
                "E-RAB {}: replacing private address {} with {}",
                item.e_rab_id, addr, peer
            );
            item.transport_layer_address = TransportLayerAddress::from(peer);
        }
        _ => {}
    }
}

/// Initial Context Setup Response
pub fn handle_initial_context_setup_response(
    ctx: &mut HandlerContext<'_>,
    _assoc_id: u32,
    _stream: u16,
    msg: InitialContextSetupResponse,
) -> Result<(), S1apError> {
    let (assoc_id, enb_ue_s1ap_id) =
        resolve_ue_pair(ctx, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
    if msg.e_rab_setup_list.is_empty() {
        warn!(
            "Initial Context Setup Response without bearers for mme_ue_s1ap_id={}",
            msg.mme_ue_s1ap_id
        );
        return Err(S1apError::Validation(
            "initial context setup response without set-up bearers".into(),
        ));
    }

    let peer = ctx
        .config
        .s1ap
        .enable_gtpu_private_ip_correction
        .then(|| ctx.dir.enb(assoc_id).and_then(|enb| enb.peer_address))
        .flatten();

    let ue = ctx
        .dir
        .ue_mut(assoc_id, enb_ue_s1ap_id)
        .ok_or_else(|| S1apError::UnknownUe(format!("mme_ue_s1ap_id={}", msg.mme_ue_s1ap_id)))?;
    if !ue.transition(UeState::Connected) {
        warn!(
            "Initial Context Setup Response for mme_ue_s1ap_id={} in state {}",
            msg.mme_ue_s1ap_id, ue.state
        );
        return Err(S1apError::InvalidState(format!(
            "initial context setup response in state {}",
            ue.state
        )));
    }

    let mut e_rab_setup_list = msg.e_rab_setup_list;
    if let Some(peer) = peer {
        for item in &mut e_rab_setup_list {
            correct_private_address(item, peer);
        }
    }
    info!(
        "UE mme_ue_s1ap_id={} connected with {} bearer(s)",
        msg.mme_ue_s1ap_id,
        e_rab_setup_list.len()
    );
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::InitialContextSetupResponse {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            e_rab_setup_list,
            e_rab_failed_list: msg.e_rab_failed_to_setup_list.unwrap_or_default(),
        },
    );
    Ok(())
}

/// Initial Context Setup Failure
pub fn handle_initial_context_setup_failure(
    ctx: &mut HandlerContext<'_>,
    _assoc_id: u32,
    _stream: u16,
    msg: InitialContextSetupFailure,
) -> Result<(), S1apError> {
    resolve_ue_pair(ctx, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
    warn!(
        "Initial Context Setup failed: mme_ue_s1ap_id={} cause={}",
        msg.mme_ue_s1ap_id, msg.cause
    );
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::InitialContextSetupFailure {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            cause: msg.cause,
        },
    );
    Ok(())
}

// ============================================================================
// UE Context Modification
// ============================================================================

/// UE Context Modification Request (generator)
pub fn send_ue_context_modification_request(
    ctx: &mut HandlerContext<'_>,
    params: UeContextModificationParams,
) -> Result<(), S1apError> {
    let (assoc_id, enb_ue_s1ap_id) =
        resolve_ue_pair(ctx, params.mme_ue_s1ap_id, params.enb_ue_s1ap_id)?;
    let stream = ue_or_unknown(ctx, assoc_id, enb_ue_s1ap_id)?.sctp_stream_send;
    let pdu = S1apPdu::from(InitiatingMessageValue::UeContextModificationRequest(
        UeContextModificationRequest {
            mme_ue_s1ap_id: params.mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            ue_aggregate_maximum_bitrate: params.ue_aggregate_maximum_bitrate,
            cs_fallback_indicator: params.cs_fallback_indicator,
            registered_lai: params.registered_lai,
        },
    ));
    ctx.send_pdu(assoc_id, stream, pdu, Some(params.mme_ue_s1ap_id))
}

/// UE Context Modification Response
pub fn handle_ue_context_modification_response(
    ctx: &mut HandlerContext<'_>,
    _assoc_id: u32,
    _stream: u16,
    msg: UeContextModificationResponse,
) -> Result<(), S1apError> {
    resolve_ue_pair(ctx, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::UeContextModificationResponse {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
        },
    );
    Ok(())
}

/// UE Context Modification Failure
pub fn handle_ue_context_modification_failure(
    ctx: &mut HandlerContext<'_>,
    _assoc_id: u32,
    _stream: u16,
    msg: UeContextModificationFailure,
) -> Result<(), S1apError> {
    resolve_ue_pair(ctx, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)?;
    warn!(
        "UE Context Modification failed: mme_ue_s1ap_id={} cause={}",
        msg.mme_ue_s1ap_id, msg.cause
    );
    ctx.notify(
        Some(msg.mme_ue_s1ap_id),
        S1apEvent::UeContextModificationFailure {
            mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
            enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
            cause: msg.cause,
        },
    );
    Ok(())
}

// ============================================================================
// UE Context Release
// ============================================================================

/// Sends the UE Context Release Command for a UE, or removes the context
/// outright for causes the eNB already knows about.
pub(crate) fn send_release_command(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    enb_ue_s1ap_id: EnbUeS1apId,
    cause: ReleaseCause,
) -> Result<(), S1apError> {
    let Some(ue) = ctx.dir.ue(assoc_id, enb_ue_s1ap_id) else {
        debug!(
            "Release of unknown UE assoc={} enb_ue_s1ap_id={}",
            assoc_id, enb_ue_s1ap_id
        );
        return Ok(());
    };
    if cause.is_direct_removal() {
        info!(
            "Removing UE mme_ue_s1ap_id={:?} without signalling ({})",
            ue.mme_ue_s1ap_id, cause
        );
        ctx.remove_ue(assoc_id, enb_ue_s1ap_id);
        return Ok(());
    }
    let wire_cause = cause.wire_cause().ok_or(S1apError::UnsupportedCause(cause))?;
    let mme_ue_s1ap_id = ue.mme_id_or_invalid();
    let stream = ue.sctp_stream_send;

    let pdu = S1apPdu::from(InitiatingMessageValue::UeContextReleaseCommand(
        UeContextReleaseCommand {
            ue_s1ap_ids: UeS1apIds::Pair {
                mme_ue_s1ap_id,
                enb_ue_s1ap_id,
            },
            cause: wire_cause,
        },
    ));
    ctx.send_pdu(assoc_id, stream, pdu, ue_mme_id(mme_ue_s1ap_id))?;

    if let Some(ue) = ctx.dir.ue_mut(assoc_id, enb_ue_s1ap_id) {
        ue.transition(UeState::WaitingContextReleaseComplete);
    }
    ctx.arm_release_timer(assoc_id, enb_ue_s1ap_id);
    info!(
        "UE Context Release Command: mme_ue_s1ap_id={} cause={}",
        mme_ue_s1ap_id, wire_cause
    );
    Ok(())
}

fn ue_mme_id(id: MmeUeS1apId) -> Option<MmeUeS1apId> {
    (id != INVALID_MME_UE_S1AP_ID).then_some(id)
}

/// Release of a UE requested by the MME application.
pub fn handle_release_command_request(
    ctx: &mut HandlerContext<'_>,
    mme_ue_s1ap_id: MmeUeS1apId,
    enb_ue_s1ap_id: EnbUeS1apId,
    cause: ReleaseCause,
) -> Result<(), S1apError> {
    let Some((assoc_id, known_enb_ue)) = ctx.dir.locate_ue(mme_ue_s1ap_id) else {
        debug!(
            "Release request for unknown mme_ue_s1ap_id={}, nothing to do",
            mme_ue_s1ap_id
        );
        return Ok(());
    };
    if known_enb_ue != enb_ue_s1ap_id {
        debug!(
            "Release request for mme_ue_s1ap_id={}: enb_ue_s1ap_id {} superseded by {}",
            mme_ue_s1ap_id, enb_ue_s1ap_id, known_enb_ue
        );
    }
    send_release_command(ctx, assoc_id, known_enb_ue, cause)
}

/// UE Context Release Request
pub fn handle_ue_context_release_request(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    _stream: u16,
    msg: UeContextReleaseRequest,
) -> Result<(), S1apError> {
    if ctx.dir.enb(assoc_id).is_none() {
        return Err(S1apError::UnknownAssociation(assoc_id));
    }
    let enb_id = enb_id_of(ctx, assoc_id);
    let Some((ue_assoc, ue_enb_ue)) = ctx.dir.locate_ue(msg.mme_ue_s1ap_id) else {
        debug!(
            "Release request for unknown mme_ue_s1ap_id={}, dropping",
            msg.mme_ue_s1ap_id
        );
        return Ok(());
    };
    let cause = ReleaseCause::from_release_request(&msg.cause);

    if ue_assoc == assoc_id && ue_enb_ue == msg.enb_ue_s1ap_id {
        info!(
            "Release request: mme_ue_s1ap_id={} enb_ue_s1ap_id={} cause={}",
            msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id, msg.cause
        );
        ctx.notify(
            Some(msg.mme_ue_s1ap_id),
            S1apEvent::UeContextReleaseRequest {
                mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
                enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
                enb_id,
                cause,
            },
        );
        return send_release_command(ctx, assoc_id, msg.enb_ue_s1ap_id, cause);
    }

    let ue = ue_or_unknown(ctx, ue_assoc, ue_enb_ue)?;
    let source_stream = ue
        .handover
        .as_ref()
        .filter(|_| ue.matches_handover_source(enb_id, msg.enb_ue_s1ap_id))
        .map(|ho| ho.source_sctp_stream_send);
    let Some(stream) = source_stream else {
        warn!(
            "Release request with abnormal id pair: mme_ue_s1ap_id={} enb_ue_s1ap_id={} assoc={}",
            msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id, assoc_id
        );
        return Err(S1apError::Validation(format!(
            "mme_ue_s1ap_id={} not owned by assoc {assoc_id}",
            msg.mme_ue_s1ap_id
        )));
    };
    let wire_cause = cause.wire_cause().ok_or(S1apError::UnsupportedCause(cause))?;

    info!(
        "Releasing handover source of mme_ue_s1ap_id={} on assoc={}",
        msg.mme_ue_s1ap_id, assoc_id
    );
    let pdu = S1apPdu::from(InitiatingMessageValue::UeContextReleaseCommand(
        UeContextReleaseCommand {
            ue_s1ap_ids: UeS1apIds::Pair {
                mme_ue_s1ap_id: msg.mme_ue_s1ap_id,
                enb_ue_s1ap_id: msg.enb_ue_s1ap_id,
            },
            cause: wire_cause,
        },
    ));
    ctx.send_pdu(assoc_id, stream, pdu, Some(msg.mme_ue_s1ap_id))
}

/// UE Context Release Complete
pub fn handle_ue_context_release_complete(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    _stream: u16,
    msg: UeContextReleaseComplete,
) -> Result<(), S1apError> {
    let Some((ue_assoc, enb_ue_s1ap_id)) = ctx.dir.locate_ue(msg.mme_ue_s1ap_id) else {
        debug!(
            "Release Complete for mme_ue_s1ap_id={}: context already cleared",
            msg.mme_ue_s1ap_id
        );
        return Ok(());
    };
    if ue_assoc != assoc_id {
        debug!(
            "Release Complete for mme_ue_s1ap_id={} from assoc={}, UE now on assoc={}",
            msg.mme_ue_s1ap_id, assoc_id, ue_assoc
        );
        return Ok(());
    }
    let ue = ue_or_unknown(ctx, ue_assoc, enb_ue_s1ap_id)?;
    if ue.state != UeState::WaitingContextReleaseComplete {
        error!(
            "Release Complete for mme_ue_s1ap_id={} in state {}",
            msg.mme_ue_s1ap_id, ue.state
        );
        return Err(S1apError::InvalidState(format!(
            "release complete in state {}",
            ue.state
        )));
    }
    info!(
        "UE Context Release Complete: mme_ue_s1ap_id={} enb_ue_s1ap_id={}",
        msg.mme_ue_s1ap_id, enb_ue_s1ap_id
    );
    ctx.complete_ue_release(assoc_id, enb_ue_s1ap_id);
    Ok(())
}

/// Expiry of the release guard timer: same clean-up as Release Complete.
pub fn handle_release_timer_expiry(
    ctx: &mut HandlerContext<'_>,
    timer_id: u64,
    mme_ue_s1ap_id: MmeUeS1apId,
) -> Result<(), S1apError> {
    let Some((assoc_id, enb_ue_s1ap_id)) = ctx.dir.locate_ue(mme_ue_s1ap_id) else {
        debug!(
            "Release timer {} for cleared mme_ue_s1ap_id={}",
            timer_id, mme_ue_s1ap_id
        );
        return Ok(());
    };
    let Some(ue) = ctx.dir.ue_mut(assoc_id, enb_ue_s1ap_id) else {
        return Ok(());
    };
    if ue.release_timer.id != Some(timer_id) {
        debug!(
            "Stale release timer {} for mme_ue_s1ap_id={} (armed: {:?})",
            timer_id, mme_ue_s1ap_id, ue.release_timer.id
        );
        return Ok(());
    }
    // already fired, nothing to stop
    ue.release_timer.id = None;
    warn!(
        "Release timer expired for mme_ue_s1ap_id={} in state {}",
        mme_ue_s1ap_id, ue.state
    );
    ctx.complete_ue_release(assoc_id, enb_ue_s1ap_id);
    Ok(())
}

// ============================================================================
// Error Indication
// ============================================================================

/// Error Indication
pub fn handle_error_indication(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    _stream: u16,
    msg: ErrorIndication,
) -> Result<(), S1apError> {
    warn!(
        "Error Indication on assoc={}: mme_ue_s1ap_id={:?} enb_ue_s1ap_id={:?} cause={}",
        assoc_id,
        msg.mme_ue_s1ap_id,
        msg.enb_ue_s1ap_id,
        msg.cause
            .map_or_else(|| "none".to_string(), |cause| cause.to_string())
    );
    if ctx.config.s1ap.error_indication_policy == ErrorIndicationPolicy::LogOnly {
        return Ok(());
    }
    let (Some(Cause::RadioNetwork(_)), Some(mme_ue_s1ap_id), Some(enb_ue_s1ap_id)) =
        (msg.cause, msg.mme_ue_s1ap_id, msg.enb_ue_s1ap_id)
    else {
        return Ok(());
    };
    if ctx.dir.locate_ue(mme_ue_s1ap_id) != Some((assoc_id, enb_ue_s1ap_id)) {
        debug!(
            "Error Indication for mme_ue_s1ap_id={} does not match a UE on assoc={}",
            mme_ue_s1ap_id, assoc_id
        );
        return Ok(());
    }

    let cause = ReleaseCause::RadioEutranGeneratedReason;
    let enb_id = enb_id_of(ctx, assoc_id);
    ctx.notify(
        Some(mme_ue_s1ap_id),
        S1apEvent::UeContextReleaseRequest {
            mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            enb_id,
            cause,
        },
    );
    send_release_command(ctx, assoc_id, enb_ue_s1ap_id, cause)
}
