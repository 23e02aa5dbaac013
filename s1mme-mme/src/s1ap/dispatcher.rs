//! Procedure dispatcher
//!
//! Incoming PDUs are routed through a fixed table indexed by procedure code
//! and message direction. A slot without a handler is a message the MME
//! never receives (it originates it, or it is eNB-to-eNB only); such PDUs
//! are logged and dropped.
//!
//! Requests of the MME application are routed to their generator by a plain
//! match over [`AppRequest`].

use tracing::warn;

use s1mme_s1ap::pdu::{
    InitiatingMessage, InitiatingMessageValue, MessageDirection, SuccessfulOutcome,
    SuccessfulOutcomeValue, UnsuccessfulOutcome, UnsuccessfulOutcomeValue,
};
use s1mme_s1ap::{S1apPdu, PROCEDURE_CODE_COUNT};

use super::error::S1apError;
use super::events::AppRequest;
use super::mme::HandlerContext;
use super::{enb_procedures, erab, handover, paging, ue_procedures};

/// Handler signature: context, association id, stream id, decoded PDU.
pub type Handler = fn(&mut HandlerContext<'_>, u32, u16, S1apPdu) -> Result<(), S1apError>;

type HandlerTable = [[Option<Handler>; 3]; PROCEDURE_CODE_COUNT];

const INIT: usize = MessageDirection::InitiatingMessage.index();
const SUCC: usize = MessageDirection::SuccessfulOutcome.index();
const UNSUCC: usize = MessageDirection::UnsuccessfulOutcome.index();

fn body_mismatch(pdu: &S1apPdu) -> S1apError {
    S1apError::Dispatch(format!(
        "{} does not belong to procedure code {} ({})",
        pdu.name(),
        pdu.procedure_code(),
        pdu.direction()
    ))
}

// Unwraps the body a table slot expects and hands it to the procedure
// handler. A body that does not match the slot is a dispatch error.
macro_rules! initiating {
    ($name:ident, $variant:ident => $handler:path) => {
        fn $name(
            ctx: &mut HandlerContext<'_>,
            assoc_id: u32,
            stream: u16,
            pdu: S1apPdu,
        ) -> Result<(), S1apError> {
            match pdu {
                S1apPdu::InitiatingMessage(InitiatingMessage {
                    value: InitiatingMessageValue::$variant(msg),
                    ..
                }) => $handler(ctx, assoc_id, stream, msg),
                other => Err(body_mismatch(&other)),
            }
        }
    };
}

macro_rules! successful {
    ($name:ident, $variant:ident => $handler:path) => {
        fn $name(
            ctx: &mut HandlerContext<'_>,
            assoc_id: u32,
            stream: u16,
            pdu: S1apPdu,
        ) -> Result<(), S1apError> {
            match pdu {
                S1apPdu::SuccessfulOutcome(SuccessfulOutcome {
                    value: SuccessfulOutcomeValue::$variant(msg),
                    ..
                }) => $handler(ctx, assoc_id, stream, msg),
                other => Err(body_mismatch(&other)),
            }
        }
    };
}

macro_rules! unsuccessful {
    ($name:ident, $variant:ident => $handler:path) => {
        fn $name(
            ctx: &mut HandlerContext<'_>,
            assoc_id: u32,
            stream: u16,
            pdu: S1apPdu,
        ) -> Result<(), S1apError> {
            match pdu {
                S1apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome {
                    value: UnsuccessfulOutcomeValue::$variant(msg),
                    ..
                }) => $handler(ctx, assoc_id, stream, msg),
                other => Err(body_mismatch(&other)),
            }
        }
    };
}

// ============================================================================
// Table slots
// ============================================================================

initiating!(on_handover_required, HandoverRequired => handover::handle_handover_required);
successful!(on_handover_request_ack, HandoverRequestAcknowledge => handover::handle_handover_request_ack);
unsuccessful!(on_handover_failure, HandoverFailure => handover::handle_handover_failure);
initiating!(on_handover_notify, HandoverNotify => handover::handle_handover_notify);
initiating!(on_path_switch_request, PathSwitchRequest => handover::handle_path_switch_request);
initiating!(on_handover_cancel, HandoverCancel => handover::handle_handover_cancel);
successful!(on_erab_setup_response, ErabSetupResponse => erab::handle_erab_setup_response);
unsuccessful!(on_erab_setup_failure, ErabSetupFailure => erab::handle_erab_setup_failure);
successful!(on_erab_release_response, ErabReleaseResponse => erab::handle_erab_release_response);
successful!(on_ics_response, InitialContextSetupResponse => ue_procedures::handle_initial_context_setup_response);
unsuccessful!(on_ics_failure, InitialContextSetupFailure => ue_procedures::handle_initial_context_setup_failure);
initiating!(on_initial_ue_message, InitialUeMessage => ue_procedures::handle_initial_ue_message);
initiating!(on_uplink_nas_transport, UplinkNasTransport => ue_procedures::handle_uplink_nas_transport);
initiating!(on_reset, Reset => enb_procedures::handle_reset);
initiating!(on_error_indication, ErrorIndication => ue_procedures::handle_error_indication);
initiating!(on_nas_non_delivery, NasNonDeliveryIndication => ue_procedures::handle_nas_non_delivery_indication);
initiating!(on_s1_setup_request, S1SetupRequest => enb_procedures::handle_s1_setup_request);
initiating!(on_ue_context_release_request, UeContextReleaseRequest => ue_procedures::handle_ue_context_release_request);
successful!(on_ue_context_modification_response, UeContextModificationResponse => ue_procedures::handle_ue_context_modification_response);
unsuccessful!(on_ue_context_modification_failure, UeContextModificationFailure => ue_procedures::handle_ue_context_modification_failure);
initiating!(on_ue_capability_info, UeCapabilityInfoIndication => ue_procedures::handle_ue_capability_info_indication);
successful!(on_ue_context_release_complete, UeContextReleaseComplete => ue_procedures::handle_ue_context_release_complete);
initiating!(on_erab_modification_indication, ErabModificationIndication => erab::handle_erab_modification_indication);

const fn build_table() -> HandlerTable {
    let mut table: HandlerTable = [[None; 3]; PROCEDURE_CODE_COUNT];
    table[0][INIT] = Some(on_handover_required as Handler);
    table[1][SUCC] = Some(on_handover_request_ack as Handler);
    table[1][UNSUCC] = Some(on_handover_failure as Handler);
    table[2][INIT] = Some(on_handover_notify as Handler);
    table[3][INIT] = Some(on_path_switch_request as Handler);
    table[4][INIT] = Some(on_handover_cancel as Handler);
    table[5][SUCC] = Some(on_erab_setup_response as Handler);
    table[5][UNSUCC] = Some(on_erab_setup_failure as Handler);
    table[7][SUCC] = Some(on_erab_release_response as Handler);
    table[9][SUCC] = Some(on_ics_response as Handler);
    table[9][UNSUCC] = Some(on_ics_failure as Handler);
    table[12][INIT] = Some(on_initial_ue_message as Handler);
    table[13][INIT] = Some(on_uplink_nas_transport as Handler);
    table[14][INIT] = Some(on_reset as Handler);
    table[15][INIT] = Some(on_error_indication as Handler);
    table[16][INIT] = Some(on_nas_non_delivery as Handler);
    table[17][INIT] = Some(on_s1_setup_request as Handler);
    table[18][INIT] = Some(on_ue_context_release_request as Handler);
    table[21][SUCC] = Some(on_ue_context_modification_response as Handler);
    table[21][UNSUCC] = Some(on_ue_context_modification_failure as Handler);
    table[22][INIT] = Some(on_ue_capability_info as Handler);
    table[23][SUCC] = Some(on_ue_context_release_complete as Handler);
    table[24][INIT] = Some(handover::handle_enb_status_transfer as Handler);
    table[40][INIT] = Some(enb_procedures::handle_enb_configuration_transfer as Handler);
    table[50][INIT] = Some(on_erab_modification_indication as Handler);
    table
}

static HANDLERS: HandlerTable = build_table();

/// Looks up the handler for a procedure code and direction.
pub fn handler_for(procedure_code: u8, direction: MessageDirection) -> Option<Handler> {
    HANDLERS
        .get(usize::from(procedure_code))
        .and_then(|row| row[direction.index()])
}

/// Routes a decoded PDU to its handler.
pub fn dispatch(
    ctx: &mut HandlerContext<'_>,
    assoc_id: u32,
    stream: u16,
    pdu: S1apPdu,
) -> Result<(), S1apError> {
    let procedure_code = pdu.procedure_code();
    let direction = pdu.direction();
    if usize::from(procedure_code) >= PROCEDURE_CODE_COUNT {
        warn!(
            "Procedure code {} out of range, dropping {}: assoc={}",
            procedure_code,
            pdu.name(),
            assoc_id
        );
        return Err(S1apError::Dispatch(format!(
            "procedure code {procedure_code} out of range"
        )));
    }
    let Some(handler) = handler_for(procedure_code, direction) else {
        warn!(
            "No handler for {} ({} {}), dropping: assoc={}",
            pdu.name(),
            procedure_code,
            direction,
            assoc_id
        );
        return Err(S1apError::Dispatch(format!(
            "no handler for procedure code {procedure_code} ({direction})"
        )));
    };
    handler(ctx, assoc_id, stream, pdu)
}

/// Routes a request of the MME application to its generator.
pub fn dispatch_app_request(
    ctx: &mut HandlerContext<'_>,
    request: AppRequest,
) -> Result<(), S1apError> {
    match request {
        AppRequest::MmeUeIdNotification {
            assoc_id,
            enb_ue_s1ap_id,
            mme_ue_s1ap_id,
        } => ue_procedures::handle_mme_ue_id_notification(
            ctx,
            assoc_id,
            enb_ue_s1ap_id,
            mme_ue_s1ap_id,
        ),
        AppRequest::DownlinkNas(req) => ue_procedures::send_downlink_nas_transport(ctx, req),
        AppRequest::ConnectionEstablishmentCnf(cnf) => {
            ue_procedures::send_initial_context_setup_request(ctx, cnf)
        }
        AppRequest::UeContextModification(params) => {
            ue_procedures::send_ue_context_modification_request(ctx, params)
        }
        AppRequest::UeContextReleaseCommand {
            mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            cause,
        } => ue_procedures::handle_release_command_request(
            ctx,
            mme_ue_s1ap_id,
            enb_ue_s1ap_id,
            cause,
        ),
        AppRequest::EnbResetAck(ack) => enb_procedures::send_reset_acknowledge(ctx, ack),
        AppRequest::Paging(req) => paging::send_paging(ctx, req),
        AppRequest::HandoverRequest(req) => handover::send_handover_request(ctx, req),
        AppRequest::HandoverCommand(req) => handover::send_handover_command(ctx, req),
        AppRequest::ErabSetup(params) => erab::send_erab_setup_request(ctx, params),
        AppRequest::ErabRelease(params) => erab::send_erab_release_command(ctx, params),
        AppRequest::ErabModificationConfirm(params) => {
            erab::send_erab_modification_confirm(ctx, params)
        }
        AppRequest::PathSwitchRequestAck(params) => {
            handover::send_path_switch_request_ack(ctx, params)
        }
        AppRequest::PathSwitchRequestFailure {
            mme_ue_s1ap_id,
            enb_ue_s1ap_id,
        } => handover::send_path_switch_request_failure(ctx, mme_ue_s1ap_id, enb_ue_s1ap_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s1ap::mme::test_support::*;
    use s1mme_s1ap::pdu::Criticality;
    use s1mme_s1ap::procedures::{HandoverCancelAcknowledge, S1SetupFailure};
    use s1mme_s1ap::ies::{Cause, CauseMisc, EnbUeS1apId, MmeUeS1apId};

    #[test]
    fn test_table_registrations() {
        use MessageDirection::*;
        assert!(handler_for(17, InitiatingMessage).is_some());
        assert!(handler_for(23, SuccessfulOutcome).is_some());
        assert!(handler_for(5, UnsuccessfulOutcome).is_some());
        // MME-originated procedures have no receive handler
        assert!(handler_for(10, InitiatingMessage).is_none());
        assert!(handler_for(17, SuccessfulOutcome).is_none());
        assert!(handler_for(62, InitiatingMessage).is_none());
        assert!(handler_for(63, InitiatingMessage).is_none());
        assert!(handler_for(u8::MAX, InitiatingMessage).is_none());
    }

    #[test]
    fn test_out_of_range_code_is_dropped() {
        let mut mme = mme();
        mme.handle_new_association(1, 2, 2, None).unwrap();
        let mut pdu = S1apPdu::from(setup_request(7, 1));
        if let S1apPdu::InitiatingMessage(m) = &mut pdu {
            m.procedure_code = 200;
        }
        let bytes = s1mme_s1ap::encode_s1ap_pdu(&pdu).unwrap();
        let err = mme.handle_pdu(1, 0, &bytes).unwrap_err();
        assert!(matches!(err, S1apError::Dispatch(_)));
        assert!(!mme.directory().enb(1).unwrap().is_ready());
        assert!(mme.drain_actions().is_empty());
    }

    #[test]
    fn test_unexpected_direction_is_dropped() {
        let mut mme = mme();
        mme.handle_new_association(1, 2, 2, None).unwrap();
        let pdu = S1apPdu::unsuccessful(UnsuccessfulOutcomeValue::S1SetupFailure(S1SetupFailure {
            cause: Cause::Misc(CauseMisc::Unspecified),
            time_to_wait: None,
        }));
        let bytes = s1mme_s1ap::encode_s1ap_pdu(&pdu).unwrap();
        assert!(matches!(
            mme.handle_pdu(1, 0, &bytes),
            Err(S1apError::Dispatch(_))
        ));
    }

    #[test]
    fn test_body_must_match_code() {
        let mut mme = mme();
        mme.handle_new_association(1, 2, 2, None).unwrap();
        // a Handover Cancel Acknowledge body carried under code 23
        let mut pdu = S1apPdu::successful(SuccessfulOutcomeValue::HandoverCancelAcknowledge(
            HandoverCancelAcknowledge {
                mme_ue_s1ap_id: MmeUeS1apId(1),
                enb_ue_s1ap_id: EnbUeS1apId::new(1),
            },
        ));
        if let S1apPdu::SuccessfulOutcome(m) = &mut pdu {
            m.procedure_code = 23;
            m.criticality = Criticality::Reject;
        }
        let bytes = s1mme_s1ap::encode_s1ap_pdu(&pdu).unwrap();
        assert!(matches!(
            mme.handle_pdu(1, 0, &bytes),
            Err(S1apError::Dispatch(_))
        ));
    }
}
