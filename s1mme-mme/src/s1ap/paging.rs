//! Paging

use tracing::{debug, info, warn};

use s1mme_s1ap::ies::TaiIe;
use s1mme_s1ap::procedures::{Paging, UE_IDENTITY_INDEX_MODULUS};
use s1mme_s1ap::{InitiatingMessageValue, S1apPdu};

use super::error::S1apError;
use super::events::PagingRequest;
use super::mme::HandlerContext;

/// Sends Paging on stream 0 to every READY eNB serving one of the paged
/// tracking areas.
pub fn send_paging(ctx: &mut HandlerContext<'_>, req: PagingRequest) -> Result<(), S1apError> {
    let ue_identity_index_value = (req.imsi.to_imsi64() % UE_IDENTITY_INDEX_MODULUS) as u16;
    let pdu = S1apPdu::from(InitiatingMessageValue::Paging(Paging {
        ue_identity_index_value,
        ue_paging_id: req.paging_identity(),
        paging_drx: req.paging_drx,
        cn_domain: req.cn_domain,
        tai_list: req.tai_list.iter().copied().map(TaiIe::from).collect(),
    }));

    let mut targets: Vec<u32> = ctx
        .dir
        .enbs()
        .filter(|enb| enb.is_ready() && enb.supports_any_tai(&req.tai_list))
        .map(|enb| enb.sctp_assoc_id)
        .collect();
    targets.sort_unstable();

    if targets.is_empty() {
        warn!(
            "No eNB serves the paged tracking areas for IMSI {}",
            req.imsi
        );
        return Ok(());
    }
    for assoc_id in &targets {
        debug!("Paging IMSI {} on assoc={}", req.imsi, assoc_id);
        ctx.send_pdu(*assoc_id, 0, pdu.clone(), None)?;
    }
    info!(
        "Sent paging for IMSI {} to {} eNB(s)",
        req.imsi,
        targets.len()
    );
    Ok(())
}
