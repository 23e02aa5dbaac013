//! eNB Context Management
//!
//! Each SCTP association from an eNB has a context that tracks:
//! - The eNB identity learned at S1 Setup
//! - Negotiated stream counts and the outbound stream cursor
//! - Supported tracking areas
//! - The eNB state machine
//! - The UE contexts the eNB currently owns

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use s1mme_common::{Plmn, Tac, Tai};
use s1mme_s1ap::ies::{EnbUeS1apId, MmeUeS1apId, PagingDrx, SupportedTaItem};

use super::events::DeregisteredUe;
use super::ue_context::UeContext;

/// eNB association state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnbState {
    /// Association up, no S1 Setup yet
    #[default]
    Init,
    /// S1 Setup complete, UE contexts accepted
    Ready,
    /// SCTP reset in progress, waiting for UE clean-up
    Resetting,
    /// SCTP shutdown in progress, context removed after UE clean-up
    Shutdown,
}

impl EnbState {
    /// True while the association is being torn down.
    pub fn is_tearing_down(self) -> bool {
        matches!(self, EnbState::Resetting | EnbState::Shutdown)
    }
}

impl fmt::Display for EnbState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnbState::Init => write!(f, "Init"),
            EnbState::Ready => write!(f, "Ready"),
            EnbState::Resetting => write!(f, "Resetting"),
            EnbState::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// Tracking area supported by an eNB, as reported at S1 Setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedTa {
    /// Tracking area code
    pub tac: Tac,
    /// PLMNs broadcast in the tracking area
    pub broadcast_plmns: Vec<Plmn>,
}

impl From<&SupportedTaItem> for SupportedTa {
    fn from(item: &SupportedTaItem) -> Self {
        Self {
            tac: item.tac,
            broadcast_plmns: item.broadcast_plmns.iter().map(|p| p.plmn()).collect(),
        }
    }
}

/// eNB context, keyed by SCTP association id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnbContext {
    /// SCTP association id
    pub sctp_assoc_id: u32,
    /// eNB id (20-bit macro or 28-bit home), known after S1 Setup
    pub enb_id: Option<u32>,
    /// eNB name from the S1 Setup Request
    pub enb_name: Option<String>,
    /// Current state
    pub state: EnbState,
    /// Number of inbound SCTP streams
    pub instreams: u16,
    /// Number of outbound SCTP streams
    pub outstreams: u16,
    /// Next stream handed to a new UE
    pub next_sctp_stream: u16,
    /// Tracking areas reported at S1 Setup
    pub supported_tas: Vec<SupportedTa>,
    /// Default paging DRX
    pub default_paging_drx: PagingDrx,
    /// Control-plane address observed on the association
    pub peer_address: Option<IpAddr>,
    /// UE contexts created on this eNB
    pub nb_ue_associated: u32,
    /// Owned UE contexts, keyed by eNB UE id
    pub ues: HashMap<EnbUeS1apId, UeContext>,
    /// MME UE id to eNB UE id for UEs with a bound MME id
    pub ue_id_coll: HashMap<MmeUeS1apId, EnbUeS1apId>,
}

impl EnbContext {
    /// Creates an eNB context in `Init`
    pub fn new(
        sctp_assoc_id: u32,
        instreams: u16,
        outstreams: u16,
        peer_address: Option<IpAddr>,
    ) -> Self {
        Self {
            sctp_assoc_id,
            enb_id: None,
            enb_name: None,
            state: EnbState::Init,
            instreams,
            outstreams,
            // Stream 0 is for non-UE-associated signaling
            next_sctp_stream: 1,
            supported_tas: Vec::new(),
            default_paging_drx: PagingDrx::default(),
            peer_address,
            nb_ue_associated: 0,
            ues: HashMap::new(),
            ue_id_coll: HashMap::new(),
        }
    }

    /// Re-initializes the context for a re-established association.
    pub fn on_association_up(&mut self, instreams: u16, outstreams: u16, peer_address: Option<IpAddr>) {
        self.instreams = instreams;
        self.outstreams = outstreams;
        self.peer_address = peer_address;
        self.next_sctp_stream = 1;
        self.state = EnbState::Init;
    }

    /// Returns true if the eNB completed S1 Setup
    pub fn is_ready(&self) -> bool {
        self.state == EnbState::Ready
    }

    /// Hands out the next UE-associated stream.
    ///
    /// Streams rotate over `1..instreams`; an association with a single
    /// stream carries everything on stream 0.
    pub fn next_stream(&mut self) -> u16 {
        if self.instreams <= 1 {
            return 0;
        }
        let stream = self.next_sctp_stream;
        self.next_sctp_stream += 1;
        if self.next_sctp_stream >= self.instreams {
            self.next_sctp_stream = 1;
        }
        stream
    }

    /// Looks up a UE by eNB UE id
    pub fn ue(&self, enb_ue_s1ap_id: EnbUeS1apId) -> Option<&UeContext> {
        self.ues.get(&enb_ue_s1ap_id)
    }

    /// Looks up a UE by eNB UE id (mutable)
    pub fn ue_mut(&mut self, enb_ue_s1ap_id: EnbUeS1apId) -> Option<&mut UeContext> {
        self.ues.get_mut(&enb_ue_s1ap_id)
    }

    /// eNB UE id of the UE bound to `mme_ue_s1ap_id` on this eNB
    pub fn enb_ue_id_for(&self, mme_ue_s1ap_id: MmeUeS1apId) -> Option<EnbUeS1apId> {
        self.ue_id_coll.get(&mme_ue_s1ap_id).copied()
    }

    /// Number of UEs with a bound MME UE id
    pub fn bound_ue_count(&self) -> usize {
        self.ue_id_coll.len()
    }

    /// Checks that the UE counter matches the owned-UE index.
    ///
    /// Returns the two diverging values on mismatch.
    pub fn check_ue_count_invariant(&self) -> Result<(), (u32, usize)> {
        let bound = self.ue_id_coll.len();
        if self.nb_ue_associated as usize == bound {
            Ok(())
        } else {
            Err((self.nb_ue_associated, bound))
        }
    }

    /// UE id pairs of every bound UE, in MME UE id order, split into
    /// batches of at most `batch_size`.
    pub fn deregistration_batches(&self, batch_size: usize) -> Vec<Vec<DeregisteredUe>> {
        let mut ues: Vec<DeregisteredUe> = self
            .ue_id_coll
            .iter()
            .map(|(mme, enb)| DeregisteredUe {
                mme_ue_s1ap_id: *mme,
                enb_ue_s1ap_id: *enb,
            })
            .collect();
        ues.sort_by_key(|ue| ue.mme_ue_s1ap_id);
        ues.chunks(batch_size.max(1)).map(<[_]>::to_vec).collect()
    }

    /// True if any of `tais` is in this eNB's supported TA list
    pub fn supports_any_tai(&self, tais: &[Tai]) -> bool {
        tais.iter().any(|tai| {
            self.supported_tas
                .iter()
                .any(|ta| ta.tac == tai.tac && ta.broadcast_plmns.contains(&tai.plmn))
        })
    }
}
