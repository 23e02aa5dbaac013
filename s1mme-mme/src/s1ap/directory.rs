//! Association directory
//!
//! The directory is the only shared state of the S1AP core: every eNB
//! context (owning its UE contexts) keyed by SCTP association id, plus the
//! secondary indexes handlers use to resolve a UE or an eNB without
//! scanning.
//!
//! # Architecture
//!
//! ```text
//!  StateCache ──checkout()──▶ DirectoryGuard ──Deref──▶ Directory
//!       ▲                          │                       ├── enbs:          assoc  → EnbContext ── ues
//!       └──────── drop (check-in) ─┘                       ├── mme_ue_index:  mme id → assoc
//!                 + optional snapshot                      ├── enb_id_index:  eNB id → assoc
//!                                                          └── imsi_map:      mme id → IMSI
//! ```
//!
//! A handler checks the directory out, mutates it and checks it back in
//! when the guard goes out of scope, on every exit path. Holding two guards
//! at once is rejected by the borrow checker.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use s1mme_common::Imsi;
use s1mme_s1ap::ies::{EnbUeS1apId, MmeUeS1apId};

use super::enb_context::{EnbContext, EnbState};
use super::ue_context::UeContext;

/// Directory errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No eNB on the association
    #[error("Unknown SCTP association: {0}")]
    UnknownAssociation(u32),

    /// A UE context already exists for the (association, eNB UE id) pair
    #[error("Duplicate UE context: assoc={assoc_id} enb_ue_s1ap_id={enb_ue_s1ap_id}")]
    DuplicateUe {
        /// Association
        assoc_id: u32,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
    },

    /// Snapshot could not be serialized or restored
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

// ============================================================================
// Directory
// ============================================================================

/// eNB and UE contexts with their lookup indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    enbs: HashMap<u32, EnbContext>,
    mme_ue_index: HashMap<MmeUeS1apId, u32>,
    enb_id_index: HashMap<u32, u32>,
    imsi_map: HashMap<MmeUeS1apId, Imsi>,
    next_timer_id: u64,
}

impl Directory {
    /// Creates an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of eNB contexts
    pub fn enb_count(&self) -> usize {
        self.enbs.len()
    }

    /// Number of eNBs in `Ready`
    pub fn connected_enbs(&self) -> usize {
        self.enbs.values().filter(|enb| enb.is_ready()).count()
    }

    /// Total number of UE contexts
    pub fn ue_count(&self) -> usize {
        self.enbs.values().map(|enb| enb.ues.len()).sum()
    }

    /// All eNB contexts
    pub fn enbs(&self) -> impl Iterator<Item = &EnbContext> {
        self.enbs.values()
    }

    /// Looks up an eNB by association id
    pub fn enb(&self, assoc_id: u32) -> Option<&EnbContext> {
        self.enbs.get(&assoc_id)
    }

    /// Looks up an eNB by association id (mutable)
    pub fn enb_mut(&mut self, assoc_id: u32) -> Option<&mut EnbContext> {
        self.enbs.get_mut(&assoc_id)
    }

    /// Adds an eNB context, replacing any context on the same association.
    pub fn insert_enb(&mut self, enb: EnbContext) {
        debug!("Adding eNB context: assoc={}", enb.sctp_assoc_id);
        if let Some(enb_id) = enb.enb_id {
            self.enb_id_index.insert(enb_id, enb.sctp_assoc_id);
        }
        self.enbs.insert(enb.sctp_assoc_id, enb);
    }

    /// Removes an eNB context together with the index entries of its UEs.
    pub fn remove_enb(&mut self, assoc_id: u32) -> Option<EnbContext> {
        let enb = self.enbs.remove(&assoc_id)?;
        if let Some(enb_id) = enb.enb_id {
            if self.enb_id_index.get(&enb_id) == Some(&assoc_id) {
                self.enb_id_index.remove(&enb_id);
            }
        }
        for mme_ue_s1ap_id in enb.ue_id_coll.keys() {
            if self.mme_ue_index.get(mme_ue_s1ap_id) == Some(&assoc_id) {
                self.mme_ue_index.remove(mme_ue_s1ap_id);
                self.imsi_map.remove(mme_ue_s1ap_id);
            }
        }
        debug!(
            "Removed eNB context: assoc={} enb_id={:?} ues={}",
            assoc_id,
            enb.enb_id,
            enb.ues.len()
        );
        Some(enb)
    }

    /// Association of the eNB with numeric id `enb_id`
    pub fn assoc_for_enb_id(&self, enb_id: u32) -> Option<u32> {
        self.enb_id_index.get(&enb_id).copied()
    }

    /// Looks up an eNB by numeric eNB id
    pub fn enb_by_enb_id(&self, enb_id: u32) -> Option<&EnbContext> {
        self.assoc_for_enb_id(enb_id)
            .and_then(|assoc_id| self.enbs.get(&assoc_id))
    }

    /// Records the eNB id learned at S1 Setup and indexes it.
    pub fn set_enb_id(&mut self, assoc_id: u32, enb_id: u32) -> Result<(), DirectoryError> {
        let enb = self
            .enbs
            .get_mut(&assoc_id)
            .ok_or(DirectoryError::UnknownAssociation(assoc_id))?;
        if let Some(old) = enb.enb_id.replace(enb_id) {
            if old != enb_id && self.enb_id_index.get(&old) == Some(&assoc_id) {
                self.enb_id_index.remove(&old);
            }
        }
        self.enb_id_index.insert(enb_id, assoc_id);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // UE contexts
    // ------------------------------------------------------------------------

    /// Looks up a UE by (association, eNB UE id)
    pub fn ue(&self, assoc_id: u32, enb_ue_s1ap_id: EnbUeS1apId) -> Option<&UeContext> {
        self.enbs.get(&assoc_id)?.ue(enb_ue_s1ap_id)
    }

    /// Looks up a UE by (association, eNB UE id) (mutable)
    pub fn ue_mut(&mut self, assoc_id: u32, enb_ue_s1ap_id: EnbUeS1apId) -> Option<&mut UeContext> {
        self.enbs.get_mut(&assoc_id)?.ue_mut(enb_ue_s1ap_id)
    }

    /// Resolves an MME UE id to (association, eNB UE id).
    pub fn locate_ue(&self, mme_ue_s1ap_id: MmeUeS1apId) -> Option<(u32, EnbUeS1apId)> {
        let assoc_id = *self.mme_ue_index.get(&mme_ue_s1ap_id)?;
        let enb_ue_s1ap_id = self.enbs.get(&assoc_id)?.enb_ue_id_for(mme_ue_s1ap_id)?;
        Some((assoc_id, enb_ue_s1ap_id))
    }

    /// Looks up a UE by MME UE id
    pub fn ue_by_mme_id(&self, mme_ue_s1ap_id: MmeUeS1apId) -> Option<&UeContext> {
        let (assoc_id, enb_ue_s1ap_id) = self.locate_ue(mme_ue_s1ap_id)?;
        self.ue(assoc_id, enb_ue_s1ap_id)
    }

    /// Adds a UE context to the eNB on its association.
    ///
    /// The context counts towards `nb_ue_associated` immediately; it joins the
    /// MME UE id indexes only if it already carries an MME UE id.
    pub fn insert_ue(&mut self, ue: UeContext) -> Result<(), DirectoryError> {
        let assoc_id = ue.sctp_assoc_id;
        let enb = self
            .enbs
            .get_mut(&assoc_id)
            .ok_or(DirectoryError::UnknownAssociation(assoc_id))?;
        if enb.ues.contains_key(&ue.enb_ue_s1ap_id) {
            return Err(DirectoryError::DuplicateUe {
                assoc_id,
                enb_ue_s1ap_id: ue.enb_ue_s1ap_id,
            });
        }
        if let Some(mme_ue_s1ap_id) = ue.mme_ue_s1ap_id {
            enb.ue_id_coll.insert(mme_ue_s1ap_id, ue.enb_ue_s1ap_id);
            self.mme_ue_index.insert(mme_ue_s1ap_id, assoc_id);
        }
        enb.nb_ue_associated += 1;
        trace!(
            "UE context added: assoc={} enb_ue_s1ap_id={} nb_ue_associated={}",
            assoc_id,
            ue.enb_ue_s1ap_id,
            enb.nb_ue_associated
        );
        enb.ues.insert(ue.enb_ue_s1ap_id, ue);
        Ok(())
    }

    /// Binds an MME UE id to an existing UE context and indexes it.
    ///
    /// Returns false if the UE does not exist.
    pub fn bind_mme_id(
        &mut self,
        assoc_id: u32,
        enb_ue_s1ap_id: EnbUeS1apId,
        mme_ue_s1ap_id: MmeUeS1apId,
    ) -> bool {
        let Some(enb) = self.enbs.get_mut(&assoc_id) else {
            return false;
        };
        let Some(ue) = enb.ues.get_mut(&enb_ue_s1ap_id) else {
            return false;
        };
        if let Some(previous) = ue.mme_ue_s1ap_id.replace(mme_ue_s1ap_id) {
            if previous != mme_ue_s1ap_id {
                enb.ue_id_coll.remove(&previous);
                self.mme_ue_index.remove(&previous);
            }
        }
        enb.ue_id_coll.insert(mme_ue_s1ap_id, enb_ue_s1ap_id);
        self.mme_ue_index.insert(mme_ue_s1ap_id, assoc_id);
        true
    }

    /// Removes a UE context and its index entries.
    ///
    /// When the last UE of an eNB being torn down goes away, a `Resetting`
    /// eNB returns to `Init` and a `Shutdown` eNB is removed.
    pub fn remove_ue(&mut self, assoc_id: u32, enb_ue_s1ap_id: EnbUeS1apId) -> Option<UeContext> {
        let enb = self.enbs.get_mut(&assoc_id)?;
        let ue = enb.ues.remove(&enb_ue_s1ap_id)?;
        enb.nb_ue_associated = enb.nb_ue_associated.saturating_sub(1);
        if let Some(mme_ue_s1ap_id) = ue.mme_ue_s1ap_id {
            if enb.ue_id_coll.get(&mme_ue_s1ap_id) == Some(&enb_ue_s1ap_id) {
                enb.ue_id_coll.remove(&mme_ue_s1ap_id);
            }
            if self.mme_ue_index.get(&mme_ue_s1ap_id) == Some(&assoc_id) {
                self.mme_ue_index.remove(&mme_ue_s1ap_id);
                self.imsi_map.remove(&mme_ue_s1ap_id);
            }
        }
        debug!(
            "Removed UE context: assoc={} enb_ue_s1ap_id={} mme_ue_s1ap_id={:?}",
            assoc_id, enb_ue_s1ap_id, ue.mme_ue_s1ap_id
        );

        let remaining = enb.nb_ue_associated;
        let state = enb.state;
        if remaining == 0 {
            match state {
                EnbState::Resetting => {
                    debug!("eNB assoc={} has no UEs left, moving to Init", assoc_id);
                    if let Some(enb) = self.enbs.get_mut(&assoc_id) {
                        enb.state = EnbState::Init;
                    }
                }
                EnbState::Shutdown => {
                    debug!("eNB assoc={} has no UEs left, removing", assoc_id);
                    self.remove_enb(assoc_id);
                }
                EnbState::Init | EnbState::Ready => {}
            }
        }
        Some(ue)
    }

    /// Moves a UE context to another owner.
    ///
    /// The source context (`from`) is removed, `ue` is inserted on its own
    /// association, and the MME UE id indexes point at the new owner. The
    /// identity map entry survives the move.
    pub fn relocate_ue(
        &mut self,
        from: (u32, EnbUeS1apId),
        ue: UeContext,
    ) -> Result<(), DirectoryError> {
        if self.ue(ue.sctp_assoc_id, ue.enb_ue_s1ap_id).is_some() {
            return Err(DirectoryError::DuplicateUe {
                assoc_id: ue.sctp_assoc_id,
                enb_ue_s1ap_id: ue.enb_ue_s1ap_id,
            });
        }
        if !self.enbs.contains_key(&ue.sctp_assoc_id) {
            return Err(DirectoryError::UnknownAssociation(ue.sctp_assoc_id));
        }
        let imsi = ue.mme_ue_s1ap_id.and_then(|id| self.imsi_map.get(&id).cloned());
        self.remove_ue(from.0, from.1);
        if let (Some(mme_ue_s1ap_id), Some(imsi)) = (ue.mme_ue_s1ap_id, imsi) {
            self.imsi_map.insert(mme_ue_s1ap_id, imsi);
        }
        self.insert_ue(ue)
    }

    // ------------------------------------------------------------------------
    // Identity map and timers
    // ------------------------------------------------------------------------

    /// Records the subscriber behind an MME UE id.
    pub fn set_imsi(&mut self, mme_ue_s1ap_id: MmeUeS1apId, imsi: Imsi) {
        self.imsi_map.insert(mme_ue_s1ap_id, imsi);
    }

    /// Subscriber behind an MME UE id, if known
    pub fn imsi(&self, mme_ue_s1ap_id: MmeUeS1apId) -> Option<&Imsi> {
        self.imsi_map.get(&mme_ue_s1ap_id)
    }

    /// Allocates a timer identity.
    pub fn allocate_timer_id(&mut self) -> u64 {
        self.next_timer_id += 1;
        self.next_timer_id
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Serializes the whole directory.
    pub fn save(&self) -> Result<Vec<u8>, DirectoryError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Restores a directory serialized with [`Directory::save`].
    pub fn restore(bytes: &[u8]) -> Result<Self, DirectoryError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// ============================================================================
// Check-out / check-in
// ============================================================================

/// Owner of the directory enforcing the check-out/check-in discipline.
#[derive(Debug, Default)]
pub struct StateCache {
    directory: Directory,
    persist: bool,
    snapshot: Option<Vec<u8>>,
    commits: u64,
}

impl StateCache {
    /// Creates a cache around `directory`; with `persist` set a snapshot is
    /// taken on every check-in.
    pub fn new(directory: Directory, persist: bool) -> Self {
        Self {
            directory,
            persist,
            snapshot: None,
            commits: 0,
        }
    }

    /// Checks the directory out. It is checked back in when the guard drops.
    pub fn checkout(&mut self) -> DirectoryGuard<'_> {
        DirectoryGuard { cache: self }
    }

    /// Read-only view between check-outs
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Snapshot taken at the last check-in, if persistence is enabled
    pub fn last_snapshot(&self) -> Option<&[u8]> {
        self.snapshot.as_deref()
    }

    /// Number of check-ins so far
    pub fn commits(&self) -> u64 {
        self.commits
    }

    fn check_in(&mut self) {
        self.commits += 1;
        if !self.persist {
            return;
        }
        match self.directory.save() {
            Ok(bytes) => self.snapshot = Some(bytes),
            Err(e) => warn!("Failed to snapshot S1AP state: {}", e),
        }
    }
}

/// Exclusive access to the directory for the duration of one handler.
#[derive(Debug)]
pub struct DirectoryGuard<'a> {
    cache: &'a mut StateCache,
}

impl Deref for DirectoryGuard<'_> {
    type Target = Directory;

    fn deref(&self) -> &Directory {
        &self.cache.directory
    }
}

impl DerefMut for DirectoryGuard<'_> {
    fn deref_mut(&mut self) -> &mut Directory {
        &mut self.cache.directory
    }
}

impl Drop for DirectoryGuard<'_> {
    fn drop(&mut self) {
        self.cache.check_in();
    }
}
