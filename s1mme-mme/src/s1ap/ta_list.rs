//! Tracking area comparison for S1 Setup

use std::fmt;

use s1mme_common::{MmeConfig, Plmn, Tac};
use s1mme_s1ap::ies::{Cause, CauseMisc};

use super::enb_context::SupportedTa;

/// Outcome of comparing an eNB's supported TA list with the served TAs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaMatch {
    /// Every item matched on TAC and broadcast PLMN
    Full,
    /// TAC served, none of the broadcast PLMNs is
    UnknownPlmn,
    /// A broadcast PLMN is served, the TAC is not
    UnknownTac,
    /// Neither the TAC nor any broadcast PLMN is served
    UnknownTacAndPlmn,
}

impl TaMatch {
    /// Cause of the S1 Setup Failure for a non-matching list, `None` for a
    /// full match.
    pub fn failure_cause(self) -> Option<Cause> {
        match self {
            TaMatch::Full => None,
            TaMatch::UnknownPlmn | TaMatch::UnknownTac | TaMatch::UnknownTacAndPlmn => {
                Some(Cause::Misc(CauseMisc::UnknownPlmn))
            }
        }
    }
}

impl fmt::Display for TaMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaMatch::Full => write!(f, "Full"),
            TaMatch::UnknownPlmn => write!(f, "UnknownPlmn"),
            TaMatch::UnknownTac => write!(f, "UnknownTac"),
            TaMatch::UnknownTacAndPlmn => write!(f, "UnknownTacAndPlmn"),
        }
    }
}

fn classify(ta: &SupportedTa, served_tacs: &[Tac], served_plmns: &[Plmn]) -> TaMatch {
    let tac_ok = served_tacs.contains(&ta.tac);
    let plmn_ok = ta
        .broadcast_plmns
        .iter()
        .any(|plmn| served_plmns.contains(plmn));
    match (tac_ok, plmn_ok) {
        (true, true) => TaMatch::Full,
        (true, false) => TaMatch::UnknownPlmn,
        (false, true) => TaMatch::UnknownTac,
        (false, false) => TaMatch::UnknownTacAndPlmn,
    }
}

/// Compares an eNB's supported TA list against the configured served TAs.
///
/// The list is accepted only if every item matches; otherwise the first
/// non-matching item decides the result. An empty list never matches.
pub fn compare_ta_lists(supported: &[SupportedTa], config: &MmeConfig) -> TaMatch {
    if supported.is_empty() {
        return TaMatch::UnknownTacAndPlmn;
    }
    let served_tacs = config.served_tacs();
    let served_plmns = config.served_plmns();
    supported
        .iter()
        .map(|ta| classify(ta, &served_tacs, &served_plmns))
        .find(|m| *m != TaMatch::Full)
        .unwrap_or(TaMatch::Full)
}
