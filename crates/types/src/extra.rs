//! Transaction extra codec.
//!
//! A transaction's `extra` is a bincode-encoded list of tagged fields. State
//! changes are stored there; before richer state changes were enabled only the
//! legacy deregistration field existed.

use crate::{DeregisterOld, HardFork, StateChange};
use serde::{Deserialize, Serialize};

/// Errors from reading or writing transaction extra fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtraError {
    /// The extra bytes are not a valid field list.
    #[error("malformed tx extra: {0}")]
    Malformed(String),

    /// No state change field of the form expected at this hard fork.
    #[error("tx extra has no state change for {hf}")]
    MissingStateChange { hf: HardFork },

    /// Only deregistrations can be written in the legacy form.
    #[error("state {state} cannot be encoded before richer state changes")]
    LegacyStateUnsupported { state: u16 },
}

impl From<bincode::Error> for ExtraError {
    fn from(e: bincode::Error) -> Self {
        ExtraError::Malformed(e.to_string())
    }
}

/// A single tagged field in a transaction's extra.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxExtraField {
    StateChange(StateChange),
    DeregisterOld(DeregisterOld),
    Nonce(Vec<u8>),
}

/// Transaction kinds the voting core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    Standard,
    StateChange,
    Stake,
}

/// The parts of a committed transaction visible to the voting core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u8,
    pub tx_type: TxType,
    pub extra: Vec<u8>,
}

impl Transaction {
    /// Build a state-change transaction for `hf`.
    pub fn state_change(
        state_change: &StateChange,
        hf: HardFork,
        richer_state_changes: HardFork,
    ) -> Result<Self, ExtraError> {
        let mut extra = Vec::new();
        add_state_change_to_tx_extra(&mut extra, state_change, hf, richer_state_changes)?;
        Ok(Transaction {
            version: 4,
            tx_type: TxType::StateChange,
            extra,
        })
    }
}

/// Decode the field list. Empty extra is an empty list.
pub fn parse_tx_extra(extra: &[u8]) -> Result<Vec<TxExtraField>, ExtraError> {
    if extra.is_empty() {
        return Ok(Vec::new());
    }
    Ok(bincode::deserialize(extra)?)
}

/// Append `state_change` to `extra` in the form valid at `hf`.
pub fn add_state_change_to_tx_extra(
    extra: &mut Vec<u8>,
    state_change: &StateChange,
    hf: HardFork,
    richer_state_changes: HardFork,
) -> Result<(), ExtraError> {
    let mut fields = parse_tx_extra(extra)?;

    if hf.at_least(richer_state_changes) {
        fields.push(TxExtraField::StateChange(state_change.clone()));
    } else {
        if !state_change.is_deregister() {
            return Err(ExtraError::LegacyStateUnsupported {
                state: state_change.state,
            });
        }
        fields.push(TxExtraField::DeregisterOld(DeregisterOld {
            block_height: state_change.block_height,
            service_node_index: state_change.service_node_index,
            votes: state_change.votes.clone(),
        }));
    }

    *extra = bincode::serialize(&fields)?;
    Ok(())
}

/// Read the state change stored in `extra`, in the form valid at `hf`.
///
/// Legacy deregistrations are returned as a [`StateChange`] with the
/// deregister state and no reasons.
pub fn state_change_from_tx_extra(
    extra: &[u8],
    hf: HardFork,
    richer_state_changes: HardFork,
) -> Result<StateChange, ExtraError> {
    let legacy = !hf.at_least(richer_state_changes);
    parse_tx_extra(extra)?
        .into_iter()
        .find_map(|field| match field {
            TxExtraField::StateChange(sc) if !legacy => Some(sc),
            TxExtraField::DeregisterOld(old) if legacy => Some(StateChange::from(old)),
            _ => None,
        })
        .ok_or(ExtraError::MissingStateChange { hf })
}
