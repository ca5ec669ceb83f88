//! Quorum index bounds checks.
//!
//! Indices come from untrusted votes and transactions, so every access into a
//! quorum list goes through one of these first.

use crate::BoundsError;
use stakevote_types::{PublicKey, Quorum};
use tracing::debug;

/// Check that `index` addresses a worker in `quorum`.
pub fn check_worker_index(quorum: &Quorum, index: usize) -> Result<(), BoundsError> {
    if index >= quorum.workers.len() {
        debug!(
            index,
            len = quorum.workers.len(),
            "Quorum worker index out of bounds"
        );
        return Err(BoundsError::WorkerIndexOutOfBounds {
            index,
            len: quorum.workers.len(),
        });
    }
    Ok(())
}

/// Check that `index` addresses a validator in `quorum`.
pub fn check_validator_index(quorum: &Quorum, index: usize) -> Result<(), BoundsError> {
    if index >= quorum.validators.len() {
        debug!(
            index,
            len = quorum.validators.len(),
            "Quorum validator index out of bounds"
        );
        return Err(BoundsError::ValidatorIndexOutOfBounds {
            index,
            len: quorum.validators.len(),
        });
    }
    Ok(())
}

/// The validator key at `index`, bounds-checked.
pub(crate) fn validator_key(quorum: &Quorum, index: usize) -> Result<&PublicKey, BoundsError> {
    check_validator_index(quorum, index)?;
    quorum
        .validator(index)
        .ok_or(BoundsError::ValidatorIndexOutOfBounds {
            index,
            len: quorum.validators.len(),
        })
}
