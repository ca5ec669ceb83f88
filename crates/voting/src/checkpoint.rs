//! Checkpoint verification.

use crate::{verify_quorum_signatures, CheckpointError, VotingConfig};
use stakevote_types::{Checkpoint, CheckpointKind, HardFork, Quorum, QuorumType};
use tracing::info;

/// Verify a checkpoint against the checkpointing quorum for its height.
///
/// Service-node checkpoints only exist on interval heights and must carry a
/// valid signature set. Hardcoded checkpoints carry no signatures at all.
pub fn verify_checkpoint(
    hf: HardFork,
    checkpoint: &Checkpoint,
    quorum: &Quorum,
    config: &VotingConfig,
) -> Result<(), CheckpointError> {
    match checkpoint.kind {
        CheckpointKind::ServiceNode => {
            let interval = config.checkpoint_interval;
            if interval == 0 || checkpoint.height % interval != 0 {
                info!(
                    height = checkpoint.height,
                    "Checkpoint given but not expecting a checkpoint at this height"
                );
                return Err(CheckpointError::UnexpectedHeight {
                    height: checkpoint.height,
                    interval,
                });
            }

            if let Err(e) = verify_quorum_signatures(
                quorum,
                QuorumType::Checkpointing,
                hf,
                checkpoint.height,
                &checkpoint.block_hash,
                &checkpoint.signatures,
                None,
                config,
            ) {
                info!(
                    height = checkpoint.height,
                    block = %checkpoint.block_hash,
                    error = %e,
                    "Checkpoint failed signature validation"
                );
                return Err(e.into());
            }
        }
        CheckpointKind::Hardcoded => {
            if !checkpoint.signatures.is_empty() {
                info!(
                    height = checkpoint.height,
                    "Non service-node checkpoints should have no signatures"
                );
                return Err(CheckpointError::HardcodedWithSignatures(
                    checkpoint.signatures.len(),
                ));
            }
        }
    }
    Ok(())
}
