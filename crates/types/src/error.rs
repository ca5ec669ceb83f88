//! Errors for decoding wire enums.

/// Errors from converting raw wire values into typed enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// Quorum type discriminator is not a known quorum type.
    #[error("unknown quorum type: {0}")]
    UnknownQuorumType(u8),

    /// Quorum group discriminator is not validator or worker.
    #[error("invalid quorum group: {0}")]
    InvalidQuorumGroup(u8),

    /// State discriminator is not a known service node state.
    #[error("unknown service node state: {0}")]
    UnknownState(u16),

    /// A vote's payload fields do not match its declared type.
    #[error("vote payload missing field `{0}`")]
    MissingPayloadField(&'static str),
}
