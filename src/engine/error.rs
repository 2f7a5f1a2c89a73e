use thiserror::Error;

/// Errors surfaced by the routing engine.
///
/// Configuration variants are raised by [`crate::engine::config::RoutingConfig::validate`]
/// before any stepping begins. `NoViableCandidates` is not a crash: it is the
/// distinguished result for a frontier that pruning reduced to zero columns.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("heading segment count must be even, got {0}")]
    OddHeadingSegments(usize),

    #[error("prune segment count must be even, got {0}")]
    OddPruneSegments(usize),

    #[error(
        "heading fan half-width of {fan_half_deg}\u{b0} does not fit inside the \
         prune sector half-width of {sector_half_deg}\u{b0}"
    )]
    FanExceedsPruneSector {
        fan_half_deg: f64,
        sector_half_deg: f64,
    },

    /// A recorded sector maximum could not be matched to a live candidate, or
    /// a selection index fell outside the frontier. Symptom of a broken
    /// internal invariant, never ignored or defaulted.
    #[error("pruned indices out of bounds")]
    PrunedIndicesOutOfBounds,

    #[error("routing failed: no viable candidates remain after step {step}")]
    NoViableCandidates { step: usize },
}
