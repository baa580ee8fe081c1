//! Error taxonomy for the optimization pipeline.
//!
//! Each variant is one semantic failure kind; the HTTP status mapping lives
//! in [`crate::server`], the wire `kind` string in [`OptimizerError::kind`].
//! C1–C3 surface the first error they detect and short-circuit; the search
//! reports the first cancellation cause it observes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizerError {
    /// Request shape is wrong: missing slots, null stat blobs, duplicate
    /// hitter names, non-request JSON.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Constraint set is self-inconsistent: bad slot key, duplicate slot or
    /// hitter, unknown hitter name.
    #[error("malformed constraints: {0}")]
    MalformedConstraints(String),

    /// Season counts fail basic sanity (PA ≤ 0, negative count, hit total
    /// smaller than its extra-base components).
    #[error("invalid stats for {player}: {reason}")]
    InvalidStats { player: String, reason: String },

    /// Derived event rates sum to more than one plate appearance's worth.
    #[error("event rates for {player} sum to {sum} (> 1)")]
    RateOverflow { player: String, sum: f64 },

    /// No arrangement of the nine handedness tokens can satisfy the caps.
    #[error("handedness caps admit no arrangement of the given hitters")]
    InfeasibleConstraints,

    /// Every lineup in the constrained search space violates the caps.
    #[error("no lineup satisfies the handedness caps under the fixed slots")]
    NoFeasibleLineup,

    /// The request's own deadline passed before the search finished.
    #[error("request deadline of {0} ms exceeded")]
    Cancelled(u64),

    /// The hard wall-clock cap passed before the search finished.
    #[error("hard compute cap of {0} ms exceeded")]
    Deadline(u64),

    /// The state distribution lost all mass during a transition. Recoverable
    /// drift is clamped and renormalized before this is ever raised.
    #[error("numeric instability: state distribution mass vanished")]
    NumericInstability,
}

impl OptimizerError {
    /// Stable taxonomy name reported alongside the message on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            OptimizerError::MalformedRequest(_) => "MalformedRequest",
            OptimizerError::MalformedConstraints(_) => "MalformedConstraints",
            OptimizerError::InvalidStats { .. } => "InvalidStats",
            OptimizerError::RateOverflow { .. } => "RateOverflow",
            OptimizerError::InfeasibleConstraints => "InfeasibleConstraints",
            OptimizerError::NoFeasibleLineup => "NoFeasibleLineup",
            OptimizerError::Cancelled(_) => "Cancelled",
            OptimizerError::Deadline(_) => "Deadline",
            OptimizerError::NumericInstability => "NumericInstability",
        }
    }
}
