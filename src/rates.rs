//! Rate derivation: raw season counts to per-PA event probabilities.
//!
//! Pure per-hitter computation, run once at request entry and cached in the
//! request context. Accumulation happens in f64; stored rates are f32.

use crate::constants::*;
use crate::error::OptimizerError;
use crate::types::{EventRates, HitterStats};

/// Derive the seven per-PA event probabilities for one hitter.
///
/// Fails with `InvalidStats` when PA ≤ 0, any count is negative, or H is
/// smaller than 2B + 3B + HR. A provided singles count that disagrees with
/// H − 2B − 3B − HR is discarded and recomputed.
/// Fails with `RateOverflow` when the seven rates sum past 1 + 1e-6.
pub fn derive_rates(name: &str, stats: &HitterStats) -> Result<EventRates, OptimizerError> {
    let invalid = |reason: &str| OptimizerError::InvalidStats {
        player: name.to_string(),
        reason: reason.to_string(),
    };

    if stats.pa <= 0 {
        return Err(invalid("plate appearances must be positive"));
    }
    let counts = [
        ("h", stats.h),
        ("2b", stats.doubles),
        ("3b", stats.triples),
        ("hr", stats.hr),
        ("bb", stats.bb),
        ("hbp", stats.hbp),
        ("ibb", stats.ibb),
    ];
    for (label, count) in counts {
        if count < 0 {
            return Err(invalid(&format!("negative count for {label}")));
        }
    }
    if let Some(singles) = stats.singles {
        if singles < 0 {
            return Err(invalid("negative count for 1b"));
        }
    }

    let derived_singles = stats.h - stats.doubles - stats.triples - stats.hr;
    if derived_singles < 0 {
        return Err(invalid("hits are fewer than doubles + triples + home runs"));
    }
    // Recompute singles unless the provided count already agrees.
    let singles = match stats.singles {
        Some(s) if s == derived_singles => s,
        _ => derived_singles,
    };

    let pa = stats.pa as f64;
    let rate = |count: i64| (count as f64 / pa) as f32;
    let rates = EventRates([
        rate(singles),
        rate(stats.doubles),
        rate(stats.triples),
        rate(stats.hr),
        rate(stats.bb),
        rate(stats.hbp),
        rate(stats.ibb),
    ]);

    let sum: f64 = rates.0.iter().map(|&r| r as f64).sum();
    if sum > 1.0 + RATE_SUM_TOLERANCE {
        return Err(OptimizerError::RateOverflow {
            player: name.to_string(),
            sum,
        });
    }
    Ok(rates)
}
