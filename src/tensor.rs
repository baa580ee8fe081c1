//! BDNRP tensor build: one interaction value per ordered quadruple.
//!
//! Entry (i, j, k, l) is the expected runs scored by hitter l batting fourth
//! in a fresh half-inning after i, j, k have batted, under the transition
//! model in [`crate::transitions`]. The 3,024 distinct quadruples are
//! evaluated in parallel over the first axis; each entry lands in its own
//! slot, so the build is deterministic for any thread count. Quadruples with
//! a repeated index stay zero.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::constants::*;
use crate::error::OptimizerError;
use crate::transitions::InningState;
use crate::types::{BdnrpTensor, EventRates};

/// Expected-runs increment of the fourth hitter in one ordered window.
fn quadruple_runs(
    window: [&EventRates; 4],
    clamp_seen: &AtomicBool,
) -> Result<f32, OptimizerError> {
    let mut state = InningState::leadoff();
    state.apply_plate_appearance(window[0], clamp_seen)?;
    state.apply_plate_appearance(window[1], clamp_seen)?;
    state.apply_plate_appearance(window[2], clamp_seen)?;
    state.apply_plate_appearance(window[3], clamp_seen)
}

/// Build the dense 9⁴ tensor from the per-hitter rates.
///
/// Logs the clamp-and-renormalize recovery at most once per build; an
/// unrecoverable transition surfaces as `NumericInstability`.
pub fn build_tensor(rates: &[EventRates; NUM_PLAYERS]) -> Result<BdnrpTensor, OptimizerError> {
    let clamp_seen = AtomicBool::new(false);
    let mut values = vec![0.0f32; TENSOR_ENTRIES];

    values
        .par_chunks_mut(NUM_PLAYERS * NUM_PLAYERS * NUM_PLAYERS)
        .enumerate()
        .try_for_each(|(i, plane)| -> Result<(), OptimizerError> {
            for j in 0..NUM_PLAYERS {
                for k in 0..NUM_PLAYERS {
                    for l in 0..NUM_PLAYERS {
                        if i == j || i == k || i == l || j == k || j == l || k == l {
                            continue;
                        }
                        let value = quadruple_runs(
                            [&rates[i], &rates[j], &rates[k], &rates[l]],
                            &clamp_seen,
                        )?;
                        plane[(j * NUM_PLAYERS + k) * NUM_PLAYERS + l] = value;
                    }
                }
            }
            Ok(())
        })?;

    if clamp_seen.load(Ordering::Relaxed) {
        eprintln!("warning: clamped negative transition probability and renormalized");
    }
    Ok(BdnrpTensor::from_values(values))
}
