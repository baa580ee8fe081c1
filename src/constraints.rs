//! Constraint compilation: fixed batting slots and cyclic handedness caps.
//!
//! Produces the reduced search domain (free slots × free hitters) and the
//! lineup predicate used by the search. The lineup is a cycle — slot 8 is
//! adjacent to slot 0 — so run lengths are measured by walking the order
//! twice; a SWITCH hitter resets both runs. The feasibility pre-check and
//! the search predicate share [`max_cyclic_runs`], so they can never
//! disagree on what a run is.

use crate::constants::NUM_PLAYERS;
use crate::error::OptimizerError;
use crate::types::{Handedness, Lineup};

/// Handedness caps: the longest permitted run of consecutive same-side
/// hitters on the cycle. Zero means uncapped.
#[derive(Clone, Copy, Debug, Default)]
pub struct HandednessCaps {
    pub max_left: u32,
    pub max_right: u32,
}

impl HandednessCaps {
    pub fn is_unconstrained(&self) -> bool {
        self.max_left == 0 && self.max_right == 0
    }
}

/// Compiled constraint set: the reduced domain plus everything the lineup
/// predicate needs.
#[derive(Clone, Debug)]
pub struct CompiledConstraints {
    /// Hitter fixed into each slot, if any.
    pub fixed_by_slot: [Option<u8>; NUM_PLAYERS],
    /// Slots still open, ascending.
    pub free_slots: Vec<u8>,
    /// Hitters not pinned to a slot, ascending.
    pub free_hitters: Vec<u8>,
    pub caps: HandednessCaps,
    pub handedness: [Handedness; NUM_PLAYERS],
}

impl CompiledConstraints {
    /// Lineup predicate: does this full order satisfy the cyclic caps?
    pub fn accepts(&self, lineup: &Lineup) -> bool {
        if self.caps.is_unconstrained() {
            return true;
        }
        let mut hands = [Handedness::Switch; NUM_PLAYERS];
        for (slot, &hitter) in lineup.iter().enumerate() {
            hands[slot] = self.handedness[hitter as usize];
        }
        runs_within_caps(&hands, self.caps)
    }
}

/// Validate and compile a constraint set.
///
/// `fixed` pairs are (slot, hitter), both 0..8 — the wire layer has already
/// translated names and 1-based keys. Fails with `MalformedConstraints` on a
/// duplicate slot or hitter, and with `InfeasibleConstraints` when no
/// arrangement of the nine handedness tokens can satisfy the caps.
pub fn compile(
    fixed: &[(usize, usize)],
    caps: HandednessCaps,
    handedness: [Handedness; NUM_PLAYERS],
) -> Result<CompiledConstraints, OptimizerError> {
    let mut fixed_by_slot = [None; NUM_PLAYERS];
    let mut hitter_used = [false; NUM_PLAYERS];
    for &(slot, hitter) in fixed {
        if slot >= NUM_PLAYERS || hitter >= NUM_PLAYERS {
            return Err(OptimizerError::MalformedConstraints(format!(
                "slot {slot} / hitter {hitter} out of range"
            )));
        }
        if fixed_by_slot[slot].is_some() {
            return Err(OptimizerError::MalformedConstraints(format!(
                "slot {} is fixed twice",
                slot + 1
            )));
        }
        if hitter_used[hitter] {
            return Err(OptimizerError::MalformedConstraints(format!(
                "hitter {hitter} is fixed to two slots"
            )));
        }
        fixed_by_slot[slot] = Some(hitter as u8);
        hitter_used[hitter] = true;
    }

    let free_slots: Vec<u8> = (0..NUM_PLAYERS as u8)
        .filter(|&s| fixed_by_slot[s as usize].is_none())
        .collect();
    let free_hitters: Vec<u8> = (0..NUM_PLAYERS as u8)
        .filter(|&h| !hitter_used[h as usize])
        .collect();

    if !caps.is_unconstrained() && !caps_feasible(&handedness, caps) {
        return Err(OptimizerError::InfeasibleConstraints);
    }

    Ok(CompiledConstraints {
        fixed_by_slot,
        free_slots,
        free_hitters,
        caps,
        handedness,
    })
}

/// Longest LEFT and RIGHT runs on the 9-cycle. Walks the order twice so a
/// run wrapping from slot 8 into slot 0 is counted whole; SWITCH resets
/// both counters.
pub fn max_cyclic_runs(hands: &[Handedness; NUM_PLAYERS]) -> (u32, u32) {
    let mut run_left = 0u32;
    let mut run_right = 0u32;
    let mut max_left = 0u32;
    let mut max_right = 0u32;
    for step in 0..2 * NUM_PLAYERS {
        match hands[step % NUM_PLAYERS] {
            Handedness::Left => {
                run_left += 1;
                run_right = 0;
                max_left = max_left.max(run_left);
            }
            Handedness::Right => {
                run_right += 1;
                run_left = 0;
                max_right = max_right.max(run_right);
            }
            Handedness::Switch => {
                run_left = 0;
                run_right = 0;
            }
        }
    }
    (max_left, max_right)
}

fn runs_within_caps(hands: &[Handedness; NUM_PLAYERS], caps: HandednessCaps) -> bool {
    let (max_left, max_right) = max_cyclic_runs(hands);
    (caps.max_left == 0 || max_left <= caps.max_left)
        && (caps.max_right == 0 || max_right <= caps.max_right)
}

/// Feasibility pre-check: does any arrangement of the nine handedness
/// tokens satisfy the caps? Depth-first over distinct token sequences,
/// pruning branches whose linear run already exceeds a cap (a cyclic run
/// can only be at least as long); surviving leaves get the full cyclic
/// check.
fn caps_feasible(handedness: &[Handedness; NUM_PLAYERS], caps: HandednessCaps) -> bool {
    let mut counts = [0u8; 3];
    for &h in handedness {
        counts[h as usize] += 1;
    }
    let mut seq = [Handedness::Switch; NUM_PLAYERS];
    dfs_arrangements(&mut counts, &mut seq, 0, caps)
}

fn dfs_arrangements(
    counts: &mut [u8; 3],
    seq: &mut [Handedness; NUM_PLAYERS],
    depth: usize,
    caps: HandednessCaps,
) -> bool {
    if depth == NUM_PLAYERS {
        return runs_within_caps(seq, caps);
    }
    for (token_idx, token) in [Handedness::Left, Handedness::Right, Handedness::Switch]
        .into_iter()
        .enumerate()
    {
        if counts[token_idx] == 0 {
            continue;
        }
        seq[depth] = token;
        if linear_run_fits(&seq[..=depth], caps) {
            counts[token_idx] -= 1;
            let found = dfs_arrangements(counts, seq, depth + 1, caps);
            counts[token_idx] += 1;
            if found {
                return true;
            }
        }
    }
    false
}

/// Does the trailing run of a partial sequence still fit under the caps?
fn linear_run_fits(prefix: &[Handedness], caps: HandednessCaps) -> bool {
    let last = prefix[prefix.len() - 1];
    let cap = match last {
        Handedness::Left => caps.max_left,
        Handedness::Right => caps.max_right,
        Handedness::Switch => return true,
    };
    if cap == 0 {
        return true;
    }
    let run = prefix.iter().rev().take_while(|&&h| h == last).count() as u32;
    run <= cap
}
