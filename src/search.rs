//! Exhaustive constrained search: enumerate, score, keep the top N.
//!
//! Candidates are the |free|! fillings of the free hitters into the free
//! slots, generated in lexicographic permutation order and scored in
//! parallel batches. Each rayon worker keeps a private bounded min-heap;
//! the heaps are merged single-threaded at the end. Because the kept set is
//! the top N under a strict total order (score descending, lineup indices
//! ascending on ties), the result is identical for any worker count or
//! visitation order.
//!
//! Workers check a shared cancellation flag between batches; the flag is
//! raised by whichever worker first observes the request deadline or the
//! hard cap in the past. On cancellation nothing partial is returned.

use std::cmp::Ordering as CmpOrdering;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::constants::*;
use crate::constraints::CompiledConstraints;
use crate::error::OptimizerError;
use crate::types::{BdnrpTensor, Lineup, ScoredLineup};

const RUN: u8 = 0;
const CANCEL_REQUEST: u8 = 1;
const CANCEL_HARD_CAP: u8 = 2;

/// Wall-clock limits for one search. `request_ms` is echoed in the
/// `Cancelled` error and is meaningless when `request_at` is `None`.
#[derive(Clone, Copy, Debug)]
pub struct Deadlines {
    pub request_at: Option<Instant>,
    pub request_ms: u64,
    pub hard_cap_at: Instant,
}

/// Run-model score of one full order: the weighted sum of tensor entries
/// over the nine sliding four-hitter windows, accumulated in f32 in slot
/// order. The fixed order makes scores bitwise-reproducible.
pub fn score_lineup(tensor: &BdnrpTensor, order: &Lineup) -> f32 {
    let mut score = 0.0f32;
    for p in 0..NUM_PLAYERS {
        let p1 = order[(p + NUM_PLAYERS - 3) % NUM_PLAYERS] as usize;
        let p2 = order[(p + NUM_PLAYERS - 2) % NUM_PLAYERS] as usize;
        let p3 = order[(p + NUM_PLAYERS - 1) % NUM_PLAYERS] as usize;
        let p4 = order[p] as usize;
        score += POSITION_WEIGHTS[p] * tensor.get(p1, p2, p3, p4);
    }
    score
}

/// Find the top N lineups in the constrained domain, best first.
pub fn search_top_n(
    tensor: &BdnrpTensor,
    compiled: &CompiledConstraints,
    top_n: usize,
    deadlines: &Deadlines,
) -> Result<Vec<ScoredLineup>, OptimizerError> {
    debug_assert!(top_n >= 1);
    let candidates = enumerate_candidates(compiled);
    let cancel = AtomicU8::new(RUN);

    let merged = candidates
        .par_chunks(SEARCH_BATCH_SIZE)
        .fold(
            || BoundedTopN::new(top_n),
            |mut heap, batch| {
                if cancel.load(Ordering::Relaxed) != RUN {
                    return heap;
                }
                let now = Instant::now();
                if now >= deadlines.hard_cap_at {
                    cancel.store(CANCEL_HARD_CAP, Ordering::Relaxed);
                    return heap;
                }
                if deadlines.request_at.is_some_and(|at| now >= at) {
                    cancel.store(CANCEL_REQUEST, Ordering::Relaxed);
                    return heap;
                }
                for lineup in batch {
                    if compiled.accepts(lineup) {
                        heap.push(ScoredLineup {
                            order: *lineup,
                            score: score_lineup(tensor, lineup),
                        });
                    }
                }
                heap
            },
        )
        .reduce(|| BoundedTopN::new(top_n), BoundedTopN::merge);

    match cancel.load(Ordering::Relaxed) {
        CANCEL_REQUEST => return Err(OptimizerError::Cancelled(deadlines.request_ms)),
        CANCEL_HARD_CAP => return Err(OptimizerError::Deadline(HARD_CAP_MS)),
        _ => {}
    }

    let ranked = merged.into_sorted();
    if ranked.is_empty() {
        return Err(OptimizerError::NoFeasibleLineup);
    }
    Ok(ranked)
}

/// Materialize every candidate lineup: all permutations of the free hitters
/// over the free slots, combined with the fixed assignment.
fn enumerate_candidates(compiled: &CompiledConstraints) -> Vec<Lineup> {
    let mut total = 1usize;
    for n in 1..=compiled.free_hitters.len() {
        total *= n;
    }
    let mut candidates = Vec::with_capacity(total);
    let mut perm = compiled.free_hitters.clone();
    loop {
        candidates.push(fill_lineup(compiled, &perm));
        if !next_permutation(&mut perm) {
            break;
        }
    }
    candidates
}

fn fill_lineup(compiled: &CompiledConstraints, perm: &[u8]) -> Lineup {
    let mut lineup = [0u8; NUM_PLAYERS];
    for (slot, fixed) in compiled.fixed_by_slot.iter().enumerate() {
        if let Some(hitter) = fixed {
            lineup[slot] = *hitter;
        }
    }
    for (pos, &slot) in compiled.free_slots.iter().enumerate() {
        lineup[slot as usize] = perm[pos];
    }
    lineup
}

/// Advance to the lexicographically next permutation in place. Returns
/// false when the input was already the last one.
fn next_permutation(perm: &mut [u8]) -> bool {
    if perm.len() < 2 {
        return false;
    }
    let mut pivot = perm.len() - 1;
    while pivot > 0 && perm[pivot - 1] >= perm[pivot] {
        pivot -= 1;
    }
    if pivot == 0 {
        return false;
    }
    let mut swap = perm.len() - 1;
    while perm[swap] <= perm[pivot - 1] {
        swap -= 1;
    }
    perm.swap(pivot - 1, swap);
    perm[pivot..].reverse();
    true
}

// ── Bounded top-N selection ─────────────────────────────────────────

/// Comparison entry: greater means a better lineup. Scores compare with
/// total_cmp; ties fall back to lexicographically smaller indices.
struct Entry(ScoredLineup);

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.0
            .score
            .total_cmp(&other.0.score)
            .then_with(|| other.0.order.cmp(&self.0.order))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for Entry {}

/// Min-heap of the best N lineups seen so far; the root is the worst kept
/// entry, so an incoming candidate only displaces it when strictly better.
struct BoundedTopN {
    cap: usize,
    heap: BinaryHeap<Reverse<Entry>>,
}

impl BoundedTopN {
    fn new(cap: usize) -> Self {
        Self {
            cap,
            heap: BinaryHeap::with_capacity(cap + 1),
        }
    }

    fn push(&mut self, scored: ScoredLineup) {
        if self.heap.len() < self.cap {
            self.heap.push(Reverse(Entry(scored)));
        } else if let Some(worst) = self.heap.peek() {
            if Entry(scored) > worst.0 {
                self.heap.pop();
                self.heap.push(Reverse(Entry(scored)));
            }
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for Reverse(entry) in other.heap {
            self.push(entry.0);
        }
        self
    }

    /// Best lineup first.
    fn into_sorted(self) -> Vec<ScoredLineup> {
        let mut entries: Vec<Entry> = self.heap.into_iter().map(|r| r.0).collect();
        entries.sort_unstable_by(|a, b| b.cmp(a));
        entries.into_iter().map(|e| e.0).collect()
    }
}
