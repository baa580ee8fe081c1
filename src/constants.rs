//! Domain constants, tensor indexing, and the positional-weight table.
//!
//! Index conventions used by every inner component:
//! - Hitters and batting slots are both 0..8 (the 1-based wire keys are
//!   translated once at the boundary, see [`crate::api`]).
//! - Base-out states pack a 3-bit base mask (bit 0 = runner on first,
//!   bit 1 = second, bit 2 = third) with an out count 0..2 via
//!   [`live_state_index`]. Three outs is the absorbing terminator and is
//!   tracked separately from the 24 live states.

/// Number of hitters in a lineup (and slots in the batting order).
pub const NUM_PLAYERS: usize = 9;

/// Total entries in the dense 9×9×9×9 interaction tensor.
pub const TENSOR_ENTRIES: usize = NUM_PLAYERS * NUM_PLAYERS * NUM_PLAYERS * NUM_PLAYERS;

/// Number of non-out plate-appearance event types.
pub const NUM_EVENTS: usize = 7;

/// Event indices — the fixed evaluation order of the run model. The order is
/// part of the model contract: f32 accumulation follows it exactly.
pub const EVENT_SINGLE: usize = 0;
pub const EVENT_DOUBLE: usize = 1;
pub const EVENT_TRIPLE: usize = 2;
pub const EVENT_HOME_RUN: usize = 3;
pub const EVENT_WALK: usize = 4;
pub const EVENT_HIT_BY_PITCH: usize = 5;
pub const EVENT_INTENTIONAL_WALK: usize = 6;

/// Number of base-occupancy configurations (3 bases, each empty or occupied).
pub const NUM_BASE_STATES: usize = 8;

/// Live out counts within a half-inning (the third out absorbs).
pub const NUM_OUT_STATES: usize = 3;

/// Live base-out states: 8 base configurations × 3 out counts.
pub const NUM_LIVE_STATES: usize = NUM_BASE_STATES * NUM_OUT_STATES;

/// Tolerance applied when checking that derived event rates sum to at most 1.
pub const RATE_SUM_TOLERANCE: f64 = 1e-6;

/// Default number of ranked lineups returned when the request does not ask.
pub const DEFAULT_TOP_N: usize = 5;

/// Upper clamp for the requested number of ranked lineups.
pub const MAX_TOP_N: usize = 100;

/// Candidates scored between two cancellation-flag checks.
pub const SEARCH_BATCH_SIZE: usize = 4096;

/// Hard wall-clock cap on a single optimization, in milliseconds.
pub const HARD_CAP_MS: u64 = 30_000;

/// Positional weights W[p]: how many trips through the order slot p gets per
/// game. Calibration data of the run model — tabulated, not derived. The
/// values follow W[p] = 1 + (8 − p)/9 for p < 8 and W[8] = 1.
pub const POSITION_WEIGHTS: [f32; NUM_PLAYERS] = [
    1.888_888_9,
    1.777_777_8,
    1.666_666_7,
    1.555_555_6,
    1.444_444_4,
    1.333_333_3,
    1.222_222_2,
    1.111_111_1,
    1.0,
];

/// Flat index into the dense interaction tensor for the ordered quadruple
/// (i, j, k, l). Row-major: the fourth axis varies fastest.
#[inline(always)]
pub fn tensor_index(i: usize, j: usize, k: usize, l: usize) -> usize {
    debug_assert!(i < NUM_PLAYERS && j < NUM_PLAYERS && k < NUM_PLAYERS && l < NUM_PLAYERS);
    ((i * NUM_PLAYERS + j) * NUM_PLAYERS + k) * NUM_PLAYERS + l
}

/// Flat index of a live base-out state.
#[inline(always)]
pub fn live_state_index(bases: usize, outs: usize) -> usize {
    debug_assert!(bases < NUM_BASE_STATES && outs < NUM_OUT_STATES);
    outs * NUM_BASE_STATES + bases
}
