//! Core data structures: hitter stats, derived rates, and the per-request
//! interaction tensor.
//!
//! Everything here is built once at request entry and dropped at response
//! time; there is no cross-request state. Inner components address hitters
//! by index 0..8 only — the name ↔ index mapping lives at the boundary.

use serde::Deserialize;

use crate::constants::*;

/// Which side of the plate a hitter bats from. SWITCH hitters count as
/// neither side in consecutive-handedness accounting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Handedness {
    Left,
    Right,
    Switch,
}

/// Raw season counts for one hitter. `singles` is optional on the wire;
/// when absent or inconsistent it is recomputed from H − 2B − 3B − HR.
#[derive(Clone, Copy, Debug)]
pub struct HitterStats {
    pub pa: i64,
    pub h: i64,
    pub singles: Option<i64>,
    pub doubles: i64,
    pub triples: i64,
    pub hr: i64,
    pub bb: i64,
    pub hbp: i64,
    pub ibb: i64,
}

/// One hitter as seen by the pipeline, already detached from its wire slot.
#[derive(Clone, Debug)]
pub struct Hitter {
    pub name: String,
    pub stats: HitterStats,
    pub handedness: Handedness,
}

/// Per-PA event probabilities in the fixed event order
/// (1B, 2B, 3B, HR, BB, HBP, IBB). The out probability is the remainder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventRates(pub [f32; NUM_EVENTS]);

impl EventRates {
    /// Implicit out probability: 1 − Σ rates. Can be a hair negative when
    /// the rates sum to 1 + ε within tolerance; the transition model clamps.
    #[inline(always)]
    pub fn out(&self) -> f32 {
        let mut sum = 0.0f32;
        for r in self.0 {
            sum += r;
        }
        1.0 - sum
    }
}

/// A full batting order: nine distinct hitter indices, slot 0 first.
pub type Lineup = [u8; NUM_PLAYERS];

/// A lineup paired with its run-model score. Higher is better; equal scores
/// order by lexicographic lineup indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredLineup {
    pub order: Lineup,
    pub score: f32,
}

/// Dense 9×9×9×9 interaction tensor. Entry (i, j, k, l) is the expected-runs
/// contribution of hitter l batting fourth in the window i, j, k, l; entries
/// with a repeated index are zero. Immutable once built — search workers
/// share it by reference.
pub struct BdnrpTensor {
    values: Vec<f32>,
}

impl BdnrpTensor {
    pub(crate) fn from_values(values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), TENSOR_ENTRIES);
        Self { values }
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize, k: usize, l: usize) -> f32 {
        self.values[tensor_index(i, j, k, l)]
    }
}
