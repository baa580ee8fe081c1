//! Request orchestration: rates → constraints → tensor → search.
//!
//! Operates entirely on the dense, index-addressed representation; wire
//! parsing and the name ↔ index mapping live in [`crate::api`]. The whole
//! pipeline is per-request and synchronous — callers that must not block an
//! async executor wrap it in `spawn_blocking`.

use std::time::{Duration, Instant};

use crate::constants::*;
use crate::constraints::{self, HandednessCaps};
use crate::error::OptimizerError;
use crate::rates::derive_rates;
use crate::search::{self, Deadlines};
use crate::tensor::build_tensor;
use crate::types::{EventRates, Hitter, Lineup, ScoredLineup};

/// A fully validated, index-addressed optimization request.
#[derive(Clone, Debug)]
pub struct OptimizeRequest {
    /// Exactly nine hitters, in request index order.
    pub hitters: Vec<Hitter>,
    /// Fixed (slot, hitter) pairs, both 0..8.
    pub fixed: Vec<(usize, usize)>,
    pub caps: HandednessCaps,
    pub top_n: usize,
    pub deadline_ms: Option<u64>,
}

/// Ranked result: `lineups[0]` is the winner and its score is the
/// request's expected-runs value.
#[derive(Clone, Debug)]
pub struct RankedLineups {
    pub lineups: Vec<ScoredLineup>,
}

impl RankedLineups {
    pub fn expected_runs(&self) -> f32 {
        self.lineups[0].score
    }
}

/// Run the full pipeline for one request.
pub fn optimize(request: &OptimizeRequest) -> Result<RankedLineups, OptimizerError> {
    let started = Instant::now();
    let top_n = request.top_n.clamp(1, MAX_TOP_N);

    let rates = derive_all_rates(&request.hitters)?;
    let mut handedness = [crate::types::Handedness::Right; NUM_PLAYERS];
    for (idx, hitter) in request.hitters.iter().enumerate() {
        handedness[idx] = hitter.handedness;
    }
    let compiled = constraints::compile(&request.fixed, request.caps, handedness)?;

    let tensor = build_tensor(&rates)?;

    let deadlines = Deadlines {
        request_at: request
            .deadline_ms
            .map(|ms| started + Duration::from_millis(ms)),
        request_ms: request.deadline_ms.unwrap_or(0),
        hard_cap_at: started + Duration::from_millis(HARD_CAP_MS),
    };
    if deadlines.request_at.is_some_and(|at| Instant::now() >= at) {
        return Err(OptimizerError::Cancelled(deadlines.request_ms));
    }

    // Fully pinned order: nothing to enumerate, validate and score directly.
    if compiled.free_slots.is_empty() {
        let mut order: Lineup = [0; NUM_PLAYERS];
        for (slot, fixed) in compiled.fixed_by_slot.iter().enumerate() {
            match fixed {
                Some(hitter) => order[slot] = *hitter,
                None => unreachable!("no free slots but an unfixed slot"),
            }
        }
        if !compiled.accepts(&order) {
            return Err(OptimizerError::NoFeasibleLineup);
        }
        let score = search::score_lineup(&tensor, &order);
        return Ok(RankedLineups {
            lineups: vec![ScoredLineup { order, score }],
        });
    }

    let lineups = search::search_top_n(&tensor, &compiled, top_n, &deadlines)?;
    Ok(RankedLineups { lineups })
}

/// Score one caller-specified order against the request's hitters, without
/// constraints or search.
pub fn score_order(hitters: &[Hitter], order: &Lineup) -> Result<f32, OptimizerError> {
    let rates = derive_all_rates(hitters)?;
    let tensor = build_tensor(&rates)?;
    Ok(search::score_lineup(&tensor, order))
}

fn derive_all_rates(hitters: &[Hitter]) -> Result<[EventRates; NUM_PLAYERS], OptimizerError> {
    if hitters.len() != NUM_PLAYERS {
        return Err(OptimizerError::MalformedRequest(format!(
            "expected {} hitters, got {}",
            NUM_PLAYERS,
            hitters.len()
        )));
    }
    let mut rates = [EventRates([0.0; NUM_EVENTS]); NUM_PLAYERS];
    for (idx, hitter) in hitters.iter().enumerate() {
        rates[idx] = derive_rates(&hitter.name, &hitter.stats)?;
    }
    Ok(rates)
}
