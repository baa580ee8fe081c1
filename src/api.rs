//! Wire-level request and response shapes, and the boundary conversion.
//!
//! The JSON surface keys hitters by batting slot `"1"`..`"9"` and nests
//! nullable stat blobs. This module converts that shape exactly once into
//! the dense, index-addressed representation the inner components work on,
//! and maps ranked index lineups back to names on the way out. Nothing past
//! this module sees a hitter name or a string key.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::constraints::HandednessCaps;
use crate::error::OptimizerError;
use crate::optimizer::{OptimizeRequest, RankedLineups};
use crate::types::{Handedness, Hitter, HitterStats, Lineup};

// ── Wire shapes ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct WireRequest {
    pub players: BTreeMap<String, Option<WirePlayer>>,
    #[serde(default)]
    pub constraints: Option<WireConstraints>,
    #[serde(default)]
    pub top_n: Option<u64>,
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

#[derive(Deserialize)]
pub struct WirePlayer {
    pub name: String,
    pub data: Option<WireCounts>,
    /// `batting_hand` is the legacy key for the same field.
    #[serde(default, alias = "batting_hand")]
    pub handedness: Option<Handedness>,
}

#[derive(Deserialize)]
pub struct WireCounts {
    pub pa: i64,
    pub h: i64,
    #[serde(rename = "1b", default)]
    pub singles: Option<i64>,
    #[serde(rename = "2b")]
    pub doubles: i64,
    #[serde(rename = "3b")]
    pub triples: i64,
    pub hr: i64,
    pub bb: i64,
    pub hbp: i64,
    pub ibb: i64,
}

#[derive(Deserialize)]
pub struct WireConstraints {
    #[serde(default)]
    pub fixed: BTreeMap<String, String>,
    #[serde(default)]
    pub max_consecutive_left: u32,
    #[serde(default)]
    pub max_consecutive_right: u32,
}

#[derive(Deserialize)]
pub struct WireScoreRequest {
    pub players: BTreeMap<String, Option<WirePlayer>>,
    pub order: Vec<String>,
}

#[derive(Serialize)]
pub struct WireResponse {
    pub expected_runs: f32,
    pub lineups: Vec<WireLineup>,
}

#[derive(Serialize)]
pub struct WireLineup {
    pub order: Vec<String>,
    pub score: f32,
}

// ── Inbound conversion ──────────────────────────────────────────────

/// Deserialize an optimization request body and convert it to the dense
/// form. All shape problems surface as `MalformedRequest`, constraint
/// problems as `MalformedConstraints`.
pub fn parse_optimize_request(body: serde_json::Value) -> Result<OptimizeRequest, OptimizerError> {
    let wire: WireRequest = serde_json::from_value(body)
        .map_err(|e| OptimizerError::MalformedRequest(e.to_string()))?;
    let hitters = convert_players(&wire.players)?;

    let (fixed, caps) = match &wire.constraints {
        Some(constraints) => {
            let names: HashMap<&str, usize> = hitters
                .iter()
                .enumerate()
                .map(|(idx, h)| (h.name.as_str(), idx))
                .collect();
            let mut fixed = Vec::with_capacity(constraints.fixed.len());
            for (slot_key, name) in &constraints.fixed {
                let slot = parse_slot_key(slot_key).ok_or_else(|| {
                    OptimizerError::MalformedConstraints(format!(
                        "fixed slot key {slot_key:?} is not a slot 1-9"
                    ))
                })?;
                let hitter = *names.get(name.as_str()).ok_or_else(|| {
                    OptimizerError::MalformedConstraints(format!(
                        "fixed slot {slot_key} names unknown hitter {name:?}"
                    ))
                })?;
                fixed.push((slot, hitter));
            }
            let caps = HandednessCaps {
                max_left: constraints.max_consecutive_left,
                max_right: constraints.max_consecutive_right,
            };
            (fixed, caps)
        }
        None => (Vec::new(), HandednessCaps::default()),
    };

    Ok(OptimizeRequest {
        hitters,
        fixed,
        caps,
        top_n: wire
            .top_n
            .map(|n| (n as usize).clamp(1, MAX_TOP_N))
            .unwrap_or(DEFAULT_TOP_N),
        deadline_ms: wire.deadline_ms,
    })
}

/// Deserialize a score request body: nine hitters plus the order to score.
pub fn parse_score_request(
    body: serde_json::Value,
) -> Result<(Vec<Hitter>, Lineup), OptimizerError> {
    let wire: WireScoreRequest = serde_json::from_value(body)
        .map_err(|e| OptimizerError::MalformedRequest(e.to_string()))?;
    let hitters = convert_players(&wire.players)?;

    if wire.order.len() != NUM_PLAYERS {
        return Err(OptimizerError::MalformedRequest(format!(
            "order must list {} hitters, got {}",
            NUM_PLAYERS,
            wire.order.len()
        )));
    }
    let names: HashMap<&str, usize> = hitters
        .iter()
        .enumerate()
        .map(|(idx, h)| (h.name.as_str(), idx))
        .collect();
    let mut order: Lineup = [0; NUM_PLAYERS];
    let mut used = [false; NUM_PLAYERS];
    for (slot, name) in wire.order.iter().enumerate() {
        let idx = *names.get(name.as_str()).ok_or_else(|| {
            OptimizerError::MalformedRequest(format!("order names unknown hitter {name:?}"))
        })?;
        if used[idx] {
            return Err(OptimizerError::MalformedRequest(format!(
                "order lists hitter {name:?} twice"
            )));
        }
        used[idx] = true;
        order[slot] = idx as u8;
    }
    Ok((hitters, order))
}

fn convert_players(
    players: &BTreeMap<String, Option<WirePlayer>>,
) -> Result<Vec<Hitter>, OptimizerError> {
    for key in players.keys() {
        if parse_slot_key(key).is_none() {
            return Err(OptimizerError::MalformedRequest(format!(
                "player key {key:?} is not a slot 1-9"
            )));
        }
    }

    let mut hitters = Vec::with_capacity(NUM_PLAYERS);
    for slot in 1..=NUM_PLAYERS {
        let player = players
            .get(&slot.to_string())
            .and_then(|p| p.as_ref())
            .ok_or_else(|| {
                OptimizerError::MalformedRequest(format!("missing player for slot {slot}"))
            })?;
        let counts = player.data.as_ref().ok_or_else(|| {
            OptimizerError::MalformedRequest(format!(
                "player {:?} in slot {slot} has no stats",
                player.name
            ))
        })?;
        hitters.push(Hitter {
            name: player.name.clone(),
            stats: HitterStats {
                pa: counts.pa,
                h: counts.h,
                singles: counts.singles,
                doubles: counts.doubles,
                triples: counts.triples,
                hr: counts.hr,
                bb: counts.bb,
                hbp: counts.hbp,
                ibb: counts.ibb,
            },
            handedness: player.handedness.unwrap_or(Handedness::Right),
        });
    }

    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(NUM_PLAYERS);
    for (idx, hitter) in hitters.iter().enumerate() {
        if let Some(first) = seen.insert(hitter.name.as_str(), idx) {
            return Err(OptimizerError::MalformedRequest(format!(
                "hitter name {:?} appears in slots {} and {}",
                hitter.name,
                first + 1,
                idx + 1
            )));
        }
    }
    Ok(hitters)
}

/// Wire slot keys are 1-based; internal slots are 0-based.
fn parse_slot_key(key: &str) -> Option<usize> {
    match key.parse::<usize>() {
        Ok(slot) if (1..=NUM_PLAYERS).contains(&slot) => Some(slot - 1),
        _ => None,
    }
}

// ── Outbound conversion ─────────────────────────────────────────────

/// Map ranked index lineups back to hitter names.
pub fn to_wire_response(ranked: &RankedLineups, hitters: &[Hitter]) -> WireResponse {
    WireResponse {
        expected_runs: ranked.expected_runs(),
        lineups: ranked
            .lineups
            .iter()
            .map(|scored| WireLineup {
                order: scored
                    .order
                    .iter()
                    .map(|&idx| hitters[idx as usize].name.clone())
                    .collect(),
                score: scored.score,
            })
            .collect(),
    }
}
