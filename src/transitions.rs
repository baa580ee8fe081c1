//! Half-inning base-out Markov model: the plate-appearance transition.
//!
//! This module is the contract of the BDNRP engine. A half-inning state is a
//! distribution over 24 live states (8 base configurations × 0–2 outs) plus
//! an absorbing three-outs terminator. One plate appearance maps that
//! distribution through the deterministic advancement table below, in the
//! fixed event order 1B, 2B, 3B, HR, BB, HBP, IBB, OUT, accumulating in f32.
//! Reimplementations must reproduce this arithmetic bit for bit.
//!
//! | Event | Runner policy                                          | Outs |
//! |-------|--------------------------------------------------------|------|
//! | 1B    | runner on 1B to 2B; runners on 2B and 3B score         | +0   |
//! | 2B    | runner on 1B to 3B; runners on 2B and 3B score         | +0   |
//! | 3B    | all runners score                                      | +0   |
//! | HR    | all runners and the batter score                       | +0   |
//! | walk  | forced advance only                                    | +0   |
//! | OUT   | no runner advances                                     | +1   |

use std::sync::atomic::{AtomicBool, Ordering};

use crate::constants::*;
use crate::error::OptimizerError;
use crate::types::EventRates;

/// Distribution over the live base-out states of one half-inning. Mass that
/// reaches three outs moves to `absorbed` and never bats again.
#[derive(Clone, Debug)]
pub struct InningState {
    pub live: [f32; NUM_LIVE_STATES],
    pub absorbed: f32,
}

impl InningState {
    /// Bases empty, nobody out, with certainty.
    pub fn leadoff() -> Self {
        let mut live = [0.0f32; NUM_LIVE_STATES];
        live[live_state_index(0, 0)] = 1.0;
        Self {
            live,
            absorbed: 0.0,
        }
    }

    /// Apply one plate appearance by a hitter with the given rates.
    ///
    /// Returns the expected runs scored during this plate appearance. Any
    /// negative probability produced by floating-point drift is clamped to
    /// zero and the whole distribution renormalized; `clamp_seen` is raised
    /// so the caller can log the recovery once per request. If clamping
    /// leaves no mass at all the model has broken down and
    /// `NumericInstability` is returned.
    pub fn apply_plate_appearance(
        &mut self,
        rates: &EventRates,
        clamp_seen: &AtomicBool,
    ) -> Result<f32, OptimizerError> {
        let mut next = [0.0f32; NUM_LIVE_STATES];
        let mut next_absorbed = self.absorbed;
        let mut runs = 0.0f32;
        let out_rate = rates.out();

        for outs in 0..NUM_OUT_STATES {
            for bases in 0..NUM_BASE_STATES {
                let p = self.live[live_state_index(bases, outs)];
                if p == 0.0 {
                    continue;
                }
                for event in 0..NUM_EVENTS {
                    let q = p * rates.0[event];
                    let (new_bases, scored) = advance(bases, event);
                    next[live_state_index(new_bases, outs)] += q;
                    runs += q * scored as f32;
                }
                let q_out = p * out_rate;
                if outs + 1 < NUM_OUT_STATES {
                    next[live_state_index(bases, outs + 1)] += q_out;
                } else {
                    next_absorbed += q_out;
                }
            }
        }

        let mut clamped = false;
        for prob in next.iter_mut() {
            if *prob < 0.0 {
                *prob = 0.0;
                clamped = true;
            }
        }
        if next_absorbed < 0.0 {
            next_absorbed = 0.0;
            clamped = true;
        }
        if clamped {
            clamp_seen.store(true, Ordering::Relaxed);
            let mut total = next_absorbed;
            for prob in next.iter() {
                total += prob;
            }
            if total <= 0.0 {
                return Err(OptimizerError::NumericInstability);
            }
            let scale = 1.0 / total;
            for prob in next.iter_mut() {
                *prob *= scale;
            }
            next_absorbed *= scale;
        }

        self.live = next;
        self.absorbed = next_absorbed;
        Ok(runs)
    }
}

/// Deterministic advancement for a non-out event: (new base mask, runs).
/// Base mask bits: 0 = first, 1 = second, 2 = third.
#[inline(always)]
fn advance(bases: usize, event: usize) -> (usize, u32) {
    match event {
        EVENT_SINGLE => {
            // Runner on first takes second; second and third score.
            let runs = ((bases >> 1) & 1) as u32 + ((bases >> 2) & 1) as u32;
            (0b001 | ((bases & 0b001) << 1), runs)
        }
        EVENT_DOUBLE => {
            // Runner on first takes third; second and third score.
            let runs = ((bases >> 1) & 1) as u32 + ((bases >> 2) & 1) as u32;
            (0b010 | ((bases & 0b001) << 2), runs)
        }
        EVENT_TRIPLE => (0b100, bases.count_ones()),
        EVENT_HOME_RUN => (0, bases.count_ones() + 1),
        EVENT_WALK | EVENT_HIT_BY_PITCH | EVENT_INTENTIONAL_WALK => {
            // Forced advance only: runners move one base iff every base
            // behind them (and first) is occupied.
            if bases & 0b001 == 0 {
                (bases | 0b001, 0)
            } else if bases & 0b010 == 0 {
                (bases | 0b011, 0)
            } else if bases & 0b100 == 0 {
                (0b111, 0)
            } else {
                (0b111, 1)
            }
        }
        _ => unreachable!("event index out of range"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pure(event: usize) -> EventRates {
        let mut r = [0.0f32; NUM_EVENTS];
        r[event] = 1.0;
        EventRates(r)
    }

    fn outs_only() -> EventRates {
        EventRates([0.0; NUM_EVENTS])
    }

    #[test]
    fn test_single_advancement() {
        // Runner on second: single scores him, batter to first.
        assert_eq!(advance(0b010, EVENT_SINGLE), (0b001, 1));
        // Runner on first: takes second, nobody scores.
        assert_eq!(advance(0b001, EVENT_SINGLE), (0b011, 0));
        // Bases loaded: second and third score, first and batter stay on.
        assert_eq!(advance(0b111, EVENT_SINGLE), (0b011, 2));
    }

    #[test]
    fn test_double_advancement() {
        assert_eq!(advance(0b001, EVENT_DOUBLE), (0b110, 0));
        assert_eq!(advance(0b110, EVENT_DOUBLE), (0b010, 2));
        assert_eq!(advance(0b111, EVENT_DOUBLE), (0b110, 2));
    }

    #[test]
    fn test_triple_and_home_run() {
        assert_eq!(advance(0b111, EVENT_TRIPLE), (0b100, 3));
        assert_eq!(advance(0b000, EVENT_TRIPLE), (0b100, 0));
        assert_eq!(advance(0b111, EVENT_HOME_RUN), (0b000, 4));
        assert_eq!(advance(0b000, EVENT_HOME_RUN), (0b000, 1));
    }

    #[test]
    fn test_walk_forces() {
        assert_eq!(advance(0b000, EVENT_WALK), (0b001, 0));
        // Runner on second only: not forced.
        assert_eq!(advance(0b010, EVENT_WALK), (0b011, 0));
        // First and second: both forced.
        assert_eq!(advance(0b011, EVENT_WALK), (0b111, 0));
        // Runner on third, first empty: third holds.
        assert_eq!(advance(0b100, EVENT_WALK), (0b101, 0));
        // Bases loaded: run walks in.
        assert_eq!(advance(0b111, EVENT_WALK), (0b111, 1));
    }

    #[test]
    fn test_three_walks_load_the_bases() {
        let flag = AtomicBool::new(false);
        let mut st = InningState::leadoff();
        for _ in 0..3 {
            let runs = st.apply_plate_appearance(&pure(EVENT_WALK), &flag).unwrap();
            assert_eq!(runs, 0.0);
        }
        assert_eq!(st.live[live_state_index(0b111, 0)], 1.0);
        // Fourth walk scores exactly one.
        let mut st4 = st.clone();
        let runs = st4
            .apply_plate_appearance(&pure(EVENT_WALK), &flag)
            .unwrap();
        assert_eq!(runs, 1.0);
        assert!(!flag.load(Ordering::Relaxed));
    }

    #[test]
    fn test_outs_absorb() {
        let flag = AtomicBool::new(false);
        let mut st = InningState::leadoff();
        for n in 1..=3 {
            st.apply_plate_appearance(&outs_only(), &flag).unwrap();
            if n < 3 {
                assert_eq!(st.live[live_state_index(0, n)], 1.0);
            }
        }
        assert_eq!(st.absorbed, 1.0);
        assert!(st.live.iter().all(|&p| p == 0.0));
        // Batting with the inning over scores nothing.
        let runs = st
            .apply_plate_appearance(&pure(EVENT_HOME_RUN), &flag)
            .unwrap();
        assert_eq!(runs, 0.0);
    }

    #[test]
    fn test_mass_conserved() {
        let flag = AtomicBool::new(false);
        let mixed = EventRates([0.15, 0.05, 0.01, 0.03, 0.08, 0.01, 0.01]);
        let mut st = InningState::leadoff();
        for _ in 0..9 {
            st.apply_plate_appearance(&mixed, &flag).unwrap();
            let total: f32 = st.live.iter().sum::<f32>() + st.absorbed;
            assert!((total - 1.0).abs() < 1e-4, "total={total}");
        }
    }

    #[test]
    fn test_negative_out_rate_clamped() {
        // Rates summing a hair past 1 push the out rate negative; the
        // transition must clamp, renormalize, and raise the flag.
        let flag = AtomicBool::new(false);
        let mut r = [0.0f32; NUM_EVENTS];
        r[EVENT_WALK] = 0.5;
        r[EVENT_SINGLE] = 0.5 + 5e-7;
        let mut st = InningState::leadoff();
        st.apply_plate_appearance(&EventRates(r), &flag).unwrap();
        assert!(flag.load(Ordering::Relaxed));
        let total: f32 = st.live.iter().sum::<f32>() + st.absorbed;
        assert!((total - 1.0).abs() < 1e-5);
        assert!(st.live.iter().all(|&p| p >= 0.0));
    }
}
