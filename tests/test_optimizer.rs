//! End-to-end pipeline scenarios against the dense optimizer API.

use std::time::Instant;

use lineup::constraints::{max_cyclic_runs, HandednessCaps};
use lineup::error::OptimizerError;
use lineup::optimizer::{optimize, OptimizeRequest};
use lineup::types::{Handedness, Hitter, HitterStats};

fn hitter(name: &str, stats: HitterStats, handedness: Handedness) -> Hitter {
    Hitter {
        name: name.to_string(),
        stats,
        handedness,
    }
}

fn clone_stats() -> HitterStats {
    // PA 600, 1B 90, 2B 30, 3B 3, HR 20, BB 60, HBP 6, IBB 2.
    HitterStats {
        pa: 600,
        h: 143,
        singles: Some(90),
        doubles: 30,
        triples: 3,
        hr: 20,
        bb: 60,
        hbp: 6,
        ibb: 2,
    }
}

fn average_stats(seed: i64) -> HitterStats {
    HitterStats {
        pa: 600,
        h: 140 + seed,
        singles: None,
        doubles: 28 + (seed % 3),
        triples: 2,
        hr: 15 + (seed % 5),
        bb: 55 + seed,
        hbp: 4,
        ibb: 1,
    }
}

fn star_stats() -> HitterStats {
    HitterStats {
        pa: 600,
        h: 200,
        singles: None,
        doubles: 40,
        triples: 5,
        hr: 45,
        bb: 100,
        hbp: 8,
        ibb: 12,
    }
}

fn request(hitters: Vec<Hitter>) -> OptimizeRequest {
    OptimizeRequest {
        hitters,
        fixed: Vec::new(),
        caps: HandednessCaps::default(),
        top_n: 1,
        deadline_ms: None,
    }
}

// Scenario 1: nine clones — one lineup class, bit-reproducible score.
#[test]
fn identity_lineup_class() {
    let hitters: Vec<Hitter> = (0..9)
        .map(|i| hitter(&format!("clone{i}"), clone_stats(), Handedness::Right))
        .collect();
    let req = request(hitters);

    let first = optimize(&req).unwrap();
    assert_eq!(first.lineups.len(), 1);
    // Every order ties, so the lexicographically smallest wins.
    assert_eq!(first.lineups[0].order, [0, 1, 2, 3, 4, 5, 6, 7, 8]);

    let second = optimize(&req).unwrap();
    assert_eq!(
        first.lineups[0].score.to_bits(),
        second.lineups[0].score.to_bits()
    );
    assert_eq!(first.lineups[0].order, second.lineups[0].order);
}

// Scenario 2: one star pinned at leadoff.
#[test]
fn star_fixed_at_leadoff() {
    let mut hitters: Vec<Hitter> = (0..8)
        .map(|i| hitter(&format!("avg{i}"), average_stats(i), Handedness::Right))
        .collect();
    hitters.push(hitter("star", star_stats(), Handedness::Right));

    let mut req = request(hitters);
    req.fixed = vec![(0, 8)];
    req.top_n = 5;

    let ranked = optimize(&req).unwrap();
    assert_eq!(ranked.lineups.len(), 5);
    for scored in &ranked.lineups {
        assert_eq!(scored.order[0], 8);
    }
    assert_eq!(ranked.expected_runs(), ranked.lineups[0].score);
}

// Scenario 3: nine lefties under a cap of two — infeasible before search.
#[test]
fn nine_lefties_infeasible() {
    let hitters: Vec<Hitter> = (0..9)
        .map(|i| hitter(&format!("l{i}"), average_stats(i), Handedness::Left))
        .collect();
    let mut req = request(hitters);
    req.caps = HandednessCaps {
        max_left: 2,
        max_right: 0,
    };
    let err = optimize(&req).unwrap_err();
    assert!(matches!(err, OptimizerError::InfeasibleConstraints));
}

// Scenario 4: five lefties, four righties, caps of two on both sides.
#[test]
fn tight_handedness_caps_hold_on_the_cycle() {
    let hitters: Vec<Hitter> = (0..9)
        .map(|i| {
            let hand = if i < 5 {
                Handedness::Left
            } else {
                Handedness::Right
            };
            hitter(&format!("m{i}"), average_stats(i), hand)
        })
        .collect();
    let handedness: Vec<Handedness> = hitters.iter().map(|h| h.handedness).collect();

    let mut req = request(hitters);
    req.caps = HandednessCaps {
        max_left: 2,
        max_right: 2,
    };
    req.top_n = 5;

    let ranked = optimize(&req).unwrap();
    assert!(!ranked.lineups.is_empty());
    for scored in &ranked.lineups {
        let mut hands = [Handedness::Switch; 9];
        for (slot, &idx) in scored.order.iter().enumerate() {
            hands[slot] = handedness[idx as usize];
        }
        let (max_left, max_right) = max_cyclic_runs(&hands);
        assert!(max_left <= 2, "left run {max_left} in {:?}", scored.order);
        assert!(max_right <= 2, "right run {max_right} in {:?}", scored.order);
    }
}

// Scenario 5: top-N monotonicity — the smaller request is a prefix.
#[test]
fn top_n_requests_are_prefix_monotone() {
    let hitters: Vec<Hitter> = (0..9)
        .map(|i| hitter(&format!("p{i}"), average_stats(i), Handedness::Right))
        .collect();
    let mut req = request(hitters);
    req.fixed = (0..5).map(|s| (s, s)).collect();

    req.top_n = 3;
    let top3 = optimize(&req).unwrap();
    req.top_n = 7;
    let top7 = optimize(&req).unwrap();

    assert_eq!(top3.lineups.len(), 3);
    assert_eq!(top7.lineups.len(), 7);
    for (a, b) in top3.lineups.iter().zip(&top7.lineups) {
        assert_eq!(a.order, b.order);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
    }
}

// Scenario 6: a 1 ms deadline over the full 9! space cancels promptly with
// no partial results.
#[test]
fn expired_deadline_cancels_without_partials() {
    let hitters: Vec<Hitter> = (0..9)
        .map(|i| hitter(&format!("c{i}"), average_stats(i), Handedness::Right))
        .collect();
    let mut req = request(hitters);
    req.deadline_ms = Some(1);

    let started = Instant::now();
    let err = optimize(&req).unwrap_err();
    assert!(matches!(err, OptimizerError::Cancelled(1)));
    // Bounded slack: well under the full-search runtime.
    assert!(started.elapsed().as_secs() < 5);
}

// Relabeling: permuting the request's hitter order relabels the result.
#[test]
fn relabeled_hitters_produce_relabeled_lineups() {
    let hitters: Vec<Hitter> = (0..9)
        .map(|i| hitter(&format!("r{i}"), average_stats(i), Handedness::Right))
        .collect();
    let mut base_req = request(hitters.clone());
    base_req.top_n = 3;
    let base = optimize(&base_req).unwrap();

    let perm: [usize; 9] = [3, 1, 8, 0, 5, 2, 7, 4, 6];
    let shuffled: Vec<Hitter> = perm.iter().map(|&old| hitters[old].clone()).collect();
    let mut shuffled_req = request(shuffled);
    shuffled_req.top_n = 3;
    let relabeled = optimize(&shuffled_req).unwrap();

    for (a, b) in base.lineups.iter().zip(&relabeled.lineups) {
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        // Map the relabeled indices back to the original labels.
        let mapped: Vec<u8> = b.order.iter().map(|&idx| perm[idx as usize] as u8).collect();
        assert_eq!(&a.order[..], &mapped[..]);
    }
}

// Boundary: eight fixed slots leave a single candidate.
#[test]
fn eight_fixed_slots_return_the_single_candidate() {
    let hitters: Vec<Hitter> = (0..9)
        .map(|i| hitter(&format!("f{i}"), average_stats(i), Handedness::Right))
        .collect();
    let mut req = request(hitters);
    req.fixed = (0..8).map(|s| (s, 8 - s)).collect();
    req.top_n = 5;

    let ranked = optimize(&req).unwrap();
    assert_eq!(ranked.lineups.len(), 1);
    assert_eq!(ranked.lineups[0].order, [8, 7, 6, 5, 4, 3, 2, 1, 0]);
}
