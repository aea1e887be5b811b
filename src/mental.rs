use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::holes::HoleAggregate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUpRate {
    pub opportunities: usize,
    pub successes: usize,
    /// Percent of opportunities converted; 0 with no opportunities.
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BogeyTrain {
    pub bogey_plus_holes: usize,
    /// Bogey-or-worse holes that directly follow another one in the same round.
    pub trains: usize,
    pub rate: f64,
}

/// How a player reacts to the previous hole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MentalIndicators {
    /// Par or better right after a bogey or worse.
    pub bounce_back: FollowUpRate,
    /// Birdie or better right after a birdie or better.
    pub gas_pedal: FollowUpRate,
    pub bogey_train: BogeyTrain,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn is_bogey_plus(hole: &HoleAggregate) -> bool {
    hole.score_vs_par >= 1
}

fn is_birdie_plus(hole: &HoleAggregate) -> bool {
    hole.score_vs_par <= -1
}

/// Each hole paired with the next one played in the same round (by hole
/// number). The last hole of a round opens no pair.
fn consecutive_pairs(holes: &[HoleAggregate]) -> Vec<(&HoleAggregate, &HoleAggregate)> {
    let mut by_round: BTreeMap<&str, Vec<&HoleAggregate>> = BTreeMap::new();
    for hole in holes {
        by_round.entry(hole.round_id.as_str()).or_default().push(hole);
    }
    by_round
        .into_values()
        .flat_map(|mut round| {
            round.sort_by_key(|h| h.hole);
            round.windows(2).map(|w| (w[0], w[1])).collect::<Vec<_>>()
        })
        .collect()
}

fn follow_up_rate(
    pairs: &[(&HoleAggregate, &HoleAggregate)],
    opens: fn(&HoleAggregate) -> bool,
    converts: fn(&HoleAggregate) -> bool,
) -> FollowUpRate {
    let opportunities = pairs.iter().filter(|(prev, _)| opens(prev)).count();
    let successes = pairs
        .iter()
        .filter(|(prev, next)| opens(prev) && converts(next))
        .count();
    FollowUpRate {
        opportunities,
        successes,
        rate: percent(successes, opportunities),
    }
}

/// Bounce-back, gas-pedal and bogey-train rates over scored holes, judged
/// against each hole's own par.
pub fn mental_indicators(holes: &[HoleAggregate]) -> MentalIndicators {
    let pairs = consecutive_pairs(holes);

    let bogey_plus_holes = holes.iter().filter(|h| is_bogey_plus(h)).count();
    let trains = pairs
        .iter()
        .filter(|(prev, next)| is_bogey_plus(prev) && is_bogey_plus(next))
        .count();

    MentalIndicators {
        bounce_back: follow_up_rate(&pairs, is_bogey_plus, |h| h.score_vs_par <= 0),
        gas_pedal: follow_up_rate(&pairs, is_birdie_plus, is_birdie_plus),
        bogey_train: BogeyTrain {
            bogey_plus_holes,
            trains,
            rate: percent(trains, bogey_plus_holes),
        },
    }
}
