//! Scoring module - match points and star ratings
//!
//! Each match within one player action scores
//! `round(base * (1 + combo * combo_bonus_pct))` where `combo` counts the
//! matches already scored in that action. With the default base of 100 and
//! 25% bonus, a three-step cascade scores 100, 125, 150.

use crate::level::StarThresholds;

/// Points for one match at the given combo count (0 for the first match).
pub fn match_score(base: u32, combo: u32, combo_bonus_pct: f64) -> u32 {
    let gained = (f64::from(base) * (1.0 + f64::from(combo) * combo_bonus_pct)).round();
    gained.max(0.0) as u32
}

/// Star rating for a won level.
///
/// A win always earns at least one star; `one` is informational.
pub fn star_rating(score: u32, stars: &StarThresholds) -> u8 {
    if score >= stars.three {
        3
    } else if score >= stars.two {
        2
    } else {
        1
    }
}
