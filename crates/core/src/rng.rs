//! RNG module - injectable random sources
//!
//! All randomness in the engine (obstacle placement, color fill, refills and
//! forced shuffles) flows through the [`RandomSource`] trait so a session can be
//! replayed from a seed and tests can script exact outcomes.
//!
//! Provides a simple LCG for seeded play and a [`ScriptedRng`] for tests.

use crate::types::ColorId;

/// Source of randomness used by generation, refill and shuffle.
pub trait RandomSource {
    /// Generate next random u32
    fn next_u32(&mut self) -> u32;

    /// Generate random value in range [0, max). Returns 0 when `max == 0`.
    ///
    /// Uses the high bits of `next_u32` (multiply-shift), which are the
    /// well-mixed bits of an LCG.
    fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((u64::from(self.next_u32()) * u64::from(max)) >> 32) as u32
    }

    /// Uniform value in [0, 1) with 24 bits of precision.
    fn next_unit(&mut self) -> f64 {
        f64::from(self.next_u32() >> 8) / f64::from(1u32 << 24)
    }

    /// Draw a tile color from the weighted distribution.
    fn pick_color(&mut self, weights: &ColorWeights) -> ColorId {
        weights.sample(self.next_unit())
    }

    /// Shuffle a slice using Fisher-Yates
    fn shuffle<T>(&mut self, slice: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Current RNG state (for restarting a session with the same sequence)
    pub fn seed(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Per-color spawn weights.
///
/// The objective's target color weighs `1 + extra_spawn_rate`, every other
/// color weighs `1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorWeights {
    weights: Vec<f64>,
    total: f64,
}

impl ColorWeights {
    pub fn new(num_colors: u8, target: ColorId, extra_spawn_rate: f32) -> Self {
        let weights: Vec<f64> = (0..num_colors)
            .map(|c| {
                if c == target {
                    1.0 + f64::from(extra_spawn_rate)
                } else {
                    1.0
                }
            })
            .collect();
        let total = weights.iter().sum();
        Self { weights, total }
    }

    pub fn num_colors(&self) -> u8 {
        self.weights.len() as u8
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Relative weight of one color (its expected share of spawned tiles).
    pub fn share(&self, color: ColorId) -> f64 {
        match self.weights.get(color as usize) {
            Some(w) if self.total > 0.0 => w / self.total,
            _ => 0.0,
        }
    }

    /// Map a uniform `unit ∈ [0, 1)` to a color.
    ///
    /// Draws `r = unit * total` and walks the cumulative weights, picking the
    /// first bucket whose running sum exceeds `r`.
    pub fn sample(&self, unit: f64) -> ColorId {
        let r = unit * self.total;
        let mut acc = 0.0;
        for (i, w) in self.weights.iter().enumerate() {
            acc += w;
            if r < acc {
                return i as ColorId;
            }
        }
        // Float round-off at the top edge lands in the last bucket.
        self.weights.len().saturating_sub(1) as ColorId
    }
}

/// Deterministic random source for tests and replays.
///
/// `next_u32` cycles through `values` (or yields 0 when empty). When `colors`
/// is non-empty, `pick_color` cycles through it instead of sampling weights,
/// which lets a test dictate every refill exactly.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    values: Vec<u32>,
    colors: Vec<ColorId>,
    value_idx: usize,
    color_idx: usize,
}

impl ScriptedRng {
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Script the colors returned by successive `pick_color` calls.
    pub fn with_colors(mut self, colors: Vec<ColorId>) -> Self {
        self.colors = colors;
        self
    }

    /// How many scripted colors have been consumed.
    pub fn colors_drawn(&self) -> usize {
        self.color_idx
    }
}

impl RandomSource for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let v = self.values[self.value_idx % self.values.len()];
        self.value_idx += 1;
        v
    }

    fn pick_color(&mut self, weights: &ColorWeights) -> ColorId {
        if self.colors.is_empty() {
            return weights.sample(self.next_unit());
        }
        let c = self.colors[self.color_idx % self.colors.len()];
        self.color_idx += 1;
        c
    }
}
