//! Binary distance combinators
//!
//! `a` is the accumulated (left) operand and `b` the next child. All smooth
//! variants take the blend radius `k`.

use crate::vector::{clamp, lerp};
use std::f32::consts::PI;

#[inline]
fn saturate(v: f32) -> f32 {
    clamp(v, 0.0, 1.0)
}

pub fn union(a: f32, b: f32) -> f32 {
    a.min(b)
}

pub fn intersect(a: f32, b: f32) -> f32 {
    a.max(b)
}

/// Carve `a` out of `b`.
pub fn difference(a: f32, b: f32) -> f32 {
    (-a).max(b)
}

pub fn smooth_union(a: f32, b: f32, k: f32) -> f32 {
    let h = saturate(0.5 + 0.5 * (b - a) / k);
    lerp(b, a, h) - k * h * (1.0 - h)
}

pub fn smooth_intersect(a: f32, b: f32, k: f32) -> f32 {
    let h = saturate(0.5 - 0.5 * (b - a) / k);
    lerp(b, a, h) + k * h * (1.0 - h)
}

pub fn smooth_difference(a: f32, b: f32, k: f32) -> f32 {
    let h = saturate(0.5 - 0.5 * (b + a) / k);
    lerp(b, -a, h) + k * h * (1.0 - h)
}

/// Smooth union whose blend weight is rippled by a sine.
pub fn deformed_mix(a: f32, b: f32, k: f32, frequency: f32, amplitude: f32, phase: f32) -> f32 {
    let h = saturate(0.5 + 0.5 * (b - a) / k);
    let h = h + amplitude * (h - h * h) * ((frequency * h * k + phase) * PI).sin();
    lerp(b, a, h) - k * h * (1.0 - h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hard_combinators() {
        assert_relative_eq!(union(1.0, 2.0), 1.0);
        assert_relative_eq!(intersect(1.0, 2.0), 2.0);
        assert_relative_eq!(difference(1.0, -2.0), -1.0);
    }

    #[test]
    fn test_smooth_union_far_apart_is_min() {
        assert_relative_eq!(smooth_union(0.0, 5.0, 0.5), 0.0);
        assert_relative_eq!(smooth_union(5.0, 0.0, 0.5), 0.0);
    }

    #[test]
    fn test_smooth_union_blends_equal_inputs() {
        // h = 0.5 gives a dip of k / 4
        assert_relative_eq!(smooth_union(1.0, 1.0, 0.4), 0.9);
    }

    #[test]
    fn test_deformed_mix_without_amplitude_matches_smooth_union() {
        let a = deformed_mix(0.2, 0.3, 0.5, 10.0, 0.0, 0.0);
        assert_relative_eq!(a, smooth_union(0.2, 0.3, 0.5));
    }
}
