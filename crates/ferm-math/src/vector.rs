//! Vector helpers shared by the distance estimators

use glam::{Vec2, Vec3};

/// Project a position onto the XZ plane.
#[inline]
pub fn flat(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Lift a 2D point into the XZ plane.
#[inline]
pub fn lift(v: Vec2) -> Vec3 {
    Vec3::new(v.x, 0.0, v.y)
}

/// Turn a planar distance into a 3D distance to a zero-thickness sheet at y = 0.
#[inline]
pub fn flat_distance(p: Vec3, planar: f32) -> f32 {
    Vec2::new(planar.max(0.0), p.y).length()
}

/// Unclamped linear interpolation (matches shader `lerp`).
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp that never panics on inverted bounds.
///
/// Bounds frequently come from user parameters, so `f32::clamp` (which asserts
/// `lo <= hi`) is not usable here.
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Fold `v` across the plane through the origin with (unnormalized) normal `n`,
/// only when `v` lies on the positive side.
pub fn fold(v: Vec3, n: Vec3) -> Vec3 {
    let x = 2.0 * v.dot(n) / n.length_squared();
    v - x.max(0.0) * n
}

/// Fold `v` across the plane with normal `n` at signed offset `d` from the origin.
pub fn fold_offset(v: Vec3, n: Vec3, d: f32) -> Vec3 {
    let n = n.normalize_or_zero();
    let x = 2.0 * (v - n * d).dot(n);
    v - x.max(0.0) * n
}

/// Wrap `v` into `[0, r)` (floor-based, continuous across zero).
#[inline]
pub fn repeat(v: f32, r: f32) -> f32 {
    v - (v / r).floor() * r
}

/// Truncated remainder folded to positive values.
#[inline]
pub fn modulo(v: f32, r: f32) -> f32 {
    (v % r).abs()
}

/// Remove the central `h` slab from `p` on every axis.
pub fn elongate(p: Vec3, h: Vec3) -> Vec3 {
    let half = h * 0.5;
    Vec3::new(
        p.x - clamp(p.x, -half.x, half.x),
        p.y - clamp(p.y, -half.y, half.y),
        p.z - clamp(p.z, -half.z, half.z),
    )
}

/// Complex multiplication of two vectors interpreted as `x + iy`.
#[inline]
pub fn cmul(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_repeat_wraps_negative_values() {
        assert_relative_eq!(repeat(-0.5, 2.0), 1.5);
        assert_relative_eq!(repeat(4.5, 2.0), 0.5);
    }

    #[test]
    fn test_modulo_is_symmetric() {
        assert_relative_eq!(modulo(-0.5, 2.0), 0.5);
        assert_relative_eq!(modulo(2.5, 2.0), 0.5);
    }

    #[test]
    fn test_fold_only_reflects_positive_side() {
        let n = Vec3::X;
        assert_eq!(fold(Vec3::new(-1.0, 2.0, 0.0), n), Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(fold(Vec3::new(1.0, 2.0, 0.0), n), Vec3::new(-1.0, 2.0, 0.0));
    }

    #[test]
    fn test_clamp_tolerates_inverted_bounds() {
        assert_relative_eq!(clamp(0.3, 1.0, -1.0), -1.0);
    }

    #[test]
    fn test_elongate_collapses_center() {
        let p = elongate(Vec3::new(0.2, 3.0, -0.4), Vec3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 2.0);
        assert_relative_eq!(p.z, -0.4);
    }
}
