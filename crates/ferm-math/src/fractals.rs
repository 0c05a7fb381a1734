//! Fractal distance estimators
//!
//! Iteration counts are always bounded by a parameter. Escape-time estimators
//! use the usual `0.5 * ln(r) * r / dr` bound; IFS estimators fold space and
//! rescale the distance afterwards.

use crate::shapes::tetrahedron;
use crate::vector::{cmul, flat, flat_distance, fold, fold_offset};
use glam::{Quat, Vec2, Vec3};
use std::f32::consts::PI;

/// Escape radius for the Mandelbulb iteration.
const BULB_BAILOUT: f32 = 10.0;

/// Squared escape radius for the 2D escape-time fractals.
const PLANE_BAILOUT: f32 = 1e5;

pub fn mandelbulb(p: Vec3, iterations: i32, power: f32) -> f32 {
    let mut z = p;
    let mut dr = 1.0;
    let mut r = 0.0;

    for _ in 0..iterations {
        r = z.length();
        if r > BULB_BAILOUT {
            break;
        }

        let theta = (z.y / r).acos() * power;
        let phi = (z.z.atan2(z.x) + PI / 4.0) * power;
        dr = r.powf(power - 1.0) * power * dr + 1.0;

        let zr = r.powf(power);
        z = zr * Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()) + p;
    }

    0.5 * r.ln() * r / dr
}

/// Koch snowflake generalised to a tetrahedron.
pub fn koch_tetrahedron(p: Vec3, iterations: i32) -> f32 {
    let s = 1.0 / 3.0;
    let turn = Quat::from_xyzw(0.0, 0.5, 0.0, 0.866_025_4);

    let mut z = p;
    let mut r = tetrahedron(z, 1.0);

    for n in 0..iterations.max(0) {
        z = fold(z, Vec3::new(0.36, 1.0, -0.61));
        z = fold(z, Vec3::new(0.36, 1.0, 0.61));
        z = fold(z, Vec3::new(-0.7, 1.0, 0.0));
        z = fold_offset(z, Vec3::NEG_Y, s);
        z = turn * (z * 2.0 + Vec3::new(0.0, s, 0.0));

        let child = 2f32.powi(-n - 1) * tetrahedron(z, 1.0);
        r = r.min(child);
    }
    r
}

pub fn sierpinski_tetrahedron(p: Vec3, iterations: i32) -> f32 {
    const SCALE: f32 = 2.0;
    const OFFSET: f32 = 3.0;

    let mut z = p;
    for _ in 0..iterations.max(0) {
        if z.x + z.y < 0.0 {
            z = Vec3::new(-z.y, -z.x, z.z);
        }
        if z.x + z.z < 0.0 {
            z = Vec3::new(-z.z, z.y, -z.x);
        }
        if z.y + z.z < 0.0 {
            z = Vec3::new(z.x, -z.z, -z.y);
        }
        z = z * SCALE - Vec3::splat(OFFSET * (SCALE - 1.0));
    }

    z.length() * SCALE.powi(-iterations.max(0))
}

/// Shared escape-time loop: returns `(|z|^2, |dz|^2)` on exit.
fn escape(mut z: Vec2, mut dz: Vec2, c: Vec2, iterations: i32, plus_one: bool) -> (f32, f32) {
    let mut m2 = 1.0;
    for _ in 0..iterations {
        dz = 2.0 * cmul(z, dz);
        if plus_one {
            dz.x += 1.0;
            dz.y += 1.0;
        }
        z = cmul(z, z) + c;
        m2 = z.length_squared();
        if m2 > PLANE_BAILOUT {
            break;
        }
    }
    (m2, dz.length_squared())
}

pub fn mandelbrot(p: Vec3, iterations: i32) -> f32 {
    let (m2, dz2) = escape(Vec2::ZERO, Vec2::ZERO, flat(p), iterations, true);
    flat_distance(p, (m2 / dz2).sqrt() * 0.5 * m2.ln())
}

/// Julia set of `z -> z^2 + c`, seeded with the planar position.
pub fn julia(p: Vec3, iterations: i32, c: Vec2) -> f32 {
    let (m2, dz2) = escape(flat(p), Vec2::X, c, iterations, false);
    flat_distance(p, (m2 / dz2).sqrt() * 0.5 * m2.ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandelbulb_far_point_is_positive() {
        let d = mandelbulb(Vec3::new(3.0, 0.1, 0.2), 8, 8.0);
        assert!(d > 0.5);
    }

    #[test]
    fn test_sierpinski_without_iterations_is_point_distance() {
        let d = sierpinski_tetrahedron(Vec3::new(0.0, 2.0, 0.0), 0);
        assert!((d - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_koch_never_exceeds_base_tetrahedron() {
        let p = Vec3::new(0.4, 0.9, -0.3);
        assert!(koch_tetrahedron(p, 4) <= tetrahedron(p, 1.0));
    }

    #[test]
    fn test_mandelbrot_outside_set_is_positive() {
        assert!(mandelbrot(Vec3::new(2.5, 0.0, 0.0), 20) > 0.0);
    }

    #[test]
    fn test_julia_is_symmetric_around_origin() {
        let c = Vec2::new(-0.4, 0.6);
        let a = julia(Vec3::new(1.2, 0.0, 0.3), 20, c);
        let b = julia(Vec3::new(-1.2, 0.0, -0.3), 20, c);
        assert!((a - b).abs() < 1e-4);
    }
}
