//! 2D primitives living in the XZ plane
//!
//! Each function takes the full 3D position and returns the distance to a
//! zero-thickness sheet at `y = 0` shaped like the 2D primitive.

use crate::shapes::triangle as triangle3;
use crate::vector::{flat, flat_distance, lift};
use glam::{Vec2, Vec3};
use std::f32::consts::PI;

/// Rounded 2D rectangle centered at the origin.
pub fn quad(p: Vec2, size: Vec2, round: f32) -> f32 {
    (p.abs() - size * 0.5 + Vec2::splat(round)).max(Vec2::ZERO).length() - round
}

/// Segment from the origin along +X with the given length.
pub fn line(p: Vec2, length: f32) -> f32 {
    let l = Vec2::new(length, 0.0);
    quad(p - l * 0.5, l, 0.0)
}

pub fn circle(p: Vec3, radius: f32) -> f32 {
    flat_distance(p, flat(p).length() - radius)
}

/// Triangle spanned by three points of the XZ plane.
pub fn triangle(p: Vec3, a: Vec2, b: Vec2, c: Vec2) -> f32 {
    triangle3(p, lift(a), lift(b), lift(c))
}

pub fn rectangle(p: Vec3, size: Vec2, round: f32) -> f32 {
    flat_distance(p, quad(flat(p), size, round))
}

/// Angle of `q` relative to the nearest polygon edge normal.
fn sector_angle(q: Vec2, sides: i32) -> (f32, f32) {
    let ang = PI / sides as f32;
    let theta = (q.y.atan2(q.x) + PI) % (ang * 2.0) - ang;
    (ang, theta)
}

/// Regular polygon with circumradius `radius`.
pub fn polygon(p: Vec3, radius: f32, sides: i32) -> f32 {
    let q = flat(p);
    let (ang, theta) = sector_angle(q, sides);
    let d = q.length() * theta.cos() - radius * ang.cos();
    flat_distance(p, d)
}

/// Reuleaux-style polygon built from circular arcs.
pub fn rouleaux(p: Vec3, radius: f32, sides: i32) -> f32 {
    let q = flat(p);
    let (_, theta) = sector_angle(q, sides);
    let c = q.length() * Vec2::new(theta.cos(), theta.sin()) + Vec2::new(radius * 0.5, 0.0);
    flat_distance(p, c.length() - radius)
}

/// Archimedean spiral band clipped to a disc of `radius`.
pub fn spiral(p: Vec3, spacing: f32, thickness: f32, radius: f32) -> f32 {
    let q = flat(p);
    let theta = q.y.atan2(q.x);
    let r = (q.length() + spacing * theta / (2.0 * PI)) % spacing;
    let d = (r.min(spacing - r) - thickness * 0.5).max(q.length() - radius);
    flat_distance(p, d)
}

/// Circular sector with half-opening `angle` in degrees, symmetric around +X.
pub fn sector(p: Vec3, radius: f32, angle: f32) -> f32 {
    let q = flat(p);
    let angle = angle.to_radians();
    let theta = q.y.atan2(q.x).abs();

    let d = if theta < angle {
        q.length() - radius
    } else {
        let theta = theta - angle;
        line(q.length() * Vec2::new(theta.cos(), theta.sin()), radius)
    };
    flat_distance(p, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_circle_is_a_sheet() {
        assert_relative_eq!(circle(Vec3::new(0.2, 0.0, 0.0), 0.5), 0.0);
        assert_relative_eq!(circle(Vec3::new(0.0, 0.3, 0.0), 0.5), 0.3);
        assert_relative_eq!(circle(Vec3::new(1.0, 0.0, 0.0), 0.5), 0.5);
    }

    #[test]
    fn test_rectangle_edge() {
        let d = rectangle(Vec3::new(1.5, 0.0, 0.0), Vec2::ONE, 0.0);
        assert_relative_eq!(d, 1.0);
    }

    #[test]
    fn test_polygon_apothem() {
        // Square with circumradius sqrt(2): apothem 1 along the diagonals.
        let s = std::f32::consts::SQRT_2;
        let d = polygon(Vec3::new(-s, 0.0, -s), s, 4);
        assert_relative_eq!(d, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sector_outside_wedge_uses_edge() {
        let inside = sector(Vec3::new(0.25, 0.0, 0.0), 0.5, 45.0);
        assert_relative_eq!(inside, 0.0);
        let behind = sector(Vec3::new(-1.0, 0.0, 0.0), 0.5, 45.0);
        assert!(behind > 0.5);
    }

    #[test]
    fn test_line_endpoints() {
        assert_relative_eq!(line(Vec2::new(2.0, 0.0), 1.0), 1.0);
        assert_relative_eq!(line(Vec2::new(0.5, 0.5), 1.0), 0.5);
    }
}
