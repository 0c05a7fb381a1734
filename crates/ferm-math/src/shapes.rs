//! Closed-form 3D primitives
//!
//! All primitives are centered at the origin; sizes are full extents unless a
//! parameter is explicitly named a radius.

use crate::vector::{clamp, elongate, flat, fold};
use glam::{Vec2, Vec3};

pub fn sphere(p: Vec3, radius: f32) -> f32 {
    p.length() - radius
}

/// Axis-aligned box with full extents `size`.
pub fn cuboid(p: Vec3, size: Vec3) -> f32 {
    let d = p.abs() - size * 0.5;
    d.max(Vec3::ZERO).length() + d.max_element().min(0.0)
}

pub fn rounded_box(p: Vec3, size: Vec3, round: f32) -> f32 {
    let d = p.abs() - size * 0.5 + Vec3::splat(round);
    d.max(Vec3::ZERO).length() - round
}

/// Torus in the XZ plane, `r = (major, minor)`.
pub fn torus(p: Vec3, r: Vec2) -> f32 {
    Vec2::new(flat(p).length() - r.x, p.y).length() - r.y
}

/// Horizontal slab of half-thickness `thickness`.
pub fn plane(p: Vec3, thickness: f32) -> f32 {
    p.y.abs() - thickness
}

/// Y-aligned cylinder, `rh = (radius, half height)`.
pub fn cylinder(p: Vec3, rh: Vec2) -> f32 {
    let d = Vec2::new(flat(p).length(), p.y).abs() - rh;
    d.max_element().min(0.0) + d.max(Vec2::ZERO).length()
}

pub fn infinite_cylinder(p: Vec3, radius: f32) -> f32 {
    flat(p).length() - radius
}

/// Y-aligned capsule whose total height (caps included) is `height`.
pub fn capsule(p: Vec3, height: f32, radius: f32) -> f32 {
    let h = (height - 2.0 * radius) * 0.5;
    let y = p.y - clamp(p.y, -h, h);
    Vec3::new(p.x, y, p.z).length() - radius
}

pub fn infinite_pyramid(p: Vec3, slope: Vec2) -> f32 {
    let xn = Vec3::new(slope.x, 1.0, 0.0).normalize_or_zero();
    let yn = Vec3::new(0.0, 1.0, slope.y).normalize_or_zero();
    let q = Vec3::new(p.x.abs(), p.y, p.z.abs());
    xn.dot(q).max(yn.dot(q))
}

pub fn pyramid(p: Vec3, slope: Vec2, height: f32) -> f32 {
    infinite_pyramid(p, slope).max(-height - p.y)
}

pub fn infinite_pipe(p: Vec3, inner: f32, outer: f32) -> f32 {
    let r = flat(p).length();
    ((2.0 * r - inner - outer).abs() + inner - outer) * 0.5
}

pub fn pipe(p: Vec3, inner: f32, outer: f32, length: f32) -> f32 {
    let r = flat(p).length();
    let y = p.y.abs() - length * 0.5;

    if y < 0.0 {
        infinite_pipe(p, inner, outer)
    } else if r > outer {
        Vec2::new(r - outer, y).length()
    } else if r < inner {
        Vec2::new(inner - r, y).length()
    } else {
        y
    }
}

pub fn octahedron(p: Vec3, size: f32) -> f32 {
    let p = p.abs();
    let m = p.x + p.y + p.z - size;

    let q = if 3.0 * p.x < m {
        p
    } else if 3.0 * p.y < m {
        Vec3::new(p.y, p.z, p.x)
    } else if 3.0 * p.z < m {
        Vec3::new(p.z, p.x, p.y)
    } else {
        return m * 0.57735027; // 1/sqrt(3)
    };

    let k = clamp(0.5 * (q.z - q.y + size), 0.0, size);
    Vec3::new(q.x, q.y - size + k, q.z - k).length()
}

pub fn hex_prism(p: Vec3, size: f32, height: f32) -> f32 {
    let q = p.abs();
    (q.y - height * 0.5).max((q.z * 0.866025 + q.x * 0.5).max(q.x) - size)
}

pub fn tri_prism(p: Vec3, size: f32, height: f32) -> f32 {
    let q = p.abs();
    (q.y - height * 0.5).max((q.x * 0.866025 + p.z * 0.5).max(-p.z) - size * 0.5)
}

/// Unsigned distance to the triangle `abc`.
pub fn triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let ba = b - a;
    let pa = p - a;
    let cb = c - b;
    let pb = p - b;
    let ac = a - c;
    let pc = p - c;
    let nor = ba.cross(ac);

    let sides = ba.cross(nor).dot(pa).signum()
        + cb.cross(nor).dot(pb).signum()
        + ac.cross(nor).dot(pc).signum();

    let d2 = if sides < 2.0 {
        let edge = |e: Vec3, q: Vec3| (e * (e.dot(q) / e.length_squared()).clamp(0.0, 1.0) - q).length_squared();
        edge(ba, pa).min(edge(cb, pb)).min(edge(ac, pc))
    } else {
        nor.dot(pa) * nor.dot(pa) / nor.length_squared()
    };
    d2.sqrt()
}

/// Regular tetrahedron, built by folding space onto one face.
pub fn tetrahedron(p: Vec3, size: f32) -> f32 {
    let mut q = p / size;
    q = fold(q, Vec3::new(0.37, 1.0, 0.622));
    q = fold(q, Vec3::new(0.37, 1.0, -0.622));
    q = fold(q, Vec3::new(-1.0, 1.414, 0.0));

    let v1 = Vec3::new(0.9428, -0.3333, 0.0);
    let v2 = Vec3::new(-0.4714, -0.3333, 0.8165);
    let v3 = Vec3::new(-0.4714, -0.3333, -0.8165);

    triangle(q, v1, v2, v3) * size
}

pub fn rounded_cylinder(p: Vec3, radius: f32, smooth: f32, length: f32) -> f32 {
    let d = Vec2::new(
        flat(p).length() - radius + smooth,
        p.y.abs() - length * 0.5 + smooth,
    );
    d.max_element().min(0.0) + d.max(Vec2::ZERO).length() - smooth
}

pub fn infinite_cone(p: Vec3, slope: f32) -> f32 {
    let c = Vec2::new(slope, 1.0).normalize_or_zero();
    c.dot(Vec2::new(flat(p).length(), p.y))
}

pub fn cone(p: Vec3, slope: f32, length: f32) -> f32 {
    infinite_cone(p, slope).max(-length - p.y)
}

/// Cone frustum between bottom radius `r1` and top radius `r2`.
pub fn capped_cone(p: Vec3, r1: f32, r2: f32, height: f32) -> f32 {
    let q = Vec2::new(flat(p).length(), p.y);
    let k1 = Vec2::new(r2, height * 0.5);
    let k2 = Vec2::new(r2 - r1, height);

    let cap = if q.y < 0.0 { r1 } else { r2 };
    let ca = Vec2::new(q.x - q.x.min(cap), q.y.abs() - height * 0.5);
    let t = ((k1 - q).dot(k2) / k2.length_squared()).clamp(0.0, 1.0);
    let cb = q - k1 + k2 * t;

    let s = if cb.x < 0.0 && ca.y < 0.0 { -1.0 } else { 1.0 };
    s * ca.length_squared().min(cb.length_squared()).sqrt()
}

pub fn rounded_cone(p: Vec3, r1: f32, r2: f32, height: f32) -> f32 {
    let q = Vec2::new(flat(p).length(), p.y);
    let h = height * 0.5;

    let b = (r1 - r2) / h;
    let a = (1.0 - b * b).sqrt();
    let k = q.dot(Vec2::new(-b, a));

    if k < 0.0 {
        q.length() - r1
    } else if k > a * h {
        (q - Vec2::new(0.0, h)).length() - r2
    } else {
        q.dot(Vec2::new(a, b)) - r1
    }
}

/// Bound (not exact) ellipsoid estimate.
pub fn ellipsoid(p: Vec3, radii: Vec3) -> f32 {
    let k0 = (p / radii).length();
    let k1 = (p / (radii * radii)).length();
    k0 * (k0 - 1.0) / k1
}

pub fn arch(p: Vec3, size: Vec3, radius: f32, height: f32) -> f32 {
    let shifted = p - Vec3::new(0.0, (height - size.y) * 0.5, 0.0);
    let span = Vec3::new(0.0, height, size.z);
    (-sphere(elongate(shifted, span), radius)).max(cuboid(p, size))
}
