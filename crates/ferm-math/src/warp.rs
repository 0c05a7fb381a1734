//! Position warps used by modifiers
//!
//! Pre-transforms map the incoming position into the space of the wrapped
//! shape; the few value transforms (`scale_distance`, `wobble`) correct the
//! returned distance afterwards.

use crate::vector::{elongate as elongate_vec, fold_offset, modulo, repeat};
use glam::{Quat, Vec2, Vec3};

/// Degrees of rotation per unit of travel along a twist or bend axis, at power 1.
const TURN_RATE: f32 = 36.0;

/// Map a world position into the local space of a shifted, rotated, uniformly
/// scaled shape.
pub fn inverse_transform(shift: Vec3, rotation: Quat, scale: f32, p: Vec3) -> Vec3 {
    rotation.normalize().inverse() * (p - shift) / scale
}

pub fn inverse_rotate(rotation: Quat, p: Vec3) -> Vec3 {
    rotation.normalize().inverse() * p
}

pub fn inverse_scale(scale: Vec3, p: Vec3) -> Vec3 {
    p / scale
}

/// Distance correction for a non-uniform scale.
pub fn scale_distance(scale: Vec3, value: f32) -> f32 {
    value * scale.min_element()
}

pub fn mirror(p: Vec3, normal: Vec3, offset: f32) -> Vec3 {
    fold_offset(p, normal, offset)
}

pub fn elongate(p: Vec3, amount: Vec3) -> Vec3 {
    elongate_vec(p, amount)
}

pub fn repeat_all(p: Vec3, cell: Vec3) -> Vec3 {
    Vec3::new(repeat(p.x, cell.x), repeat(p.y, cell.y), repeat(p.z, cell.z))
}

pub fn repeat_x(p: Vec3, cell: f32) -> Vec3 {
    Vec3::new(repeat(p.x, cell), p.y, p.z)
}

pub fn repeat_xz(p: Vec3, cell: Vec2) -> Vec3 {
    Vec3::new(repeat(p.x, cell.x), p.y, repeat(p.z, cell.y))
}

pub fn modulo_all(p: Vec3, cell: Vec3) -> Vec3 {
    Vec3::new(modulo(p.x, cell.x), modulo(p.y, cell.y), modulo(p.z, cell.z))
}

pub fn modulo_x(p: Vec3, cell: f32) -> Vec3 {
    Vec3::new(modulo(p.x, cell), p.y, p.z)
}

pub fn modulo_xz(p: Vec3, cell: Vec2) -> Vec3 {
    Vec3::new(modulo(p.x, cell.x), p.y, modulo(p.z, cell.y))
}

/// Rotate around `axis` by an angle proportional to the travel along it.
pub fn twist(p: Vec3, axis: Vec3, power: f32) -> Vec3 {
    let axis = axis.normalize_or_zero();
    let degrees = p.dot(axis) * power * TURN_RATE;
    Quat::from_axis_angle(axis, degrees.to_radians()) * p
}

/// Rotate around `axis` (made orthogonal to `direction`) by an angle
/// proportional to the travel along `direction`.
pub fn bend(p: Vec3, axis: Vec3, direction: Vec3, power: f32) -> Vec3 {
    let direction = direction.normalize_or_zero();
    let axis = axis.normalize_or_zero();
    let degrees = p.dot(direction) * power * TURN_RATE;
    let axis = (axis - direction.dot(axis) * direction).normalize_or_zero();
    Quat::from_axis_angle(axis, degrees.to_radians()) * p
}

pub fn shear(p: Vec3, xy: f32, xz: f32, yx: f32, yz: f32, zx: f32, zy: f32) -> Vec3 {
    Vec3::new(
        p.x + xy * p.y + xz * p.z,
        yx * p.x + p.y + yz * p.z,
        zx * p.x + zy * p.y + p.z,
    )
}

/// Sweep the half-plane around the orientation's Z axis, sampling along its X axis.
pub fn revolve(p: Vec3, orientation: Quat) -> Vec3 {
    let axis = orientation * Vec3::Z;
    let sample = orientation * Vec3::X;
    let along = p.dot(axis) * axis;
    (p - along).length() * sample + along
}

/// Additive cosine lattice displacement.
pub fn wobble(frequency: Vec3, amplitude: f32, p: Vec3) -> f32 {
    (frequency.x * p.x).cos() * (frequency.y * p.y).cos() * (frequency.z * p.z).cos() * amplitude
}
