//! Host-side probing and ray casting
//!
//! A [`Caster`] places a distance field in the world with its own shift,
//! rotation and uniform scale, then answers distance, normal and ray queries
//! against it on the CPU. It works with any [`Sdf`], usually a
//! [`crate::Scene`].

use crate::cpu_eval::Sdf;
use ferm_math::warp;
use glam::{Quat, Vec3};

/// Default cut-off length of a cast
pub const DEFAULT_MAX_DISTANCE: f32 = 1e3;

/// Sphere-tracing settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchSettings {
    pub max_steps: u32,
    /// Hit threshold; scaled by the travelled length when requested
    pub stop_distance: f32,
    /// Step multiplier; below 1 steps more carefully through weak estimates
    pub oversample: f32,
}

impl MarchSettings {
    /// Settings from the renderer's three quality dials.
    ///
    /// Each dial is a power of ten: `quality` tightens the stop distance and
    /// adds steps, `cutoff` adds steps, `oversample` shortens each step and
    /// adds steps to compensate.
    pub fn from_quality(quality: f32, cutoff: f32, oversample: f32) -> Self {
        let ln10 = std::f32::consts::LN_10;
        let steps = (ln10 * (2.5 + 0.4 * quality + cutoff + oversample)).exp().ceil();
        Self {
            max_steps: steps.max(1.0) as u32,
            stop_distance: (-ln10 * (3.0 + quality)).exp(),
            oversample: (-ln10 * oversample).exp(),
        }
    }
}

impl Default for MarchSettings {
    fn default() -> Self {
        Self::from_quality(0.0, 0.0, 0.0)
    }
}

/// Outcome of one cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastResult {
    pub hit: bool,
    /// Ran out of steps before hitting or passing the max distance
    pub cutoff: bool,
    pub total_length: f32,
    pub total_steps: u32,
    /// Hit point; the ray origin on a miss
    pub point: Vec3,
    /// Surface normal at the hit; the reversed ray direction on a miss
    pub normal: Vec3,
    /// Travelled length at the hit
    pub distance: f32,
    /// Smallest distance estimate seen along the ray
    pub shortest_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Caster {
    pub shift: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub settings: MarchSettings,
}

impl Default for Caster {
    fn default() -> Self {
        Self::new(MarchSettings::default())
    }
}

impl Caster {
    pub fn new(settings: MarchSettings) -> Self {
        Self {
            shift: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            settings,
        }
    }

    pub fn with_transform(mut self, shift: Vec3, rotation: Quat, scale: f32) -> Self {
        self.set_transform(shift, rotation, scale);
        self
    }

    pub fn set_transform(&mut self, shift: Vec3, rotation: Quat, scale: f32) {
        self.shift = shift;
        self.rotation = rotation;
        self.scale = scale;
    }

    /// World-space distance to the field.
    pub fn probe<S: Sdf + ?Sized>(&self, sdf: &S, world: Vec3) -> f32 {
        let local = warp::inverse_transform(self.shift, self.rotation, self.scale, world);
        sdf.distance(local) * self.scale
    }

    /// Central-difference normal with total spacing `spacing`.
    pub fn normal<S: Sdf + ?Sized>(&self, sdf: &S, world: Vec3, spacing: f32) -> Vec3 {
        let h = spacing / 2.0;
        let axis = |e: Vec3| self.probe(sdf, world + h * e) - self.probe(sdf, world - h * e);
        Vec3::new(axis(Vec3::X), axis(Vec3::Y), axis(Vec3::Z)).normalize_or_zero()
    }

    /// Cast with the caster's settings and a stop distance that grows with
    /// the travelled length.
    pub fn cast<S: Sdf + ?Sized>(&self, sdf: &S, origin: Vec3, direction: Vec3) -> CastResult {
        self.march(sdf, origin, direction, DEFAULT_MAX_DISTANCE, true)
    }

    pub fn march<S: Sdf + ?Sized>(
        &self,
        sdf: &S,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        scale_stop: bool,
    ) -> CastResult {
        let direction = direction.normalize_or_zero();
        let mut result = CastResult {
            hit: false,
            cutoff: true,
            total_length: 0.0,
            total_steps: 0,
            point: origin,
            normal: -direction,
            distance: 0.0,
            shortest_distance: f32::INFINITY,
        };

        let mut sample = origin;
        for _ in 0..self.settings.max_steps {
            let d = self.probe(sdf, sample);
            result.total_steps += 1;
            result.shortest_distance = result.shortest_distance.min(d);

            let stop = if scale_stop {
                self.settings.stop_distance * result.total_length
            } else {
                self.settings.stop_distance
            };

            // The hit is the sample that passed the test, not one step beyond
            if d < stop {
                result.hit = true;
                result.cutoff = false;
                result.distance = result.total_length;
                result.point = sample;
                result.normal = self.normal(sdf, sample, stop);
                break;
            }

            let step = d * self.settings.oversample;
            result.total_length += step;
            if result.total_length > max_distance {
                result.cutoff = false;
                break;
            }
            sample += step * direction;
        }

        tracing::trace!(
            "cast: hit={} steps={} length={}",
            result.hit,
            result.total_steps,
            result.total_length
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Scene;
    use crate::library::Primitive;
    use crate::node::Node;
    use approx::assert_relative_eq;

    fn unit_sphere() -> Scene {
        Scene::new(vec![Node::shape(Primitive::Sphere)])
    }

    #[test]
    fn test_default_settings() {
        let s = MarchSettings::default();
        assert_eq!(s.max_steps, 317);
        assert_relative_eq!(s.stop_distance, 1e-3, max_relative = 1e-5);
        assert_relative_eq!(s.oversample, 1.0, max_relative = 1e-6);

        let fine = MarchSettings::from_quality(1.0, 0.0, 0.0);
        assert!(fine.max_steps > s.max_steps);
        assert!(fine.stop_distance < s.stop_distance);
    }

    #[test]
    fn test_probe_applies_transform() {
        let scene = unit_sphere();
        let caster = Caster::default().with_transform(Vec3::new(10.0, 0.0, 0.0), Quat::IDENTITY, 2.0);
        assert_relative_eq!(caster.probe(&scene, Vec3::new(14.0, 0.0, 0.0)), 2.0);
        assert_relative_eq!(caster.probe(&scene, Vec3::new(10.0, 0.0, 0.0)), -2.0);
    }

    #[test]
    fn test_cast_hits_sphere_at_analytic_distance() {
        let scene = unit_sphere();
        let caster = Caster::default();
        let r = caster.cast(&scene, Vec3::new(-5.0, 0.0, 0.0), Vec3::X);

        assert!(r.hit);
        assert!(!r.cutoff);
        assert_relative_eq!(r.distance, 4.0, epsilon = 1e-3);
        assert_relative_eq!(r.point.x, -1.0, epsilon = 1e-3);
        assert_relative_eq!(r.normal.x, -1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_hit_point_is_the_sample_before_the_last_step() {
        let scene = unit_sphere();
        // Half-length steps never reach the surface exactly
        let caster = Caster::new(MarchSettings::from_quality(0.0, 0.0, 0.30103));
        assert_relative_eq!(caster.settings.oversample, 0.5, max_relative = 1e-4);

        let r = caster.cast(&scene, Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(r.hit);
        let d = caster.probe(&scene, r.point);
        assert!(d >= 0.0, "hit point is inside the surface: {d}");
        assert!(d < caster.settings.stop_distance * r.distance);
        assert_relative_eq!(r.point.x, -5.0 + r.distance, epsilon = 1e-4);
        assert!(r.distance <= 4.0 + 1e-5);
    }

    #[test]
    fn test_cast_miss_reports_closest_approach() {
        let scene = unit_sphere();
        let r = Caster::default().cast(&scene, Vec3::new(-5.0, 2.0, 0.0), Vec3::Y);

        assert!(!r.hit);
        assert!(!r.cutoff);
        assert!(r.total_length > DEFAULT_MAX_DISTANCE);
        // The ray moves away from the sphere, so its start is the closest approach
        assert_relative_eq!(r.shortest_distance, 5.0_f32.hypot(2.0) - 1.0, epsilon = 1e-4);
        assert_eq!(r.normal, -Vec3::Y);
    }

    #[test]
    fn test_cutoff_when_steps_run_out() {
        let scene = unit_sphere();
        let caster = Caster::new(MarchSettings {
            max_steps: 2,
            ..MarchSettings::default()
        });
        let r = caster.cast(&scene, Vec3::new(0.0, 0.0, -100.0), Vec3::new(1.0, 0.0, 0.1));
        assert!(!r.hit);
        assert!(r.cutoff);
        assert_eq!(r.total_steps, 2);
    }
}
