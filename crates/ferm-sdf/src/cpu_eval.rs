//! Numeric backend: node tree → distance at a point
//!
//! Mirrors [`crate::codegen`] step for step. Every formula comes from
//! `ferm-math`, so the two backends can only disagree about composition.

use crate::modifier::ModifierKind;
use crate::node::{Node, NodeKind, TransformMode};
use ferm_math::NO_GEOMETRY;
use glam::Vec3;

/// Anything that can report a signed distance
pub trait Sdf: Send + Sync {
    /// Signed distance from `p` to the surface: negative inside, positive
    /// outside.
    fn distance(&self, p: Vec3) -> f32;
}

fn base_distance(node: &Node, p: Vec3) -> f32 {
    match &node.kind {
        NodeKind::Shape(kind) => kind.eval(p, node.own_params()),
        NodeKind::Mixer { kind, children } => kind.fold(
            children
                .iter()
                .filter(|c| c.enabled)
                .map(|c| distance(c, p)),
            node.own_params(),
        ),
    }
}

fn transformed(node: &Node, p: Vec3, f: impl FnOnce(Vec3) -> f32) -> f32 {
    match node.transform_params() {
        Some(t) => {
            let local = ModifierKind::Transform.pre(p, t);
            ModifierKind::Transform.post(f(local), p, t)
        }
        None => f(p),
    }
}

/// Distance of `node` at `p`. Never fails; conditional geometries may
/// produce non-finite values.
pub(crate) fn distance(node: &Node, p: Vec3) -> f32 {
    if !node.enabled {
        return NO_GEOMETRY;
    }

    let partition = node.modifiers.partition();
    let composed = |q: Vec3| {
        partition.evaluate(q, |r| {
            if node.transform_mode == TransformMode::ApplyBeforeModifiers {
                transformed(node, r, |s| base_distance(node, s))
            } else {
                base_distance(node, r)
            }
        })
    };

    if node.transform_mode == TransformMode::ApplyAfterModifiers {
        transformed(node, p, composed)
    } else {
        composed(p)
    }
}

impl Sdf for Node {
    fn distance(&self, p: Vec3) -> f32 {
        distance(self, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Primitive;
    use crate::mixer::MixerKind;
    use crate::modifier::Modifier;
    use crate::recurse::{RecurseModifier, RecurseTarget};
    use approx::assert_relative_eq;
    use glam::Quat;

    #[test]
    fn test_shape_transform() {
        let node = Node::shape(Primitive::Sphere)
            .with_transform(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY, 0.5)
            .unwrap();
        // Radius 1 scaled to 0.5, centred at x = 2
        assert_relative_eq!(node.distance(Vec3::new(3.0, 0.0, 0.0)), 0.5);
        assert_relative_eq!(node.distance(Vec3::new(2.0, 0.0, 0.0)), -0.5);
    }

    #[test]
    fn test_transform_mode_order() {
        let shift = Modifier::new(ModifierKind::Translate)
            .with("position", Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        let node = Node::shape(Primitive::Sphere)
            .with_transform(Vec3::ZERO, Quat::IDENTITY, 2.0)
            .unwrap()
            .with_modifier(shift);
        let p = Vec3::new(5.0, 0.0, 0.0);

        // Before: translate in world space, then scale: |5 - 1| - 2
        assert_relative_eq!(node.distance(p), 2.0);

        // After: scale first, then translate in scaled space: (|5/2 - 1| - 1) * 2
        let after = node.clone().with_transform_mode(TransformMode::ApplyAfterModifiers);
        assert_relative_eq!(after.distance(p), 1.0);

        let ignored = node.with_transform_mode(TransformMode::Ignore);
        assert_relative_eq!(ignored.distance(p), 3.0);
    }

    #[test]
    fn test_mixer_and_sentinel() {
        let a = Node::shape(Primitive::Sphere)
            .with_transform(Vec3::new(-2.0, 0.0, 0.0), Quat::IDENTITY, 1.0)
            .unwrap();
        let b = Node::shape(Primitive::Sphere)
            .with_transform(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY, 1.0)
            .unwrap();
        let union = Node::mixer(MixerKind::Union, vec![a, b]);
        assert_relative_eq!(union.distance(Vec3::new(4.0, 0.0, 0.0)), 1.0);

        let empty = Node::mixer(MixerKind::Union, vec![]);
        assert_relative_eq!(empty.distance(Vec3::ZERO), NO_GEOMETRY);

        let mut disabled = Node::shape(Primitive::Sphere);
        disabled.enabled = false;
        assert_relative_eq!(disabled.distance(Vec3::ZERO), NO_GEOMETRY);
    }

    #[test]
    fn test_recurse_before_keeps_outer_outside() {
        let step = Modifier::new(ModifierKind::Translate)
            .with("position", Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        let node = Node::shape(Primitive::Point)
            .with_modifier(step.clone())
            .with_recurse(RecurseModifier::new(RecurseTarget::Before).with_iterations(3))
            .unwrap()
            .with_modifier(step);

        // Outer translate once, targeted translate three times
        assert_relative_eq!(node.distance(Vec3::new(4.0, 0.0, 0.0)), 0.0);
        assert_relative_eq!(node.distance(Vec3::new(10.0, 0.0, 0.0)), 6.0);
    }
}
