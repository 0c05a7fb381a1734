//! Cross-backend equivalence
//!
//! Every scene is compiled to text, re-parsed, and interpreted by the
//! reference evaluator; the result must match the numeric backend at every
//! sample point, with parameters rendered both as identifiers and as
//! literals.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use ferm_math::NO_GEOMETRY;
use ferm_sdf::reference::{Bindings, Program};
use ferm_sdf::{
    ElementaryKind, MixerKind, Modifier, ModifierKind, Node, ParamStyle, ParamValue, Primitive,
    RecurseModifier, RecurseTarget, Scene, TransformMode,
};
use glam::{Quat, Vec2, Vec3};

fn grid() -> Vec<Vec3> {
    let axis = [-1.7, -0.35, 0.45, 1.2];
    let mut points = Vec::new();
    for x in axis {
        for y in axis {
            for z in axis {
                points.push(Vec3::new(x, y * 0.9, z * 1.1));
            }
        }
    }
    points
}

fn assert_close(expected: f32, got: f32, context: &str) {
    if expected.is_nan() {
        assert!(got.is_nan(), "{context}: expected NaN, got {got}");
        return;
    }
    let tolerance = 1e-4 * expected.abs().max(1.0);
    assert!(
        (expected - got).abs() <= tolerance,
        "{context}: numeric {expected} vs text {got}"
    );
}

fn check(scene: &Scene, label: &str) {
    let compiled = scene.compile().expect("scene compiles");
    let mut bindings = Bindings::new();
    scene.bind_parameters(&mut bindings);

    for style in [ParamStyle::Identifier, ParamStyle::Literal] {
        let program = Program::from_text(&compiled, style)
            .unwrap_or_else(|e| panic!("{label} ({style:?}): {e}"));
        for p in grid() {
            let expected = scene.evaluate(p);
            let got = program
                .evaluate(p, &bindings)
                .unwrap_or_else(|e| panic!("{label} ({style:?}) at {p}: {e}"));
            assert_close(expected, got, &format!("{label} ({style:?}) at {p}"));
        }
    }
}

fn placed(node: Node) -> Node {
    node.with_transform(
        Vec3::new(0.2, -0.1, 0.3),
        Quat::from_rotation_y(0.4),
        1.3,
    )
    .unwrap()
}

/// Copy of `node` with every float parameter of its own scaled by `factor`
fn scaled_params(node: &Node, factor: f32) -> Node {
    let mut out = node.clone();
    for param in node.own_params() {
        let value = match param.value() {
            ParamValue::Float(v) => ParamValue::Float(v * factor),
            ParamValue::Vector2(v) => ParamValue::Vector2(v * factor),
            ParamValue::Vector3(v) => ParamValue::Vector3(v * factor),
            other => other,
        };
        out.set_param(param.name(), value).unwrap();
    }
    out
}

#[test]
fn test_every_elementary_kind() {
    for kind in ElementaryKind::all() {
        let node = placed(Node::shape(kind));
        for factor in [1.0, 0.5, 1.5] {
            let scene = Scene::new(vec![scaled_params(&node, factor)]);
            check(&scene, &format!("{} x{factor}", kind.name()));
        }
    }
}

#[test]
fn test_every_modifier_kind() {
    for kind in ModifierKind::ALL {
        let node = placed(Node::shape(Primitive::Box)).with_modifier(Modifier::new(kind));
        check(&Scene::new(vec![node]), kind.name());
    }
}

fn stack() -> Vec<Modifier> {
    vec![
        Modifier::new(ModifierKind::Translate)
            .with("position", Vec3::new(0.3, -0.2, 0.1))
            .unwrap(),
        Modifier::new(ModifierKind::Rotate)
            .with("rotation", Quat::from_rotation_z(0.7))
            .unwrap(),
        Modifier::new(ModifierKind::ScaleUniform).with("scale", 0.8).unwrap(),
        Modifier::new(ModifierKind::Twist).with("Power", 0.6).unwrap(),
        Modifier::new(ModifierKind::Inflate).with("amount", 0.1).unwrap(),
        Modifier::new(ModifierKind::Wobble).with("amplitude", 0.02).unwrap(),
    ]
}

#[test]
fn test_modifier_stacks_and_transform_modes() {
    for mode in [
        TransformMode::ApplyBeforeModifiers,
        TransformMode::ApplyAfterModifiers,
        TransformMode::Ignore,
    ] {
        let mut node = placed(Node::shape(Primitive::Torus)).with_transform_mode(mode);
        for m in stack() {
            node = node.with_modifier(m);
        }
        check(&Scene::new(vec![node]), &format!("stack {mode:?}"));
    }
}

#[test]
fn test_disabled_modifier_is_skipped_by_both_backends() {
    let mut twist = Modifier::new(ModifierKind::Twist).with("Power", 3.0).unwrap();
    twist.enabled = false;
    let node = placed(Node::shape(Primitive::Box)).with_modifier(twist);
    let scene = Scene::new(vec![node]);
    check(&scene, "disabled twist");

    let plain = Scene::new(vec![placed(Node::shape(Primitive::Box))]);
    for p in grid() {
        assert_close(plain.evaluate(p), scene.evaluate(p), "disabled twist vs plain");
    }
}

fn recursed(target: RecurseTarget, iterations: i32) -> Node {
    let s = stack();
    Node::shape(Primitive::Sphere)
        .with_param("radius", 0.4)
        .unwrap()
        .with_modifier(s[0].clone())
        .with_modifier(s[1].clone())
        .with_recurse(RecurseModifier::new(target).with_iterations(iterations))
        .unwrap()
        .with_modifier(s[2].clone())
        .with_modifier(s[4].clone())
}

#[test]
fn test_recurse_targets() {
    for target in [RecurseTarget::All, RecurseTarget::Before, RecurseTarget::After] {
        for iterations in [0, 1, 3] {
            let scene = Scene::new(vec![recursed(target, iterations)]);
            check(&scene, &format!("recurse {target:?} x{iterations}"));
        }
    }
}

/// Twist and Wobble on the looped side of the recurse, so the post step
/// reads the recursed position
fn recursed_position_readers(target: RecurseTarget, iterations: i32) -> Node {
    let s = stack();
    let recurse = RecurseModifier::new(target).with_iterations(iterations);
    let sphere = Node::shape(Primitive::Sphere).with_param("radius", 0.4).unwrap();
    match target {
        RecurseTarget::Before => sphere
            .with_modifier(s[0].clone())
            .with_modifier(s[3].clone())
            .with_modifier(s[5].clone())
            .with_recurse(recurse)
            .unwrap()
            .with_modifier(s[2].clone()),
        RecurseTarget::After => sphere
            .with_modifier(s[4].clone())
            .with_recurse(recurse)
            .unwrap()
            .with_modifier(s[3].clone())
            .with_modifier(s[5].clone()),
        RecurseTarget::All => sphere
            .with_modifier(s[3].clone())
            .with_recurse(recurse)
            .unwrap()
            .with_modifier(s[5].clone()),
    }
}

#[test]
fn test_recurse_with_position_reading_post() {
    for target in [RecurseTarget::All, RecurseTarget::Before, RecurseTarget::After] {
        for iterations in [1, 3] {
            let node = recursed_position_readers(target, iterations);
            let scene = Scene::new(vec![node]);
            assert_eq!(scene.compile().unwrap().helpers.len(), 1, "{target:?}");
            check(&scene, &format!("wobble recurse {target:?} x{iterations}"));
        }
    }
}

#[test]
fn test_recurse_zero_iterations_is_pass_through() {
    let looped = Scene::new(vec![recursed(RecurseTarget::All, 0)]);
    let plain = Scene::new(vec![
        Node::shape(Primitive::Sphere).with_param("radius", 0.4).unwrap(),
    ]);
    for p in grid() {
        assert_close(plain.evaluate(p), looped.evaluate(p), "zero iterations");
    }
}

#[test]
fn test_recurse_applies_pre_exactly_n_times() {
    let step = Modifier::new(ModifierKind::Translate)
        .with("position", Vec3::new(0.5, 0.0, 0.0))
        .unwrap();
    let node = Node::shape(Primitive::Point)
        .with_transform_mode(TransformMode::Ignore)
        .with_modifier(step)
        .with_recurse(RecurseModifier::new(RecurseTarget::All).with_iterations(3))
        .unwrap();
    let scene = Scene::new(vec![node]);

    // Three shifts of 0.5 move the point to x = 1.5
    assert_close(0.0, scene.evaluate(Vec3::new(1.5, 0.0, 0.0)), "numeric");
    check(&scene, "translate x3");
}

#[test]
fn test_nested_mixers() {
    for outer in MixerKind::ALL {
        for inner in MixerKind::ALL {
            let leaves = vec![
                placed(Node::shape(Primitive::Sphere)),
                Node::shape(Primitive::Box).with_param("size", Vec3::new(0.5, 1.0, 0.7)).unwrap(),
                Node::shape(Primitive::Capsule),
            ];
            let inner_node = Node::mixer(inner, leaves).with_modifier(
                Modifier::new(ModifierKind::Translate)
                    .with("position", Vec3::new(0.1, 0.2, 0.0))
                    .unwrap(),
            );
            let root = Node::mixer(outer, vec![inner_node, Node::shape(Primitive::Torus)]);
            check(&Scene::new(vec![root]), &format!("{outer} over {inner}"));
        }
    }
}

#[test]
fn test_multiple_roots_and_nested_recurse() {
    let a = Node::mixer(
        MixerKind::UnionSmooth,
        vec![recursed(RecurseTarget::Before, 2), recursed(RecurseTarget::After, 2)],
    );
    let b = recursed(RecurseTarget::All, 1).with_transform_mode(TransformMode::ApplyAfterModifiers);
    let scene = Scene::new(vec![a, b]);
    assert_eq!(scene.compile().unwrap().helpers.len(), 3);
    check(&scene, "two roots");
}

fn sphere_at(x: f32) -> Node {
    Node::shape(Primitive::Sphere)
        .with_transform(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY, 1.0)
        .unwrap()
}

#[test]
fn test_union_fold_picks_minimum() {
    // Distances 2, 5 and 1 at the origin
    let root = Node::mixer(MixerKind::Union, vec![sphere_at(3.0), sphere_at(6.0), sphere_at(2.0)]);
    let scene = Scene::new(vec![root]);
    assert_close(1.0, scene.evaluate(Vec3::ZERO), "numeric union");

    let program = Program::from_text(&scene.compile().unwrap(), ParamStyle::Literal).unwrap();
    let got = program.evaluate(Vec3::ZERO, &Bindings::new()).unwrap();
    assert_close(1.0, got, "text union");
}

#[test]
fn test_smooth_union_associates_left_in_both_backends() {
    let children = vec![sphere_at(0.0), sphere_at(1.1), sphere_at(2.2)];
    let scene = Scene::new(vec![Node::mixer(MixerKind::UnionSmooth, children)]);
    check(&scene, "smooth union");

    let text = scene.compile().unwrap().render(ParamStyle::Identifier).unwrap();
    assert!(text.starts_with("SmoothUnion(SmoothUnion("), "{text}");
}

#[test]
fn test_empty_mixer_is_sentinel_in_both_backends() {
    let scene = Scene::new(vec![Node::mixer(MixerKind::Intersect, vec![])]);
    assert_close(NO_GEOMETRY, scene.evaluate(Vec3::ONE), "numeric");

    let compiled = scene.compile().unwrap();
    assert_eq!(compiled.render(ParamStyle::Literal).unwrap(), "1000000.0");
    check(&scene, "empty mixer");
}

#[test]
fn test_planar_kinds_with_custom_vectors() {
    let triangle = Node::shape(ElementaryKind::from(ferm_sdf::Primitive2D::Triangle))
        .with_param("point2", Vec2::new(1.5, 0.2))
        .unwrap();
    let julia = Node::shape(ferm_sdf::Fractal2D::Julia)
        .with_param("c", Vec2::new(0.285, 0.01))
        .unwrap();
    check(&Scene::new(vec![triangle]), "triangle");
    check(&Scene::new(vec![julia]), "julia");
}
