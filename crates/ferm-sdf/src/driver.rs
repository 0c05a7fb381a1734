//! Dual backend driver
//!
//! Entry points shared by hosts: identifier layout, compilation to text,
//! numeric evaluation and per-tick parameter binding. A [`Scene`] holds a
//! list of root nodes combined by union, the way a renderer combines every
//! root it draws.

use crate::codegen::{self, Compiled, Helper};
use crate::cpu_eval::{self, Sdf};
use crate::error::CompileError;
use crate::expr::Expr;
use crate::geometry::Geometry;
use crate::mixer::MixerKind;
use crate::node::{IdCounter, Node};
use crate::param::ParameterSink;
use glam::Vec3;
use rayon::prelude::*;

/// Lay out identifiers over every root: `parNN` for active parameters and
/// `hlpNN` for active recurse modifiers, both counted tree-wide.
pub fn assign_identifiers(roots: &mut [Node]) {
    let mut total = IdCounter::default();
    for root in roots.iter() {
        root.count_active(&mut total);
    }

    let mut next = IdCounter::default();
    for root in roots.iter_mut() {
        root.assign_ids(true, &mut next, &total);
    }
    tracing::debug!(
        "assigned {} parameter and {} helper identifiers",
        total.params,
        total.helpers
    );
}

fn ensure_resolved(expression: &Expr, helpers: &[Helper]) -> Result<(), CompileError> {
    expression.ensure_resolved()?;
    for helper in helpers {
        helper.input.ensure_resolved()?;
        helper.body.ensure_resolved()?;
        helper.output.ensure_resolved()?;
    }
    Ok(())
}

/// Compile one root to a fully substituted expression plus its helpers.
///
/// Only `@pos` remains unresolved in the result. Identifiers must have been
/// assigned (see [`assign_identifiers`]) for identifier-style rendering and
/// for recurse helpers.
pub fn compile(node: &Node) -> Result<Compiled, CompileError> {
    let mut helpers = Vec::new();
    let expression = codegen::expression(node, &mut helpers)
        .and_then(|e| ensure_resolved(&e, &helpers).map(|()| e))
        .inspect_err(|e| tracing::error!("compile failed: {e}"))?;

    let mut parameters = Vec::new();
    node.visit_active_params(&mut |p| parameters.push(p.clone()));
    let compiled = Compiled {
        expression,
        helpers,
        parameters,
        geometry: node.geometry(),
    };
    tracing::debug!(
        "compiled node: {} parameters, {} helpers, geometry {}",
        compiled.parameters.len(),
        compiled.helpers.len(),
        compiled.geometry
    );
    Ok(compiled)
}

/// Numeric distance of one root at `p`.
pub fn evaluate(node: &Node, p: Vec3) -> f32 {
    cpu_eval::distance(node, p)
}

/// Emit `(identifier, type, value)` for every active parameter that has an
/// identifier.
pub fn bind_parameters(roots: &[Node], sink: &mut impl ParameterSink) {
    let mut bound = 0usize;
    for root in roots {
        root.visit_active_params(&mut |p| {
            if let Some(id) = p.id() {
                sink.bind(id, p.param_type(), p.value());
                bound += 1;
            }
        });
    }
    tracing::trace!("bound {bound} parameters");
}

/// Root nodes combined by union
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    roots: Vec<Node>,
}

impl Scene {
    pub fn new(roots: Vec<Node>) -> Self {
        let mut scene = Self { roots };
        assign_identifiers(&mut scene.roots);
        scene
    }

    pub fn with_root(mut self, root: Node) -> Self {
        self.push(root);
        self
    }

    pub fn push(&mut self, root: Node) {
        self.roots.push(root);
        assign_identifiers(&mut self.roots);
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    /// Mutate the roots; identifiers are re-assigned afterwards.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut Vec<Node>) -> R) -> R {
        let out = f(&mut self.roots);
        assign_identifiers(&mut self.roots);
        out
    }

    /// Compile every enabled root and union them into one expression.
    pub fn compile(&self) -> Result<Compiled, CompileError> {
        let mut expressions = Vec::new();
        let mut helpers = Vec::new();
        let mut parameters = Vec::new();

        for root in self.roots.iter().filter(|r| r.enabled) {
            let compiled = compile(root)?;
            expressions.push(compiled.expression);
            helpers.extend(compiled.helpers);
            parameters.extend(compiled.parameters);
        }

        Ok(Compiled {
            expression: MixerKind::Union.fold_text(expressions, &[])?,
            helpers,
            parameters,
            geometry: self.geometry(),
        })
    }

    pub fn evaluate(&self, p: Vec3) -> f32 {
        MixerKind::Union.fold(
            self.roots
                .iter()
                .filter(|r| r.enabled)
                .map(|r| evaluate(r, p)),
            &[],
        )
    }

    /// Sample many positions in parallel.
    pub fn evaluate_many(&self, points: &[Vec3]) -> Vec<f32> {
        points.par_iter().map(|&p| self.evaluate(p)).collect()
    }

    pub fn bind_parameters(&self, sink: &mut impl ParameterSink) {
        bind_parameters(&self.roots, sink);
    }

    pub fn geometry(&self) -> Geometry {
        MixerKind::Union.fold_geometry(
            self.roots
                .iter()
                .filter(|r| r.enabled)
                .map(Node::geometry),
        )
    }
}

impl Sdf for Scene {
    fn distance(&self, p: Vec3) -> f32 {
        self.evaluate(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ParamStyle;
    use crate::library::Primitive;
    use crate::modifier::{Modifier, ModifierKind};
    use crate::node::TransformMode;
    use crate::param::{ParamType, ParamValue};
    use crate::recurse::{RecurseModifier, RecurseTarget};
    use approx::assert_relative_eq;
    use glam::Quat;

    fn ids(node: &Node) -> Vec<String> {
        let mut out = Vec::new();
        node.visit_active_params(&mut |p| out.extend(p.id().map(str::to_string)));
        out
    }

    #[test]
    fn test_identifiers_are_tree_wide_and_padded() {
        let a = Node::shape(Primitive::Sphere);
        let b = Node::shape(Primitive::Torus).with_modifier(Modifier::new(ModifierKind::Translate));
        let scene = Scene::new(vec![Node::mixer(MixerKind::Union, vec![a, b])]);

        // Sphere: 1 + 3 transform; Torus: 2 + 3 transform; Translate: 1
        let names = ids(&scene.roots()[0]);
        assert_eq!(names.len(), 10);
        // Ten slots fit in one digit
        assert_eq!(names[0], "par0");
        assert_eq!(names[9], "par9");

        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, names);
    }

    #[test]
    fn test_disabled_entries_lose_identifiers() {
        let mut translate = Modifier::new(ModifierKind::Translate);
        translate.enabled = false;
        let mut scene = Scene::new(vec![Node::shape(Primitive::Sphere).with_modifier(translate)]);
        assert_eq!(ids(&scene.roots()[0]).len(), 4);

        scene.edit(|roots| {
            if let Some(m) = roots[0].modifiers_mut().modifier_mut(0) {
                m.enabled = true;
            }
        });
        assert_eq!(ids(&scene.roots()[0]).len(), 5);
    }

    #[test]
    fn test_helper_names_follow_recurse_count() {
        let recursed = || {
            Node::shape(Primitive::Sphere)
                .with_modifier(Modifier::new(ModifierKind::Translate))
                .with_recurse(RecurseModifier::new(RecurseTarget::All))
                .unwrap()
        };
        let scene = Scene::new(vec![recursed(), recursed()]);
        let names: Vec<_> = scene
            .roots()
            .iter()
            .filter_map(|r| r.modifiers().recurse().and_then(RecurseModifier::helper_name))
            .collect();
        assert_eq!(names, ["hlp0", "hlp1"]);

        let compiled = scene.compile().unwrap();
        assert_eq!(compiled.helpers.len(), 2);
        assert_eq!(
            compiled.render(ParamStyle::Identifier).unwrap(),
            "Union(hlp0(@pos), hlp1(@pos))"
        );
    }

    #[test]
    fn test_compile_renders_identifiers() {
        let scene = Scene::new(vec![
            Node::shape(Primitive::Sphere).with_transform_mode(TransformMode::Ignore),
        ]);
        let compiled = scene.compile().unwrap();
        assert_eq!(compiled.render(ParamStyle::Identifier).unwrap(), "Sphere(@pos, par0)");
        assert_eq!(compiled.parameters.len(), 4);
        assert!(compiled.declarations().starts_with("float par0;\n"));
        assert_eq!(compiled.geometry, Geometry::Exact);
    }

    #[test]
    fn test_bind_parameters_reports_every_active_slot() {
        let scene = Scene::new(vec![Node::shape(Primitive::Sphere).with_param("radius", 2.5).unwrap()]);
        let mut seen = Vec::new();
        scene.bind_parameters(&mut |id: &str, ty: ParamType, value: ParamValue| {
            seen.push((id.to_string(), ty, value));
        });
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], ("par0".to_string(), ParamType::Float, ParamValue::Float(2.5)));
        assert_eq!(seen[2].1, ParamType::Quaternion);
    }

    #[test]
    fn test_scene_union_and_parallel_sampling() {
        let left = Node::shape(Primitive::Sphere)
            .with_transform(Vec3::new(-3.0, 0.0, 0.0), Quat::IDENTITY, 1.0)
            .unwrap();
        let right = Node::shape(Primitive::Sphere)
            .with_transform(Vec3::new(3.0, 0.0, 0.0), Quat::IDENTITY, 1.0)
            .unwrap();
        let scene = Scene::new(vec![left, right]);

        let points = [Vec3::ZERO, Vec3::new(-3.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)];
        let many = scene.evaluate_many(&points);
        assert_eq!(many.len(), 3);
        assert_relative_eq!(many[0], 2.0);
        assert_relative_eq!(many[1], -1.0);
        assert_relative_eq!(many[2], 1.0);
        assert_relative_eq!(scene.distance(Vec3::ZERO), 2.0);
    }

    #[test]
    fn test_empty_scene_is_sentinel() {
        let scene = Scene::default();
        assert_relative_eq!(scene.evaluate(Vec3::ZERO), ferm_math::NO_GEOMETRY);
        assert_eq!(
            scene.compile().unwrap().render(ParamStyle::Literal).unwrap(),
            "1000000.0"
        );
    }
}
