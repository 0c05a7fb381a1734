//! Characterizing nodes
//!
//! A [`Node`] is either an elementary shape or a mixer over child nodes. Both
//! carry a [`ModifierStack`]. Shapes additionally carry their affine transform
//! as three trailing parameters (`t_pos`, `t_rot`, `t_scl`) after the
//! elementary ones; [`TransformMode`] decides where, if anywhere, that
//! transform wraps the shape.
//!
//! ## Example
//!
//! ```rust
//! use ferm_sdf::{MixerKind, Modifier, ModifierKind, Node, Primitive};
//! use glam::Vec3;
//!
//! let ball = Node::shape(Primitive::Sphere).with_param("radius", 0.5)?;
//! let post = Node::shape(Primitive::Box)
//!     .with_modifier(Modifier::new(ModifierKind::Translate).with("position", Vec3::Y)?);
//! let scene = Node::mixer(MixerKind::Union, vec![ball, post]);
//! assert_eq!(scene.children().len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{NodeError, ParamError, StackError};
use crate::geometry::Geometry;
use crate::library::ElementaryKind;
use crate::mixer::MixerKind;
use crate::modifier::Modifier;
use crate::param::{ParamTemplate, ParamValue, Parameter, ParamsExt, Uniquation, set_by_name, uniquate};
use crate::recurse::{ModifierStack, RecurseModifier, StackEntry};
use glam::{Quat, Vec3};

/// Synthetic transform parameters appended to every shape
static TRANSFORM_PARAMS: [ParamTemplate; 3] = [
    ParamTemplate::vec3("t_pos", 0.0, 0.0, 0.0),
    ParamTemplate::quat("t_rot", Quat::IDENTITY),
    ParamTemplate::float("t_scl", 1.0),
];

const TRANSFORM_LEN: usize = TRANSFORM_PARAMS.len();

/// Where a shape's own transform is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformMode {
    /// Around the elementary function only, inside every modifier
    #[default]
    ApplyBeforeModifiers,
    /// Outermost, around all modifiers
    ApplyAfterModifiers,
    /// Not applied
    Ignore,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Shape(ElementaryKind),
    Mixer { kind: MixerKind, children: Vec<Node> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) params: Vec<Parameter>,
    pub(crate) modifiers: ModifierStack,
    pub transform_mode: TransformMode,
    /// Disabled nodes read as [`ferm_math::NO_GEOMETRY`] and own no identifiers
    pub enabled: bool,
}

/// Running counters for tree-wide identifier allocation
#[derive(Debug, Default)]
pub(crate) struct IdCounter {
    pub params: usize,
    pub helpers: usize,
}

fn shape_params(kind: ElementaryKind) -> Vec<Parameter> {
    kind.record()
        .params
        .iter()
        .chain(&TRANSFORM_PARAMS)
        .map(ParamTemplate::instantiate)
        .collect()
}

impl Node {
    pub fn shape(kind: impl Into<ElementaryKind>) -> Self {
        let kind = kind.into();
        Self {
            params: shape_params(kind),
            kind: NodeKind::Shape(kind),
            modifiers: ModifierStack::new(),
            transform_mode: TransformMode::default(),
            enabled: true,
        }
    }

    pub fn mixer(kind: MixerKind, children: Vec<Node>) -> Self {
        let (params, _) = uniquate(kind.record().params, &[]);
        Self {
            kind: NodeKind::Mixer { kind, children },
            params,
            modifiers: ModifierStack::new(),
            transform_mode: TransformMode::default(),
            enabled: true,
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Result<Self, ParamError> {
        self.set_param(name, value)?;
        Ok(self)
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_recurse(mut self, recurse: RecurseModifier) -> Result<Self, StackError> {
        self.modifiers.push_recurse(recurse)?;
        Ok(self)
    }

    pub fn with_transform(mut self, position: Vec3, rotation: Quat, scale: f32) -> Result<Self, NodeError> {
        self.set_transform(position, rotation, scale)?;
        Ok(self)
    }

    pub fn with_transform_mode(mut self, mode: TransformMode) -> Self {
        self.transform_mode = mode;
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_shape(&self) -> bool {
        matches!(self.kind, NodeKind::Shape(_))
    }

    /// All parameters, including a shape's trailing transform.
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Case-insensitive write; transform parameters are addressable as
    /// `t_pos`, `t_rot` and `t_scl`.
    pub fn set_param(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<(), ParamError> {
        set_by_name(&mut self.params, name, value)
    }

    /// Parameters read by the elementary function or mixer combinator.
    pub fn own_params(&self) -> &[Parameter] {
        match self.kind {
            NodeKind::Shape(_) => &self.params[..self.params.len() - TRANSFORM_LEN],
            NodeKind::Mixer { .. } => &self.params,
        }
    }

    /// A shape's trailing transform parameters
    pub fn transform_params(&self) -> Option<&[Parameter]> {
        match self.kind {
            NodeKind::Shape(_) => Some(&self.params[self.params.len() - TRANSFORM_LEN..]),
            NodeKind::Mixer { .. } => None,
        }
    }

    pub fn transform(&self) -> Option<(Vec3, Quat, f32)> {
        self.transform_params()
            .map(|t| (t.vec3(0), t.quat(1), t.float(2)))
    }

    pub fn set_transform(&mut self, position: Vec3, rotation: Quat, scale: f32) -> Result<(), NodeError> {
        if !self.is_shape() {
            return Err(NodeError::NotAShape);
        }
        let n = self.params.len() - TRANSFORM_LEN;
        let values: [ParamValue; 3] = [position.into(), rotation.into(), scale.into()];
        for (param, value) in self.params[n..].iter_mut().zip(values) {
            param.set_value(value)?;
        }
        Ok(())
    }

    /// Switch elementary kind. Elementary values carry over when the layout
    /// matches; the transform is always kept.
    pub fn set_shape(&mut self, kind: impl Into<ElementaryKind>) -> Result<Uniquation, NodeError> {
        let kind = kind.into();
        if !self.is_shape() {
            return Err(NodeError::NotAShape);
        }
        let split = self.params.len() - TRANSFORM_LEN;
        let transform = self.params.split_off(split);
        let (mut params, outcome) = uniquate(kind.record().params, &self.params);
        params.extend(transform);
        self.params = params;
        self.kind = NodeKind::Shape(kind);
        Ok(outcome)
    }

    /// Switch mixer kind, keeping the children.
    pub fn set_mixer(&mut self, kind: MixerKind) -> Result<Uniquation, NodeError> {
        let NodeKind::Mixer { kind: current, .. } = &mut self.kind else {
            return Err(NodeError::NotAMixer);
        };
        *current = kind;
        let (params, outcome) = uniquate(kind.record().params, &self.params);
        self.params = params;
        Ok(outcome)
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Mixer { children, .. } => children,
            NodeKind::Shape(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.kind {
            NodeKind::Mixer { children, .. } => Some(children),
            NodeKind::Shape(_) => None,
        }
    }

    pub fn push_child(&mut self, child: Node) -> Result<(), NodeError> {
        self.children_mut().ok_or(NodeError::NotAMixer)?.push(child);
        Ok(())
    }

    pub fn modifiers(&self) -> &ModifierStack {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut ModifierStack {
        &mut self.modifiers
    }

    /// Safety classification of this node's distance estimate
    pub fn geometry(&self) -> Geometry {
        let base = match &self.kind {
            NodeKind::Shape(k) => k.record().geometry,
            NodeKind::Mixer { kind, children } => {
                kind.fold_geometry(children.iter().filter(|c| c.enabled).map(Node::geometry))
            }
        };
        self.modifiers.geometry(base)
    }

    /// Visit active parameters in identifier order: own parameters, then the
    /// modifier stack, then children.
    pub(crate) fn visit_active_params<'a>(&'a self, f: &mut impl FnMut(&'a Parameter)) {
        if !self.enabled {
            return;
        }
        self.params.iter().for_each(&mut *f);
        for entry in self.modifiers.entries().iter().filter(|e| e.is_enabled()) {
            match entry {
                StackEntry::Modifier(m) => m.params().iter().for_each(&mut *f),
                StackEntry::Recurse(r) => r.params().iter().for_each(&mut *f),
            }
        }
        for child in self.children() {
            child.visit_active_params(f);
        }
    }

    /// Number of active parameters and active recurse modifiers
    pub(crate) fn count_active(&self, counter: &mut IdCounter) {
        if !self.enabled {
            return;
        }
        counter.params += self.params.len();
        for entry in self.modifiers.entries().iter().filter(|e| e.is_enabled()) {
            match entry {
                StackEntry::Modifier(m) => counter.params += m.params().len(),
                StackEntry::Recurse(r) => {
                    counter.params += r.params().len();
                    counter.helpers += 1;
                }
            }
        }
        for child in self.children() {
            child.count_active(counter);
        }
    }

    /// Assign identifiers in [`Node::visit_active_params`] order; inactive
    /// entries lose theirs.
    pub(crate) fn assign_ids(&mut self, live: bool, next: &mut IdCounter, total: &IdCounter) {
        let live = live && self.enabled;

        assign_params(&mut self.params, live, &mut next.params, total.params);
        for entry in self.modifiers.entries_mut() {
            let entry_live = live && entry.is_enabled();
            match entry {
                StackEntry::Modifier(m) => {
                    assign_params(m.params_mut(), entry_live, &mut next.params, total.params);
                }
                StackEntry::Recurse(r) => {
                    assign_params(r.params_mut(), entry_live, &mut next.params, total.params);
                    if entry_live {
                        r.assign_helper(next.helpers, total.helpers);
                        next.helpers += 1;
                    } else {
                        r.clear_helper();
                    }
                }
            }
        }

        if let NodeKind::Mixer { children, .. } = &mut self.kind {
            for child in children {
                child.assign_ids(live, next, total);
            }
        }
    }
}

fn assign_params(params: &mut [Parameter], live: bool, next: &mut usize, total: usize) {
    for p in params {
        if live {
            p.assign_identifier(*next, total);
            *next += 1;
        } else {
            p.clear_identifier();
        }
    }
}
