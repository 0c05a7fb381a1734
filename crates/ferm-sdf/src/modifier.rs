//! Modifiers
//!
//! A modifier wraps the distance function of the node it is attached to. It
//! has two halves:
//!
//! - a **pre** transform mapping the incoming position (`@pos`) into the
//!   wrapped function's space,
//! - a **post** transform correcting the returned value (`@fnc`). The post
//!   half also receives the position the modifier itself was given, which is
//!   what `Wobble` reads.
//!
//! Textually a modifier is applied as `post[@fnc := acc[@pos := pre]]`, so the
//! first modifier applied ends up innermost.

// One arm per modifier keeps the record table readable
#![allow(clippy::too_many_lines)]

use crate::error::{CompileError, ParamError, UnknownKind};
use crate::expr::{self, Expr, Slot};
use crate::geometry::Geometry;
use crate::param::{
    ParamTemplate, ParamTemplate as P, ParamValue, Parameter, ParamsExt, Uniquation, set_by_name,
    uniquate,
};
use ferm_math::warp;
use glam::{Quat, Vec3};
use std::fmt;
use std::str::FromStr;

/// Static description of a modifier kind
#[derive(Debug)]
pub struct ModifierRecord {
    /// Position template over `@pos` and `@par<N>`
    pub pre: &'static str,
    /// Value template over `@fnc`, optionally `@pos`, and `@par<N>`
    pub post: &'static str,
    pub geometry: Geometry,
    pub params: &'static [ParamTemplate],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    Bend,
    Elongate,
    Inflate,
    Mirror,
    ModuloAll,
    ModuloX,
    ModuloXZ,
    RepeatAll,
    RepeatX,
    RepeatXZ,
    Revolve,
    Rotate,
    ScaleGeneral,
    ScaleUniform,
    Shear,
    Transform,
    Translate,
    Twist,
    Wobble,
}

/// Rotation of 90 degrees around X: revolves around the Y axis
const REVOLVE_ORIENTATION: Quat = Quat::from_xyzw(0.707_106_77, 0.0, 0.0, 0.707_106_77);

static TRANSFORM: ModifierRecord = ModifierRecord {
    pre: "InverseTransform(@par0, @par1, @par2, @pos)",
    post: "(@fnc * @par2)",
    geometry: Geometry::Exact,
    params: &[
        P::vec3("position", 0.0, 0.0, 0.0),
        P::quat("rotation", Quat::IDENTITY),
        P::float("scale", 1.0),
    ],
};

static INFLATE: ModifierRecord = ModifierRecord {
    pre: "@pos",
    post: "@fnc - @par0",
    geometry: Geometry::Exact,
    params: &[P::float("amount", 0.5)],
};

static TRANSLATE: ModifierRecord = ModifierRecord {
    pre: "(@pos - @par0)",
    post: "@fnc",
    geometry: Geometry::Exact,
    params: &[P::vec3("position", 0.0, 0.0, 0.0)],
};

static ROTATE: ModifierRecord = ModifierRecord {
    pre: "InverseRotate(@par0, @pos)",
    post: "@fnc",
    geometry: Geometry::Exact,
    params: &[P::quat("rotation", Quat::IDENTITY)],
};

static MIRROR: ModifierRecord = ModifierRecord {
    pre: "Mirror(@pos, @par0, @par1)",
    post: "@fnc",
    geometry: Geometry::Exact,
    params: &[P::vec3("Normal", 1.0, 0.0, 0.0), P::float("d", 0.0)],
};

static SCALE_UNIFORM: ModifierRecord = ModifierRecord {
    pre: "(@pos / @par0)",
    post: "(@fnc * @par0)",
    geometry: Geometry::Exact,
    params: &[P::float("scale", 1.0)],
};

static SCALE_GENERAL: ModifierRecord = ModifierRecord {
    pre: "InverseScale(@par0, @pos)",
    post: "Scale(@par0, @fnc)",
    geometry: Geometry::Bounded,
    params: &[P::vec3("scale", 1.0, 1.0, 1.0)],
};

static WOBBLE: ModifierRecord = ModifierRecord {
    pre: "@pos",
    post: "(@fnc + Wobble(@par0, @par1, @pos))",
    geometry: Geometry::Distorted,
    params: &[P::vec3("frequency", 10.0, 10.0, 10.0), P::float("amplitude", 0.05)],
};

static REPEAT_ALL: ModifierRecord = ModifierRecord {
    pre: "Repeat(@pos, @par0)",
    post: "@fnc",
    geometry: Geometry::ExactConditional,
    params: &[P::vec3("CellSize", 2.0, 2.0, 2.0)],
};

static REPEAT_X: ModifierRecord = ModifierRecord {
    pre: "RepeatX(@pos, @par0)",
    post: "@fnc",
    geometry: Geometry::ExactConditional,
    params: &[P::float("CellSize", 1.0)],
};

static REPEAT_XZ: ModifierRecord = ModifierRecord {
    pre: "RepeatXZ(@pos, @par0)",
    post: "@fnc",
    geometry: Geometry::ExactConditional,
    params: &[P::vec2("CellSize", 2.0, 2.0)],
};

static MODULO_ALL: ModifierRecord = ModifierRecord {
    pre: "Modulo(@pos, @par0)",
    post: "@fnc",
    geometry: Geometry::ExactConditional,
    params: &[P::vec3("CellSize", 2.0, 2.0, 2.0)],
};

static MODULO_X: ModifierRecord = ModifierRecord {
    pre: "ModuloX(@pos, @par0)",
    post: "@fnc",
    geometry: Geometry::ExactConditional,
    params: &[P::float("CellSize", 1.0)],
};

static MODULO_XZ: ModifierRecord = ModifierRecord {
    pre: "ModuloXZ(@pos, @par0)",
    post: "@fnc",
    geometry: Geometry::ExactConditional,
    params: &[P::vec2("CellSize", 2.0, 2.0)],
};

static ELONGATE: ModifierRecord = ModifierRecord {
    pre: "Elongate(@pos, @par0)",
    post: "@fnc",
    geometry: Geometry::Exact,
    params: &[P::vec3("Amount", 0.0, 1.0, 0.0)],
};

static TWIST: ModifierRecord = ModifierRecord {
    pre: "Twist(@pos, @par0, @par1)",
    post: "@fnc",
    geometry: Geometry::Distorted,
    params: &[P::vec3("Axis", 0.0, 1.0, 0.0), P::float("Power", 1.0)],
};

static BEND: ModifierRecord = ModifierRecord {
    pre: "Bend(@pos, @par0, @par1, @par2)",
    post: "@fnc",
    geometry: Geometry::Distorted,
    params: &[
        P::vec3("Axis", 0.0, 0.0, 1.0),
        P::vec3("Direction", 1.0, 0.0, 0.0),
        P::float("Power", 1.0),
    ],
};

static SHEAR: ModifierRecord = ModifierRecord {
    pre: "Shear(@pos, @par0, @par1, @par2, @par3, @par4, @par5)",
    post: "@fnc",
    geometry: Geometry::Distorted,
    params: &[
        P::float("xy", 1.0),
        P::float("xz", 0.0),
        P::float("yx", 0.0),
        P::float("yz", 0.0),
        P::float("zx", 0.0),
        P::float("zy", 0.0),
    ],
};

static REVOLVE: ModifierRecord = ModifierRecord {
    pre: "Revolve(@pos, @par0)",
    post: "@fnc",
    geometry: Geometry::Exact,
    params: &[P::quat("Orientation", REVOLVE_ORIENTATION)],
};

impl ModifierKind {
    pub const ALL: [Self; 19] = [
        Self::Bend,
        Self::Elongate,
        Self::Inflate,
        Self::Mirror,
        Self::ModuloAll,
        Self::ModuloX,
        Self::ModuloXZ,
        Self::RepeatAll,
        Self::RepeatX,
        Self::RepeatXZ,
        Self::Revolve,
        Self::Rotate,
        Self::ScaleGeneral,
        Self::ScaleUniform,
        Self::Shear,
        Self::Transform,
        Self::Translate,
        Self::Twist,
        Self::Wobble,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Bend => "Bend",
            Self::Elongate => "Elongate",
            Self::Inflate => "Inflate",
            Self::Mirror => "Mirror",
            Self::ModuloAll => "ModuloAll",
            Self::ModuloX => "ModuloX",
            Self::ModuloXZ => "ModuloXZ",
            Self::RepeatAll => "RepeatAll",
            Self::RepeatX => "RepeatX",
            Self::RepeatXZ => "RepeatXZ",
            Self::Revolve => "Revolve",
            Self::Rotate => "Rotate",
            Self::ScaleGeneral => "ScaleGeneral",
            Self::ScaleUniform => "ScaleUniform",
            Self::Shear => "Shear",
            Self::Transform => "Transform",
            Self::Translate => "Translate",
            Self::Twist => "Twist",
            Self::Wobble => "Wobble",
        }
    }

    pub fn record(self) -> &'static ModifierRecord {
        match self {
            Self::Bend => &BEND,
            Self::Elongate => &ELONGATE,
            Self::Inflate => &INFLATE,
            Self::Mirror => &MIRROR,
            Self::ModuloAll => &MODULO_ALL,
            Self::ModuloX => &MODULO_X,
            Self::ModuloXZ => &MODULO_XZ,
            Self::RepeatAll => &REPEAT_ALL,
            Self::RepeatX => &REPEAT_X,
            Self::RepeatXZ => &REPEAT_XZ,
            Self::Revolve => &REVOLVE,
            Self::Rotate => &ROTATE,
            Self::ScaleGeneral => &SCALE_GENERAL,
            Self::ScaleUniform => &SCALE_UNIFORM,
            Self::Shear => &SHEAR,
            Self::Transform => &TRANSFORM,
            Self::Translate => &TRANSLATE,
            Self::Twist => &TWIST,
            Self::Wobble => &WOBBLE,
        }
    }

    /// Numeric pre transform; must match the pre template.
    pub fn pre(self, p: Vec3, params: &[Parameter]) -> Vec3 {
        let f = |i| params.float(i);
        match self {
            Self::Transform => warp::inverse_transform(params.vec3(0), params.quat(1), f(2), p),
            Self::Inflate | Self::Wobble => p,
            Self::Translate => p - params.vec3(0),
            Self::Rotate => warp::inverse_rotate(params.quat(0), p),
            Self::Mirror => warp::mirror(p, params.vec3(0), f(1)),
            Self::ScaleUniform => p / f(0),
            Self::ScaleGeneral => warp::inverse_scale(params.vec3(0), p),
            Self::RepeatAll => warp::repeat_all(p, params.vec3(0)),
            Self::RepeatX => warp::repeat_x(p, f(0)),
            Self::RepeatXZ => warp::repeat_xz(p, params.vec2(0)),
            Self::ModuloAll => warp::modulo_all(p, params.vec3(0)),
            Self::ModuloX => warp::modulo_x(p, f(0)),
            Self::ModuloXZ => warp::modulo_xz(p, params.vec2(0)),
            Self::Elongate => warp::elongate(p, params.vec3(0)),
            Self::Twist => warp::twist(p, params.vec3(0), f(1)),
            Self::Bend => warp::bend(p, params.vec3(0), params.vec3(1), f(2)),
            Self::Shear => warp::shear(p, f(0), f(1), f(2), f(3), f(4), f(5)),
            Self::Revolve => warp::revolve(p, params.quat(0)),
        }
    }

    /// Numeric post transform. `p` is the position this modifier received,
    /// before its own pre transform.
    pub fn post(self, value: f32, p: Vec3, params: &[Parameter]) -> f32 {
        match self {
            Self::Transform => value * params.float(2),
            Self::Inflate => value - params.float(0),
            Self::ScaleUniform => value * params.float(0),
            Self::ScaleGeneral => warp::scale_distance(params.vec3(0), value),
            Self::Wobble => value + warp::wobble(params.vec3(0), params.float(1), p),
            _ => value,
        }
    }

    /// `acc` with its position replaced by the bound pre template.
    pub(crate) fn apply_input(self, params: &[Parameter], acc: &Expr) -> Result<Expr, CompileError> {
        let pre = expr::template(self.record().pre)?.bind_params(params);
        Ok(acc.substitute(Slot::Pos, &pre))
    }

    /// The bound post template with `@fnc` replaced by `acc`.
    pub(crate) fn apply_output(self, params: &[Parameter], acc: &Expr) -> Result<Expr, CompileError> {
        let post = expr::template(self.record().post)?.bind_params(params);
        Ok(post.substitute(Slot::Fnc, acc))
    }

    /// Both halves around `acc`.
    pub(crate) fn apply(self, params: &[Parameter], acc: &Expr) -> Result<Expr, CompileError> {
        let inner = self.apply_input(params, acc)?;
        self.apply_output(params, &inner)
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModifierKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind {
                category: "modifier",
                name: s.to_string(),
            })
    }
}

/// A modifier instance attached to a shape or mixer
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    kind: ModifierKind,
    params: Vec<Parameter>,
    /// Disabled modifiers are skipped everywhere
    pub enabled: bool,
}

impl Modifier {
    pub fn new(kind: ModifierKind) -> Self {
        let (params, _) = uniquate(kind.record().params, &[]);
        Self {
            kind,
            params,
            enabled: true,
        }
    }

    /// Builder form of [`Modifier::set_param`]
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Result<Self, ParamError> {
        self.set_param(name, value)?;
        Ok(self)
    }

    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    /// Switch kind, carrying values over when the parameter layout matches.
    pub fn set_kind(&mut self, kind: ModifierKind) -> Uniquation {
        let (params, outcome) = uniquate(kind.record().params, &self.params);
        self.kind = kind;
        self.params = params;
        outcome
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut [Parameter] {
        &mut self.params
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<(), ParamError> {
        set_by_name(&mut self.params, name, value)
    }

    pub fn geometry(&self) -> Geometry {
        self.kind.record().geometry
    }

    pub fn pre(&self, p: Vec3) -> Vec3 {
        self.kind.pre(p, &self.params)
    }

    pub fn post(&self, value: f32, p: Vec3) -> f32 {
        self.kind.post(value, p, &self.params)
    }

    pub(crate) fn apply_input(&self, acc: &Expr) -> Result<Expr, CompileError> {
        self.kind.apply_input(&self.params, acc)
    }

    pub(crate) fn apply_output(&self, acc: &Expr) -> Result<Expr, CompileError> {
        self.kind.apply_output(&self.params, acc)
    }

    pub(crate) fn apply(&self, acc: &Expr) -> Result<Expr, CompileError> {
        self.kind.apply(&self.params, acc)
    }
}

/// Numeric composition of a modifier group around `f`.
///
/// Pre transforms run last-attached first; post transforms run first-attached
/// first, each seeing the position its modifier received.
pub(crate) fn apply_numeric(group: &[&Modifier], p: Vec3, f: impl FnOnce(Vec3) -> f32) -> f32 {
    let mut received = vec![Vec3::ZERO; group.len()];
    let mut q = p;
    for (i, m) in group.iter().enumerate().rev() {
        received[i] = q;
        q = m.pre(q);
    }
    let mut value = f(q);
    for (m, at) in group.iter().zip(&received) {
        value = m.post(value, *at);
    }
    value
}

/// Text composition of a modifier group around `base`; the mirror of
/// [`apply_numeric`].
pub(crate) fn apply_text(group: &[&Modifier], base: Expr) -> Result<Expr, CompileError> {
    group.iter().try_fold(base, |acc, m| m.apply(&acc))
}
