//! Elementary node library
//!
//! Every elementary shape is a static [`Elementary`] record: a distance
//! template, the declared [`Geometry`], and the parameter templates. The
//! numeric evaluator of each kind calls the same `ferm-math` formula the
//! template names, with the same argument order.
//!
//! Kinds are closed enums; lookup is a `match` returning a `&'static` record.

mod fractal;
mod primitive;
mod primitive2d;

pub use fractal::{Fractal, Fractal2D};
pub use primitive::Primitive;
pub use primitive2d::Primitive2D;

use crate::error::UnknownKind;
use crate::geometry::Geometry;
use crate::param::{ParamTemplate, Parameter};
use glam::Vec3;
use std::fmt;
use std::str::FromStr;

/// Static description of an elementary shape
#[derive(Debug)]
pub struct Elementary {
    /// Distance template over `@pos` and `@par<N>`
    pub template: &'static str,
    pub geometry: Geometry,
    pub params: &'static [ParamTemplate],
}

/// Any elementary shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementaryKind {
    Primitive(Primitive),
    Primitive2D(Primitive2D),
    Fractal(Fractal),
    Fractal2D(Fractal2D),
}

impl ElementaryKind {
    pub fn record(self) -> &'static Elementary {
        match self {
            Self::Primitive(k) => k.record(),
            Self::Primitive2D(k) => k.record(),
            Self::Fractal(k) => k.record(),
            Self::Fractal2D(k) => k.record(),
        }
    }

    /// Numeric distance; must equal evaluating the bound template at `p`.
    pub fn eval(self, p: Vec3, params: &[Parameter]) -> f32 {
        match self {
            Self::Primitive(k) => k.eval(p, params),
            Self::Primitive2D(k) => k.eval(p, params),
            Self::Fractal(k) => k.eval(p, params),
            Self::Fractal2D(k) => k.eval(p, params),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Primitive(k) => k.name(),
            Self::Primitive2D(k) => k.name(),
            Self::Fractal(k) => k.name(),
            Self::Fractal2D(k) => k.name(),
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Primitive2D(_) => "primitive 2D",
            Self::Fractal(_) => "fractal",
            Self::Fractal2D(_) => "fractal 2D",
        }
    }

    /// Every elementary kind in the library
    pub fn all() -> impl Iterator<Item = Self> {
        Primitive::ALL
            .into_iter()
            .map(Self::Primitive)
            .chain(Primitive2D::ALL.into_iter().map(Self::Primitive2D))
            .chain(Fractal::ALL.into_iter().map(Self::Fractal))
            .chain(Fractal2D::ALL.into_iter().map(Self::Fractal2D))
    }
}

impl fmt::Display for ElementaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementaryKind {
    type Err = UnknownKind;

    /// Case-insensitive lookup by kind name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind {
                category: "shape",
                name: s.to_string(),
            })
    }
}

impl From<Primitive> for ElementaryKind {
    fn from(k: Primitive) -> Self {
        Self::Primitive(k)
    }
}

impl From<Primitive2D> for ElementaryKind {
    fn from(k: Primitive2D) -> Self {
        Self::Primitive2D(k)
    }
}

impl From<Fractal> for ElementaryKind {
    fn from(k: Fractal) -> Self {
        Self::Fractal(k)
    }
}

impl From<Fractal2D> for ElementaryKind {
    fn from(k: Fractal2D) -> Self {
        Self::Fractal2D(k)
    }
}
