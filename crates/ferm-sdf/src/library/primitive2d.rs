//! 2D primitives, drawn as zero-thickness sheets in the XZ plane

use super::Elementary;
use crate::geometry::Geometry;
use crate::param::{ParamTemplate as P, Parameter, ParamsExt};
use ferm_math::planar;
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive2D {
    Circle,
    Triangle,
    Rectangle,
    Polygon,
    Rouleaux,
    Spiral,
    Sector,
}

static CIRCLE: Elementary = Elementary {
    template: "Circle(@pos, @par0)",
    geometry: Geometry::Exact,
    params: &[P::float("radius", 0.5)],
};

static TRIANGLE: Elementary = Elementary {
    template: "Triangle(@pos, @par0, @par1, @par2)",
    geometry: Geometry::Exact,
    params: &[
        P::vec2("point1", 0.0, 0.0),
        P::vec2("point2", 1.0, 0.0),
        P::vec2("point3", 0.0, 1.0),
    ],
};

static RECTANGLE: Elementary = Elementary {
    template: "Quad(@pos, @par0, @par1)",
    geometry: Geometry::Exact,
    params: &[P::vec2("size", 1.0, 1.0), P::float("rounding", 0.1)],
};

static POLYGON: Elementary = Elementary {
    template: "Polygon(@pos, @par0, @par1)",
    geometry: Geometry::Exact,
    params: &[P::float("radius", 0.5), P::int("sides", 3)],
};

static ROULEAUX: Elementary = Elementary {
    template: "Rouleaux(@pos, @par0, @par1)",
    geometry: Geometry::Exact,
    params: &[P::float("radius", 0.5), P::int("sides", 3)],
};

static SPIRAL: Elementary = Elementary {
    template: "Spiral(@pos, @par0, @par1, @par2)",
    geometry: Geometry::Exact,
    params: &[P::float("spacing", 0.2), P::float("thickness", 0.1), P::float("radius", 5.0)],
};

static SECTOR: Elementary = Elementary {
    template: "Sector(@pos, @par0, @par1)",
    geometry: Geometry::Exact,
    params: &[P::float("radius", 0.5), P::float("angle", 45.0)],
};

impl Primitive2D {
    pub const ALL: [Self; 7] = [
        Self::Circle,
        Self::Triangle,
        Self::Rectangle,
        Self::Polygon,
        Self::Rouleaux,
        Self::Spiral,
        Self::Sector,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Circle => "Circle",
            Self::Triangle => "Triangle",
            Self::Rectangle => "Rectangle",
            Self::Polygon => "Polygon",
            Self::Rouleaux => "Rouleaux",
            Self::Spiral => "Spiral",
            Self::Sector => "Sector",
        }
    }

    pub fn record(self) -> &'static Elementary {
        match self {
            Self::Circle => &CIRCLE,
            Self::Triangle => &TRIANGLE,
            Self::Rectangle => &RECTANGLE,
            Self::Polygon => &POLYGON,
            Self::Rouleaux => &ROULEAUX,
            Self::Spiral => &SPIRAL,
            Self::Sector => &SECTOR,
        }
    }

    pub fn eval(self, p: Vec3, params: &[Parameter]) -> f32 {
        match self {
            Self::Circle => planar::circle(p, params.float(0)),
            Self::Triangle => planar::triangle(p, params.vec2(0), params.vec2(1), params.vec2(2)),
            Self::Rectangle => planar::rectangle(p, params.vec2(0), params.float(1)),
            Self::Polygon => planar::polygon(p, params.float(0), params.int(1)),
            Self::Rouleaux => planar::rouleaux(p, params.float(0), params.int(1)),
            Self::Spiral => planar::spiral(p, params.float(0), params.float(1), params.float(2)),
            Self::Sector => planar::sector(p, params.float(0), params.float(1)),
        }
    }
}
