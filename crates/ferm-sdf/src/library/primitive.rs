//! Closed-form 3D primitives

// One arm per primitive keeps the record table readable
#![allow(clippy::too_many_lines)]

use super::Elementary;
use crate::geometry::Geometry;
use crate::param::{ParamTemplate as P, Parameter, ParamsExt};
use ferm_math::shapes;
use glam::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Arch,
    Box,
    RoundedBox,
    Pipe,
    InfinitePipe,
    Plane,
    Point,
    Pyramid,
    Sphere,
    Ellipsoid,
    Torus,
    Capsule,
    Cone,
    CappedCone,
    RoundedCone,
    Cylinder,
    InfiniteCylinder,
    RoundedCylinder,
    TriPrism,
    HexPrism,
    Tetrahedron,
    Octahedron,
}

static ARCH: Elementary = Elementary {
    template: "Arch(@pos, @par0, @par1, @par2)",
    geometry: Geometry::Bounded,
    params: &[P::vec3("size", 2.0, 2.0, 2.0), P::float("radius", 0.5), P::float("height", 1.0)],
};

static BOX: Elementary = Elementary {
    template: "Box(@pos, @par0)",
    geometry: Geometry::Exact,
    params: &[P::vec3("size", 1.0, 1.0, 1.0)],
};

static ROUNDED_BOX: Elementary = Elementary {
    template: "RoundedBox(@pos, @par0, @par1)",
    geometry: Geometry::Exact,
    params: &[P::vec3("size", 1.0, 1.0, 1.0), P::float("round", 0.1)],
};

static PIPE: Elementary = Elementary {
    template: "Pipe(@pos, @par0, @par1, @par2)",
    geometry: Geometry::Exact,
    params: &[P::float("innerRadius", 0.4), P::float("outerRadius", 0.5), P::float("length", 1.0)],
};

static INFINITE_PIPE: Elementary = Elementary {
    template: "InfinitePipe(@pos, @par0, @par1)",
    geometry: Geometry::Exact,
    params: &[P::float("innerRadius", 1.0), P::float("outerRadius", 1.0)],
};

static PLANE: Elementary = Elementary {
    template: "Plane(@pos, @par0)",
    geometry: Geometry::Exact,
    params: &[P::float("thickness", 0.0)],
};

static POINT: Elementary = Elementary {
    template: "length(@pos)",
    geometry: Geometry::Exact,
    params: &[],
};

static PYRAMID: Elementary = Elementary {
    template: "Pyramid(@pos, @par0, @par1)",
    geometry: Geometry::BoundedConditional,
    params: &[P::vec2("slope", 1.0, 1.0), P::float("height", 1.0)],
};

static SPHERE: Elementary = Elementary {
    template: "Sphere(@pos, @par0)",
    geometry: Geometry::Exact,
    params: &[P::float("radius", 1.0)],
};

static ELLIPSOID: Elementary = Elementary {
    template: "Ellipsoid(@pos, @par0)",
    geometry: Geometry::BoundedConditional,
    params: &[P::vec3("radius", 0.5, 1.0, 0.5)],
};

static TORUS: Elementary = Elementary {
    template: "Torus(@pos, float2(@par0, @par1))",
    geometry: Geometry::Exact,
    params: &[P::float("radius", 1.0), P::float("thickness", 0.2)],
};

static CAPSULE: Elementary = Elementary {
    template: "Capsule(@pos, @par0, @par1)",
    geometry: Geometry::Exact,
    params: &[P::float("height", 2.0), P::float("radius", 0.5)],
};

static CONE: Elementary = Elementary {
    template: "Cone(@pos, @par0, @par1)",
    geometry: Geometry::Exact,
    params: &[P::float("slope", 1.0), P::float("length", 1.0)],
};

// The top radius is declared first but passed second
static CAPPED_CONE: Elementary = Elementary {
    template: "CappedCone(@pos, @par1, @par0, @par2)",
    geometry: Geometry::Exact,
    params: &[P::float("radius1", 0.2), P::float("radius2", 0.5), P::float("height", 1.0)],
};

static ROUNDED_CONE: Elementary = Elementary {
    template: "RoundedCone(@pos, @par1, @par0, @par2)",
    geometry: Geometry::Exact,
    params: &[P::float("radius1", 0.1), P::float("radius2", 0.2), P::float("height", 1.0)],
};

static CYLINDER: Elementary = Elementary {
    template: "Cylinder(@pos, float2(@par0, @par1))",
    geometry: Geometry::Exact,
    params: &[P::float("radius", 0.5), P::float("height", 0.5)],
};

static INFINITE_CYLINDER: Elementary = Elementary {
    template: "InfiniteCylinder(@pos, @par0)",
    geometry: Geometry::Exact,
    params: &[P::float("radius", 0.5)],
};

static ROUNDED_CYLINDER: Elementary = Elementary {
    template: "RoundedCylinder(@pos, @par0, @par1, @par2)",
    geometry: Geometry::Exact,
    params: &[P::float("cylinderRadius", 0.5), P::float("smoothing", 0.1), P::float("length", 1.0)],
};

static TRI_PRISM: Elementary = Elementary {
    template: "TriPrism(@pos, @par0, @par1)",
    geometry: Geometry::Exact,
    params: &[P::float("size", 0.5), P::float("height", 1.0)],
};

static HEX_PRISM: Elementary = Elementary {
    template: "HexPrism(@pos, @par0, @par1)",
    geometry: Geometry::Exact,
    params: &[P::float("size", 0.5), P::float("height", 1.0)],
};

static TETRAHEDRON: Elementary = Elementary {
    template: "Tetrahedron(@pos, @par0)",
    geometry: Geometry::Exact,
    params: &[P::float("size", 1.0)],
};

static OCTAHEDRON: Elementary = Elementary {
    template: "Octahedron(@pos, @par0)",
    geometry: Geometry::Exact,
    params: &[P::float("size", 1.0)],
};

impl Primitive {
    pub const ALL: [Self; 22] = [
        Self::Arch,
        Self::Box,
        Self::RoundedBox,
        Self::Pipe,
        Self::InfinitePipe,
        Self::Plane,
        Self::Point,
        Self::Pyramid,
        Self::Sphere,
        Self::Ellipsoid,
        Self::Torus,
        Self::Capsule,
        Self::Cone,
        Self::CappedCone,
        Self::RoundedCone,
        Self::Cylinder,
        Self::InfiniteCylinder,
        Self::RoundedCylinder,
        Self::TriPrism,
        Self::HexPrism,
        Self::Tetrahedron,
        Self::Octahedron,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Arch => "Arch",
            Self::Box => "Box",
            Self::RoundedBox => "RoundedBox",
            Self::Pipe => "Pipe",
            Self::InfinitePipe => "InfinitePipe",
            Self::Plane => "Plane",
            Self::Point => "Point",
            Self::Pyramid => "Pyramid",
            Self::Sphere => "Sphere",
            Self::Ellipsoid => "Ellipsoid",
            Self::Torus => "Torus",
            Self::Capsule => "Capsule",
            Self::Cone => "Cone",
            Self::CappedCone => "CappedCone",
            Self::RoundedCone => "RoundedCone",
            Self::Cylinder => "Cylinder",
            Self::InfiniteCylinder => "InfiniteCylinder",
            Self::RoundedCylinder => "RoundedCylinder",
            Self::TriPrism => "TriPrism",
            Self::HexPrism => "HexPrism",
            Self::Tetrahedron => "Tetrahedron",
            Self::Octahedron => "Octahedron",
        }
    }

    pub fn record(self) -> &'static Elementary {
        match self {
            Self::Arch => &ARCH,
            Self::Box => &BOX,
            Self::RoundedBox => &ROUNDED_BOX,
            Self::Pipe => &PIPE,
            Self::InfinitePipe => &INFINITE_PIPE,
            Self::Plane => &PLANE,
            Self::Point => &POINT,
            Self::Pyramid => &PYRAMID,
            Self::Sphere => &SPHERE,
            Self::Ellipsoid => &ELLIPSOID,
            Self::Torus => &TORUS,
            Self::Capsule => &CAPSULE,
            Self::Cone => &CONE,
            Self::CappedCone => &CAPPED_CONE,
            Self::RoundedCone => &ROUNDED_CONE,
            Self::Cylinder => &CYLINDER,
            Self::InfiniteCylinder => &INFINITE_CYLINDER,
            Self::RoundedCylinder => &ROUNDED_CYLINDER,
            Self::TriPrism => &TRI_PRISM,
            Self::HexPrism => &HEX_PRISM,
            Self::Tetrahedron => &TETRAHEDRON,
            Self::Octahedron => &OCTAHEDRON,
        }
    }

    pub fn eval(self, p: Vec3, params: &[Parameter]) -> f32 {
        let f = |i| params.float(i);
        match self {
            Self::Arch => shapes::arch(p, params.vec3(0), f(1), f(2)),
            Self::Box => shapes::cuboid(p, params.vec3(0)),
            Self::RoundedBox => shapes::rounded_box(p, params.vec3(0), f(1)),
            Self::Pipe => shapes::pipe(p, f(0), f(1), f(2)),
            Self::InfinitePipe => shapes::infinite_pipe(p, f(0), f(1)),
            Self::Plane => shapes::plane(p, f(0)),
            Self::Point => p.length(),
            Self::Pyramid => shapes::pyramid(p, params.vec2(0), f(1)),
            Self::Sphere => shapes::sphere(p, f(0)),
            Self::Ellipsoid => shapes::ellipsoid(p, params.vec3(0)),
            Self::Torus => shapes::torus(p, Vec2::new(f(0), f(1))),
            Self::Capsule => shapes::capsule(p, f(0), f(1)),
            Self::Cone => shapes::cone(p, f(0), f(1)),
            Self::CappedCone => shapes::capped_cone(p, f(1), f(0), f(2)),
            Self::RoundedCone => shapes::rounded_cone(p, f(1), f(0), f(2)),
            Self::Cylinder => shapes::cylinder(p, Vec2::new(f(0), f(1))),
            Self::InfiniteCylinder => shapes::infinite_cylinder(p, f(0)),
            Self::RoundedCylinder => shapes::rounded_cylinder(p, f(0), f(1), f(2)),
            Self::TriPrism => shapes::tri_prism(p, f(0), f(1)),
            Self::HexPrism => shapes::hex_prism(p, f(0), f(1)),
            Self::Tetrahedron => shapes::tetrahedron(p, f(0)),
            Self::Octahedron => shapes::octahedron(p, f(0)),
        }
    }
}
