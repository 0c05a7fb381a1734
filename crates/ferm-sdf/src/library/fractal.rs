//! Fractal shapes
//!
//! All fractals are tagged [`Geometry::Complex`]; iteration counts are plain
//! `Int` parameters and are never unbounded.

use super::Elementary;
use crate::geometry::Geometry;
use crate::param::{ParamTemplate as P, Parameter, ParamsExt};
use ferm_math::fractals;
use glam::Vec3;

/// 3D fractals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fractal {
    Mandelbulb,
    SierpinskiTetrahedron,
    KochTetrahedron,
}

/// 2D fractals in the XZ plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fractal2D {
    Mandelbrot,
    Julia,
}

static MANDELBULB: Elementary = Elementary {
    template: "Mandelbulb(@pos, @par0, @par1)",
    geometry: Geometry::Complex,
    params: &[P::int("iterations", 20), P::float("power", 8.0)],
};

static SIERPINSKI_TETRAHEDRON: Elementary = Elementary {
    template: "SierpinskiTetrahedron(@pos, @par0)",
    geometry: Geometry::Complex,
    params: &[P::int("iterations", 8)],
};

static KOCH_TETRAHEDRON: Elementary = Elementary {
    template: "KochTetrahedron(@pos, @par0)",
    geometry: Geometry::Complex,
    params: &[P::int("iterations", 8)],
};

static MANDELBROT: Elementary = Elementary {
    template: "Mandelbrot(@pos, @par0)",
    geometry: Geometry::Complex,
    params: &[P::int("iterations", 20)],
};

static JULIA: Elementary = Elementary {
    template: "Julia(@pos, @par0, @par1)",
    geometry: Geometry::Complex,
    params: &[P::int("iterations", 20), P::vec2("c", -0.8, 0.156)],
};

impl Fractal {
    pub const ALL: [Self; 3] = [
        Self::Mandelbulb,
        Self::SierpinskiTetrahedron,
        Self::KochTetrahedron,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Mandelbulb => "Mandelbulb",
            Self::SierpinskiTetrahedron => "SierpinskiTetrahedron",
            Self::KochTetrahedron => "KochTetrahedron",
        }
    }

    pub fn record(self) -> &'static Elementary {
        match self {
            Self::Mandelbulb => &MANDELBULB,
            Self::SierpinskiTetrahedron => &SIERPINSKI_TETRAHEDRON,
            Self::KochTetrahedron => &KOCH_TETRAHEDRON,
        }
    }

    pub fn eval(self, p: Vec3, params: &[Parameter]) -> f32 {
        match self {
            Self::Mandelbulb => fractals::mandelbulb(p, params.int(0), params.float(1)),
            Self::SierpinskiTetrahedron => fractals::sierpinski_tetrahedron(p, params.int(0)),
            Self::KochTetrahedron => fractals::koch_tetrahedron(p, params.int(0)),
        }
    }
}

impl Fractal2D {
    pub const ALL: [Self; 2] = [Self::Mandelbrot, Self::Julia];

    pub fn name(self) -> &'static str {
        match self {
            Self::Mandelbrot => "Mandelbrot",
            Self::Julia => "Julia",
        }
    }

    pub fn record(self) -> &'static Elementary {
        match self {
            Self::Mandelbrot => &MANDELBROT,
            Self::Julia => &JULIA,
        }
    }

    pub fn eval(self, p: Vec3, params: &[Parameter]) -> f32 {
        match self {
            Self::Mandelbrot => fractals::mandelbrot(p, params.int(0)),
            Self::Julia => fractals::julia(p, params.int(0), params.vec2(1)),
        }
    }
}
