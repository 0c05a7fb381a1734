//! Mixers: binary combinators folded over a node's children
//!
//! Children `[c1, c2, c3, ...]` are combined strictly left to right,
//! `mix(mix(c1, c2), c3)`, in both backends. Association matters for the
//! smooth variants. No children yields [`NO_GEOMETRY`]; a single child is
//! passed through untouched.

use crate::error::{CompileError, UnknownKind};
use crate::expr::{self, Expr, Slot};
use crate::geometry::Geometry;
use crate::param::{ParamTemplate as P, ParamTemplate, Parameter, ParamsExt};
use ferm_math::{NO_GEOMETRY, blend};
use std::fmt;
use std::str::FromStr;

/// Static description of a mixer kind
#[derive(Debug)]
pub struct MixerRecord {
    /// Combinator template over `@in1`, `@in2` and `@par<N>`
    pub template: &'static str,
    pub geometry: Geometry,
    pub params: &'static [ParamTemplate],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MixerKind {
    #[default]
    Union,
    UnionSmooth,
    UnionWobble,
    Intersect,
    IntersectSmooth,
    Difference,
    DifferenceSmooth,
}

static UNION: MixerRecord = MixerRecord {
    template: "Union(@in1, @in2)",
    geometry: Geometry::Exact,
    params: &[],
};

static INTERSECT: MixerRecord = MixerRecord {
    template: "Intersect(@in1, @in2)",
    geometry: Geometry::Bounded,
    params: &[],
};

static DIFFERENCE: MixerRecord = MixerRecord {
    template: "Difference(@in1, @in2)",
    geometry: Geometry::Bounded,
    params: &[],
};

static UNION_SMOOTH: MixerRecord = MixerRecord {
    template: "SmoothUnion(@in1, @in2, @par0)",
    geometry: Geometry::Bounded,
    params: &[P::float("strength", 0.5)],
};

static INTERSECT_SMOOTH: MixerRecord = MixerRecord {
    template: "SmoothIntersect(@in1, @in2, @par0)",
    geometry: Geometry::Bounded,
    params: &[P::float("strength", 0.5)],
};

static DIFFERENCE_SMOOTH: MixerRecord = MixerRecord {
    template: "SmoothDifference(@in1, @in2, @par0)",
    geometry: Geometry::Bounded,
    params: &[P::float("strength", 0.5)],
};

static UNION_WOBBLE: MixerRecord = MixerRecord {
    template: "DeformedMix(@in1, @in2, @par0, @par1, @par2, @par3)",
    geometry: Geometry::BoundedConditional,
    params: &[
        P::float("smooth", 0.5),
        P::float("frequency", 10.0),
        P::float("amplitude", 1.0),
        P::float("phase", 0.0),
    ],
};

impl MixerKind {
    pub const ALL: [Self; 7] = [
        Self::Union,
        Self::UnionSmooth,
        Self::UnionWobble,
        Self::Intersect,
        Self::IntersectSmooth,
        Self::Difference,
        Self::DifferenceSmooth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Union => "Union",
            Self::UnionSmooth => "UnionSmooth",
            Self::UnionWobble => "UnionWobble",
            Self::Intersect => "Intersect",
            Self::IntersectSmooth => "IntersectSmooth",
            Self::Difference => "Difference",
            Self::DifferenceSmooth => "DifferenceSmooth",
        }
    }

    pub fn record(self) -> &'static MixerRecord {
        match self {
            Self::Union => &UNION,
            Self::UnionSmooth => &UNION_SMOOTH,
            Self::UnionWobble => &UNION_WOBBLE,
            Self::Intersect => &INTERSECT,
            Self::IntersectSmooth => &INTERSECT_SMOOTH,
            Self::Difference => &DIFFERENCE,
            Self::DifferenceSmooth => &DIFFERENCE_SMOOTH,
        }
    }

    /// Combine one pair numerically; `a` is the accumulated left operand.
    pub fn mix(self, a: f32, b: f32, params: &[Parameter]) -> f32 {
        let k = params.float(0);
        match self {
            Self::Union => blend::union(a, b),
            Self::Intersect => blend::intersect(a, b),
            Self::Difference => blend::difference(a, b),
            Self::UnionSmooth => blend::smooth_union(a, b, k),
            Self::IntersectSmooth => blend::smooth_intersect(a, b, k),
            Self::DifferenceSmooth => blend::smooth_difference(a, b, k),
            Self::UnionWobble => {
                blend::deformed_mix(a, b, k, params.float(1), params.float(2), params.float(3))
            }
        }
    }

    /// Left fold of child distances.
    pub fn fold(self, values: impl IntoIterator<Item = f32>, params: &[Parameter]) -> f32 {
        values
            .into_iter()
            .reduce(|a, b| self.mix(a, b, params))
            .unwrap_or(NO_GEOMETRY)
    }

    /// Left fold of child expressions, the text mirror of [`MixerKind::fold`].
    pub fn fold_text(
        self,
        children: impl IntoIterator<Item = Expr>,
        params: &[Parameter],
    ) -> Result<Expr, CompileError> {
        let pair = expr::template(self.record().template)?.bind_params(params);
        let folded = children.into_iter().reduce(|a, b| {
            pair.map_slots(&mut |slot| match slot {
                Slot::In1 => Some(a.clone()),
                Slot::In2 => Some(b.clone()),
                _ => None,
            })
        });
        Ok(folded.unwrap_or(Expr::Num(NO_GEOMETRY)))
    }

    /// Geometry of the fold over `children`.
    pub fn fold_geometry(self, children: impl IntoIterator<Item = Geometry>) -> Geometry {
        let declared = self.record().geometry;
        children
            .into_iter()
            .reduce(|a, b| Geometry::combine(a, b, declared))
            .unwrap_or(Geometry::Exact)
    }
}

impl fmt::Display for MixerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MixerKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind {
                category: "mixer",
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{ParamStyle, parse};
    use crate::param::uniquate;
    use approx::assert_relative_eq;

    fn params(kind: MixerKind) -> Vec<Parameter> {
        uniquate(kind.record().params, &[]).0
    }

    #[test]
    fn test_union_fold() {
        let p = params(MixerKind::Union);
        assert_relative_eq!(MixerKind::Union.fold([2.0, 5.0, 1.0], &p), 1.0);
        assert_relative_eq!(MixerKind::Union.fold([7.5], &p), 7.5);
        assert_relative_eq!(MixerKind::Union.fold(std::iter::empty(), &p), NO_GEOMETRY);
    }

    #[test]
    fn test_smooth_union_associates_left() {
        let k = MixerKind::UnionSmooth;
        let p = params(k);
        let (a, b, c) = (0.0, 0.1, 0.2);

        let left = k.mix(k.mix(a, b, &p), c, &p);
        let right = k.mix(a, k.mix(b, c, &p), &p);
        assert_relative_eq!(k.fold([a, b, c], &p), left);
        assert!((left - right).abs() > 1e-3);
    }

    #[test]
    fn test_fold_text_nests_left() {
        let p = params(MixerKind::Union);
        let children = ["A(@pos)", "B(@pos)", "C(@pos)"].map(|s| parse(s).unwrap());
        let folded = MixerKind::Union.fold_text(children, &p).unwrap();
        assert_eq!(
            folded.render(ParamStyle::Literal).unwrap(),
            "Union(Union(A(@pos), B(@pos)), C(@pos))"
        );
    }

    #[test]
    fn test_empty_fold_text_is_sentinel() {
        let p = params(MixerKind::Intersect);
        let folded = MixerKind::Intersect.fold_text(Vec::new(), &p).unwrap();
        assert_eq!(folded.render(ParamStyle::Literal).unwrap(), "1000000.0");
    }

    #[test]
    fn test_fold_geometry() {
        use Geometry::*;
        assert_eq!(MixerKind::Union.fold_geometry([Exact, Exact]), Exact);
        assert_eq!(MixerKind::Intersect.fold_geometry([Exact, Exact]), Bounded);
        assert_eq!(MixerKind::Union.fold_geometry([Complex]), Complex);
        // A pair takes the mixer's declared tag
        assert_eq!(MixerKind::Union.fold_geometry([Complex, Complex]), Exact);
        assert_eq!(MixerKind::Union.fold_geometry([Exact, Distorted, Exact]), Distorted);
    }

    #[test]
    fn test_templates_fit_their_params() {
        for kind in MixerKind::ALL {
            let record = kind.record();
            let e = parse(record.template).unwrap();
            assert!(e.contains_slot(Slot::In1) && e.contains_slot(Slot::In2));
            for n in 0..record.params.len() {
                assert!(e.contains_slot(Slot::Par(n)), "{kind} never reads @par{n}");
            }
        }
    }
}
