//! Reference evaluator
//!
//! A small host interpreter for compiled expressions. It reads the same text a
//! shader would receive (re-parsed into an [`Expr`]) and evaluates it against
//! the builtin library below, which calls straight into `ferm-math`. Agreement
//! between this interpreter and [`crate::cpu_eval`] is what the equivalence
//! tests check.
//!
//! ```rust
//! use ferm_sdf::reference::{Bindings, Program};
//! use ferm_sdf::{ParamStyle, Primitive, Node, Scene};
//! use glam::Vec3;
//!
//! let scene = Scene::new(vec![Node::shape(Primitive::Sphere)]);
//! let compiled = scene.compile()?;
//! let program = Program::from_text(&compiled, ParamStyle::Identifier)?;
//!
//! let mut bindings = Bindings::new();
//! scene.bind_parameters(&mut bindings);
//! let d = program.evaluate(Vec3::new(3.0, 0.0, 0.0), &bindings)?;
//! assert!((d - 2.0).abs() < 1e-6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::codegen::{Compiled, Helper};
use crate::error::EvalError;
use crate::expr::{BinOp, Expr, ParamStyle, Slot, parse};
use crate::param::{ParamType, ParamValue, ParameterSink};
use ferm_math::{blend, fractals, planar, shapes, warp};
use glam::{Quat, Vec2, Vec3, Vec4};
use std::collections::HashMap;

/// A runtime value: scalar or 2-4 lane vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Scalar(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl Value {
    fn lanes(self) -> (usize, [f32; 4]) {
        match self {
            Self::Scalar(v) => (1, [v, 0.0, 0.0, 0.0]),
            Self::Vec2(v) => (2, [v.x, v.y, 0.0, 0.0]),
            Self::Vec3(v) => (3, [v.x, v.y, v.z, 0.0]),
            Self::Vec4(v) => (4, v.to_array()),
        }
    }

    fn from_lanes(n: usize, l: [f32; 4]) -> Self {
        match n {
            1 => Self::Scalar(l[0]),
            2 => Self::Vec2(Vec2::new(l[0], l[1])),
            3 => Self::Vec3(Vec3::new(l[0], l[1], l[2])),
            _ => Self::Vec4(Vec4::from_array(l)),
        }
    }

    /// Component-wise combination; a scalar operand is broadcast.
    fn zip(self, other: Self, symbol: char, f: impl Fn(f32, f32) -> f32) -> Result<Self, EvalError> {
        let (na, la) = self.lanes();
        let (nb, lb) = other.lanes();
        let n = match (na, nb) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => return Err(EvalError::Operand(symbol)),
        };
        let mut out = [0.0; 4];
        for (i, slot) in out.iter_mut().enumerate().take(n) {
            let a = la[if na == 1 { 0 } else { i }];
            let b = lb[if nb == 1 { 0 } else { i }];
            *slot = f(a, b);
        }
        Ok(Self::from_lanes(n, out))
    }

    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        let (n, mut l) = self.lanes();
        for v in &mut l {
            *v = f(*v);
        }
        Self::from_lanes(n, l)
    }

    fn length(self) -> f32 {
        match self {
            Self::Scalar(v) => v.abs(),
            Self::Vec2(v) => v.length(),
            Self::Vec3(v) => v.length(),
            Self::Vec4(v) => v.length(),
        }
    }
}

impl From<ParamValue> for Value {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Float(v) => Self::Scalar(v),
            ParamValue::Int(v) => Self::Scalar(v as f32),
            ParamValue::Axis(a) => Self::Scalar(a.index() as f32),
            ParamValue::Vector2(v) => Self::Vec2(v),
            ParamValue::Vector3(v) => Self::Vec3(v),
            ParamValue::Quaternion(q) => Self::Vec4(Vec4::new(q.x, q.y, q.z, q.w)),
        }
    }
}

/// Values of identifier-style parameters, filled through [`ParameterSink`]
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(id.into(), value.into());
    }

    pub fn get(&self, id: &str) -> Option<Value> {
        self.values.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ParameterSink for Bindings {
    fn bind(&mut self, id: &str, _ty: ParamType, value: ParamValue) {
        self.insert(id, value);
    }
}

/// An expression plus the helpers it calls
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub expression: Expr,
    pub helpers: Vec<Helper>,
}

impl Program {
    /// Evaluate the compiled tree directly.
    pub fn from_compiled(compiled: &Compiled) -> Self {
        Self {
            expression: compiled.expression.clone(),
            helpers: compiled.helpers.clone(),
        }
    }

    /// Render every part to text in `style` and parse it back, so evaluation
    /// sees exactly what a shader would.
    pub fn from_text(compiled: &Compiled, style: ParamStyle) -> Result<Self, EvalError> {
        let reparse = |e: &Expr| -> Result<Expr, EvalError> { Ok(parse(&e.render(style)?)?) };

        let helpers = compiled
            .helpers
            .iter()
            .map(|h| {
                Ok(Helper {
                    name: h.name.clone(),
                    iterations: reparse(&h.iterations)?,
                    input: reparse(&h.input)?,
                    body: reparse(&h.body)?,
                    output: reparse(&h.output)?,
                })
            })
            .collect::<Result<Vec<_>, EvalError>>()?;

        Ok(Self {
            expression: reparse(&compiled.expression)?,
            helpers,
        })
    }

    pub fn evaluate(&self, p: Vec3, bindings: &Bindings) -> Result<f32, EvalError> {
        evaluate(&self.expression, p, &self.helpers, bindings)
    }
}

/// Evaluate `expr` at `p`; `@pos` reads `p`, identifiers read `bindings`.
pub fn evaluate(expr: &Expr, p: Vec3, helpers: &[Helper], bindings: &Bindings) -> Result<f32, EvalError> {
    let interp = Interpreter { helpers, bindings };
    let scope = Scope {
        at: Some(p),
        ..Scope::default()
    };
    match interp.eval(expr, &scope)? {
        Value::Scalar(v) => Ok(v),
        _ => Err(EvalError::NotScalar),
    }
}

/// Locals visible to an expression
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    /// `@pos`
    at: Option<Vec3>,
    /// Helper local `pos`
    pos: Option<Vec3>,
    /// Helper local `toReturn`
    to_return: Option<f32>,
}

struct Interpreter<'a> {
    helpers: &'a [Helper],
    bindings: &'a Bindings,
}

/// Evaluated call arguments with typed accessors
struct Args<'a> {
    function: &'a str,
    values: Vec<Value>,
}

impl Args<'_> {
    fn mismatch(&self, index: usize, expected: &'static str) -> EvalError {
        EvalError::ArgumentType {
            function: self.function.to_string(),
            index,
            expected,
        }
    }

    fn value(&self, index: usize) -> Value {
        self.values[index]
    }

    fn float(&self, index: usize) -> Result<f32, EvalError> {
        match self.value(index) {
            Value::Scalar(v) => Ok(v),
            _ => Err(self.mismatch(index, "float")),
        }
    }

    fn int(&self, index: usize) -> Result<i32, EvalError> {
        self.float(index).map(|v| v.round() as i32)
    }

    fn vec2(&self, index: usize) -> Result<Vec2, EvalError> {
        match self.value(index) {
            Value::Vec2(v) => Ok(v),
            _ => Err(self.mismatch(index, "float2")),
        }
    }

    fn vec3(&self, index: usize) -> Result<Vec3, EvalError> {
        match self.value(index) {
            Value::Vec3(v) => Ok(v),
            _ => Err(self.mismatch(index, "float3")),
        }
    }

    fn quat(&self, index: usize) -> Result<Quat, EvalError> {
        match self.value(index) {
            Value::Vec4(v) => Ok(Quat::from_vec4(v)),
            _ => Err(self.mismatch(index, "float4")),
        }
    }
}

/// Builtin callables and their arities
const BUILTINS: &[(&str, usize)] = &[
    ("float2", 2),
    ("float3", 3),
    ("float4", 4),
    ("length", 1),
    ("abs", 1),
    ("min", 2),
    ("max", 2),
    // Shapes
    ("Arch", 4),
    ("Box", 2),
    ("RoundedBox", 3),
    ("Pipe", 4),
    ("InfinitePipe", 3),
    ("Plane", 2),
    ("Pyramid", 3),
    ("Sphere", 2),
    ("Ellipsoid", 2),
    ("Torus", 2),
    ("Capsule", 3),
    ("Cone", 3),
    ("CappedCone", 4),
    ("RoundedCone", 4),
    ("Cylinder", 2),
    ("InfiniteCylinder", 2),
    ("RoundedCylinder", 4),
    ("TriPrism", 3),
    ("HexPrism", 3),
    ("Tetrahedron", 2),
    ("Octahedron", 2),
    // Planar
    ("Circle", 2),
    ("Triangle", 4),
    ("Quad", 3),
    ("Polygon", 3),
    ("Rouleaux", 3),
    ("Spiral", 4),
    ("Sector", 3),
    // Fractals
    ("Mandelbulb", 3),
    ("SierpinskiTetrahedron", 2),
    ("KochTetrahedron", 2),
    ("Mandelbrot", 2),
    ("Julia", 3),
    // Space warps
    ("InverseTransform", 4),
    ("InverseRotate", 2),
    ("InverseScale", 2),
    ("Scale", 2),
    ("Mirror", 3),
    ("Repeat", 2),
    ("RepeatX", 2),
    ("RepeatXZ", 2),
    ("Modulo", 2),
    ("ModuloX", 2),
    ("ModuloXZ", 2),
    ("Elongate", 2),
    ("Twist", 3),
    ("Bend", 4),
    ("Shear", 7),
    ("Revolve", 2),
    ("Wobble", 3),
    // Combinators
    ("Union", 2),
    ("Intersect", 2),
    ("Difference", 2),
    ("SmoothUnion", 3),
    ("SmoothIntersect", 3),
    ("SmoothDifference", 3),
    ("DeformedMix", 6),
];

fn arity_check(function: &str, expected: usize, found: usize) -> Result<(), EvalError> {
    if expected == found {
        Ok(())
    } else {
        Err(EvalError::Arity {
            function: function.to_string(),
            expected,
            found,
        })
    }
}

impl Interpreter<'_> {
    fn eval(&self, expr: &Expr, scope: &Scope) -> Result<Value, EvalError> {
        match expr {
            Expr::Num(v) => Ok(Value::Scalar(*v)),
            Expr::Param(param) => Ok(param.value.into()),
            Expr::Slot(Slot::Pos) => scope.at.map(Value::Vec3).ok_or(EvalError::UnresolvedSlot(Slot::Pos)),
            Expr::Slot(slot) => Err(EvalError::UnresolvedSlot(*slot)),
            Expr::Var(name) => self.variable(name, scope),
            Expr::Neg(inner) => Ok(self.eval(inner, scope)?.map(|v| -v)),
            Expr::Binary { op, lhs, rhs } => {
                let a = self.eval(lhs, scope)?;
                let b = self.eval(rhs, scope)?;
                let f: fn(f32, f32) -> f32 = match op {
                    BinOp::Add => |a, b| a + b,
                    BinOp::Sub => |a, b| a - b,
                    BinOp::Mul => |a, b| a * b,
                    BinOp::Div => |a, b| a / b,
                };
                a.zip(b, op.symbol(), f)
            }
            Expr::Call { name, args } => {
                let values = args
                    .iter()
                    .map(|a| self.eval(a, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(name, values)
            }
        }
    }

    fn variable(&self, name: &str, scope: &Scope) -> Result<Value, EvalError> {
        let local = match name {
            "pos" => scope.pos.map(Value::Vec3),
            "toReturn" => scope.to_return.map(Value::Scalar),
            _ => None,
        };
        local
            .or_else(|| self.bindings.get(name))
            .ok_or_else(|| EvalError::UnboundVariable(name.to_string()))
    }

    fn call(&self, name: &str, values: Vec<Value>) -> Result<Value, EvalError> {
        if let Some(&(_, arity)) = BUILTINS.iter().find(|(f, _)| *f == name) {
            arity_check(name, arity, values.len())?;
            return builtin(&Args { function: name, values });
        }
        if let Some(helper) = self.helpers.iter().find(|h| h.name == name) {
            arity_check(name, 1, values.len())?;
            let args = Args { function: name, values };
            return self.helper(helper, args.vec3(0)?).map(Value::Scalar);
        }
        Err(EvalError::UnknownFunction(name.to_string()))
    }

    /// Run a recurse helper exactly as its generated source does.
    fn helper(&self, helper: &Helper, p: Vec3) -> Result<f32, EvalError> {
        let mut scope = Scope {
            pos: Some(p),
            ..Scope::default()
        };
        let n = scalar(self.eval(&helper.iterations, &scope)?, &helper.name)?.round() as i32;

        for _ in 0..n {
            scope.pos = Some(vector(self.eval(&helper.input, &scope)?, &helper.name)?);
        }
        let mut value = scalar(self.eval(&helper.body, &scope)?, &helper.name)?;
        for _ in 0..n {
            scope.to_return = Some(value);
            value = scalar(self.eval(&helper.output, &scope)?, &helper.name)?;
        }
        Ok(value)
    }
}

fn scalar(value: Value, function: &str) -> Result<f32, EvalError> {
    match value {
        Value::Scalar(v) => Ok(v),
        _ => Err(EvalError::ArgumentType {
            function: function.to_string(),
            index: 0,
            expected: "float",
        }),
    }
}

fn vector(value: Value, function: &str) -> Result<Vec3, EvalError> {
    match value {
        Value::Vec3(v) => Ok(v),
        _ => Err(EvalError::ArgumentType {
            function: function.to_string(),
            index: 0,
            expected: "float3",
        }),
    }
}

// One arm per builtin
#[allow(clippy::too_many_lines)]
fn builtin(a: &Args<'_>) -> Result<Value, EvalError> {
    use Value::Scalar as S;
    use Value::Vec3 as V3;

    let v = match a.function {
        "float2" => Value::Vec2(Vec2::new(a.float(0)?, a.float(1)?)),
        "float3" => V3(Vec3::new(a.float(0)?, a.float(1)?, a.float(2)?)),
        "float4" => Value::Vec4(Vec4::new(a.float(0)?, a.float(1)?, a.float(2)?, a.float(3)?)),
        "length" => S(a.value(0).length()),
        "abs" => a.value(0).map(f32::abs),
        "min" => a.value(0).zip(a.value(1), ',', f32::min)?,
        "max" => a.value(0).zip(a.value(1), ',', f32::max)?,

        "Arch" => S(shapes::arch(a.vec3(0)?, a.vec3(1)?, a.float(2)?, a.float(3)?)),
        "Box" => S(shapes::cuboid(a.vec3(0)?, a.vec3(1)?)),
        "RoundedBox" => S(shapes::rounded_box(a.vec3(0)?, a.vec3(1)?, a.float(2)?)),
        "Pipe" => S(shapes::pipe(a.vec3(0)?, a.float(1)?, a.float(2)?, a.float(3)?)),
        "InfinitePipe" => S(shapes::infinite_pipe(a.vec3(0)?, a.float(1)?, a.float(2)?)),
        "Plane" => S(shapes::plane(a.vec3(0)?, a.float(1)?)),
        "Pyramid" => S(shapes::pyramid(a.vec3(0)?, a.vec2(1)?, a.float(2)?)),
        "Sphere" => S(shapes::sphere(a.vec3(0)?, a.float(1)?)),
        "Ellipsoid" => S(shapes::ellipsoid(a.vec3(0)?, a.vec3(1)?)),
        "Torus" => S(shapes::torus(a.vec3(0)?, a.vec2(1)?)),
        "Capsule" => S(shapes::capsule(a.vec3(0)?, a.float(1)?, a.float(2)?)),
        "Cone" => S(shapes::cone(a.vec3(0)?, a.float(1)?, a.float(2)?)),
        "CappedCone" => S(shapes::capped_cone(a.vec3(0)?, a.float(1)?, a.float(2)?, a.float(3)?)),
        "RoundedCone" => S(shapes::rounded_cone(a.vec3(0)?, a.float(1)?, a.float(2)?, a.float(3)?)),
        "Cylinder" => S(shapes::cylinder(a.vec3(0)?, a.vec2(1)?)),
        "InfiniteCylinder" => S(shapes::infinite_cylinder(a.vec3(0)?, a.float(1)?)),
        "RoundedCylinder" => {
            S(shapes::rounded_cylinder(a.vec3(0)?, a.float(1)?, a.float(2)?, a.float(3)?))
        }
        "TriPrism" => S(shapes::tri_prism(a.vec3(0)?, a.float(1)?, a.float(2)?)),
        "HexPrism" => S(shapes::hex_prism(a.vec3(0)?, a.float(1)?, a.float(2)?)),
        "Tetrahedron" => S(shapes::tetrahedron(a.vec3(0)?, a.float(1)?)),
        "Octahedron" => S(shapes::octahedron(a.vec3(0)?, a.float(1)?)),

        "Circle" => S(planar::circle(a.vec3(0)?, a.float(1)?)),
        "Triangle" => S(planar::triangle(a.vec3(0)?, a.vec2(1)?, a.vec2(2)?, a.vec2(3)?)),
        "Quad" => S(planar::rectangle(a.vec3(0)?, a.vec2(1)?, a.float(2)?)),
        "Polygon" => S(planar::polygon(a.vec3(0)?, a.float(1)?, a.int(2)?)),
        "Rouleaux" => S(planar::rouleaux(a.vec3(0)?, a.float(1)?, a.int(2)?)),
        "Spiral" => S(planar::spiral(a.vec3(0)?, a.float(1)?, a.float(2)?, a.float(3)?)),
        "Sector" => S(planar::sector(a.vec3(0)?, a.float(1)?, a.float(2)?)),

        "Mandelbulb" => S(fractals::mandelbulb(a.vec3(0)?, a.int(1)?, a.float(2)?)),
        "SierpinskiTetrahedron" => S(fractals::sierpinski_tetrahedron(a.vec3(0)?, a.int(1)?)),
        "KochTetrahedron" => S(fractals::koch_tetrahedron(a.vec3(0)?, a.int(1)?)),
        "Mandelbrot" => S(fractals::mandelbrot(a.vec3(0)?, a.int(1)?)),
        "Julia" => S(fractals::julia(a.vec3(0)?, a.int(1)?, a.vec2(2)?)),

        "InverseTransform" => V3(warp::inverse_transform(a.vec3(0)?, a.quat(1)?, a.float(2)?, a.vec3(3)?)),
        "InverseRotate" => V3(warp::inverse_rotate(a.quat(0)?, a.vec3(1)?)),
        "InverseScale" => V3(warp::inverse_scale(a.vec3(0)?, a.vec3(1)?)),
        "Scale" => S(warp::scale_distance(a.vec3(0)?, a.float(1)?)),
        "Mirror" => V3(warp::mirror(a.vec3(0)?, a.vec3(1)?, a.float(2)?)),
        "Repeat" => V3(warp::repeat_all(a.vec3(0)?, a.vec3(1)?)),
        "RepeatX" => V3(warp::repeat_x(a.vec3(0)?, a.float(1)?)),
        "RepeatXZ" => V3(warp::repeat_xz(a.vec3(0)?, a.vec2(1)?)),
        "Modulo" => V3(warp::modulo_all(a.vec3(0)?, a.vec3(1)?)),
        "ModuloX" => V3(warp::modulo_x(a.vec3(0)?, a.float(1)?)),
        "ModuloXZ" => V3(warp::modulo_xz(a.vec3(0)?, a.vec2(1)?)),
        "Elongate" => V3(warp::elongate(a.vec3(0)?, a.vec3(1)?)),
        "Twist" => V3(warp::twist(a.vec3(0)?, a.vec3(1)?, a.float(2)?)),
        "Bend" => V3(warp::bend(a.vec3(0)?, a.vec3(1)?, a.vec3(2)?, a.float(3)?)),
        "Shear" => V3(warp::shear(
            a.vec3(0)?,
            a.float(1)?,
            a.float(2)?,
            a.float(3)?,
            a.float(4)?,
            a.float(5)?,
            a.float(6)?,
        )),
        "Revolve" => V3(warp::revolve(a.vec3(0)?, a.quat(1)?)),
        "Wobble" => S(warp::wobble(a.vec3(0)?, a.float(1)?, a.vec3(2)?)),

        "Union" => S(blend::union(a.float(0)?, a.float(1)?)),
        "Intersect" => S(blend::intersect(a.float(0)?, a.float(1)?)),
        "Difference" => S(blend::difference(a.float(0)?, a.float(1)?)),
        "SmoothUnion" => S(blend::smooth_union(a.float(0)?, a.float(1)?, a.float(2)?)),
        "SmoothIntersect" => S(blend::smooth_intersect(a.float(0)?, a.float(1)?, a.float(2)?)),
        "SmoothDifference" => S(blend::smooth_difference(a.float(0)?, a.float(1)?, a.float(2)?)),
        "DeformedMix" => S(blend::deformed_mix(
            a.float(0)?,
            a.float(1)?,
            a.float(2)?,
            a.float(3)?,
            a.float(4)?,
            a.float(5)?,
        )),

        other => return Err(EvalError::UnknownFunction(other.to_string())),
    };
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, p: Vec3) -> Result<f32, EvalError> {
        evaluate(&parse(src).unwrap(), p, &[], &Bindings::new())
    }

    #[test]
    fn test_arithmetic_and_broadcast() {
        let d = eval("length(@pos * 2.0 - float3(1.0, 0.0, 0.0))", Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!((d - 1.0).abs() < 1e-6);
        assert_eq!(eval("-(1.0 + 2.0) * 3.0", Vec3::ZERO), Ok(-9.0));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            eval("Nope(@pos)", Vec3::ZERO),
            Err(EvalError::UnknownFunction("Nope".into()))
        );
        assert_eq!(
            eval("Sphere(@pos, par0)", Vec3::ZERO),
            Err(EvalError::UnboundVariable("par0".into()))
        );
        assert!(matches!(
            eval("Sphere(@pos)", Vec3::ZERO),
            Err(EvalError::Arity { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            eval("Sphere(1.0, 1.0)", Vec3::ZERO),
            Err(EvalError::ArgumentType { index: 0, expected: "float3", .. })
        ));
        assert_eq!(eval("float2(1.0, 2.0) + float3(1.0, 2.0, 3.0)", Vec3::ZERO), Err(EvalError::Operand('+')));
        assert_eq!(eval("@pos", Vec3::ZERO), Err(EvalError::NotScalar));
        assert_eq!(eval("@fnc", Vec3::ZERO), Err(EvalError::UnresolvedSlot(Slot::Fnc)));
    }

    #[test]
    fn test_bindings_from_sink() {
        let mut b = Bindings::new();
        b.bind("par0", ParamType::Float, ParamValue::Float(2.0));
        b.bind("par1", ParamType::Int, ParamValue::Int(3));
        assert_eq!(b.len(), 2);
        assert_eq!(b.get("par1"), Some(Value::Scalar(3.0)));

        let d = evaluate(&parse("Sphere(@pos, par0)").unwrap(), Vec3::new(5.0, 0.0, 0.0), &[], &b).unwrap();
        assert!((d - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_helper_loops() {
        // pos -= (1, 0, 0) twice, then toReturn += 1 twice
        let helper = Helper {
            name: "hlp0".into(),
            iterations: Expr::Num(2.0),
            input: parse("pos - float3(1.0, 0.0, 0.0)").unwrap(),
            body: parse("length(pos)").unwrap(),
            output: parse("toReturn + 1.0").unwrap(),
        };
        let d = evaluate(
            &parse("hlp0(@pos)").unwrap(),
            Vec3::new(5.0, 0.0, 0.0),
            std::slice::from_ref(&helper),
            &Bindings::new(),
        )
        .unwrap();
        assert!((d - 5.0).abs() < 1e-6);
    }
}
