//! Text backend: node tree → distance expression
//!
//! Composition order per node, innermost first:
//!
//! ```text
//! elementary template / mixer fold
//!   → shape transform      (TransformMode::ApplyBeforeModifiers)
//!   → inner modifiers
//!   → hlpNN(@pos) helper   (active recurse with targets)
//!   → outer modifiers
//!   → shape transform      (TransformMode::ApplyAfterModifiers)
//! ```
//!
//! Helpers are emitted children first, so each one is declared before any
//! helper that calls it.

// String writing is infallible
#![allow(clippy::unwrap_used)]

use crate::error::CompileError;
use crate::expr::{self, Expr, ParamRef, ParamStyle, Slot};
use crate::geometry::Geometry;
use crate::modifier::{ModifierKind, apply_text};
use crate::node::{Node, NodeKind, TransformMode};
use crate::param::Parameter;
use ferm_math::NO_GEOMETRY;
use std::fmt::Write;

/// Local holding the recursed position inside a helper
const POS_LOCAL: &str = "pos";
/// Local holding the running distance inside a helper
const VALUE_LOCAL: &str = "toReturn";

/// A generated recurse loop.
///
/// `input`, `body` and `output` read the locals `pos` (and, for `output`,
/// `toReturn`) instead of `@pos`.
#[derive(Debug, Clone, PartialEq)]
pub struct Helper {
    pub name: String,
    /// Loop count, the recurse modifier's `Iterations` parameter
    pub iterations: Expr,
    /// Targeted pre transforms, applied once per iteration
    pub input: Expr,
    /// Inner distance at the recursed position
    pub body: Expr,
    /// Targeted post transforms, applied once per iteration
    pub output: Expr,
}

impl Helper {
    /// Shader source of the helper function.
    pub fn source(&self, style: ParamStyle) -> Result<String, CompileError> {
        let n = self.iterations.render(style)?;
        let mut out = String::new();
        writeln!(out, "inline float {}(float3 {}) {{", self.name, POS_LOCAL).unwrap();
        writeln!(out, "    for (int i = 0; i < {n}; i++) {{").unwrap();
        writeln!(out, "        {} = {};", POS_LOCAL, self.input.render(style)?).unwrap();
        writeln!(out, "    }}").unwrap();
        writeln!(out, "    float {} = {};", VALUE_LOCAL, self.body.render(style)?).unwrap();
        writeln!(out, "    for (int j = 0; j < {n}; j++) {{").unwrap();
        writeln!(out, "        {} = {};", VALUE_LOCAL, self.output.render(style)?).unwrap();
        writeln!(out, "    }}").unwrap();
        writeln!(out, "    return {VALUE_LOCAL};").unwrap();
        writeln!(out, "}}").unwrap();
        Ok(out)
    }
}

/// Output of compiling one root (or a scene)
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// Distance expression; only `@pos` remains unresolved
    pub expression: Expr,
    /// Recurse helpers in declaration order
    pub helpers: Vec<Helper>,
    /// Active parameters in identifier order
    pub parameters: Vec<Parameter>,
    pub geometry: Geometry,
}

impl Compiled {
    /// The distance expression as shader text.
    pub fn render(&self, style: ParamStyle) -> Result<String, CompileError> {
        self.expression.render(style)
    }

    /// Every helper function, in declaration order.
    pub fn helper_source(&self, style: ParamStyle) -> Result<String, CompileError> {
        let mut out = String::new();
        for helper in &self.helpers {
            out.push_str(&helper.source(style)?);
        }
        Ok(out)
    }

    /// One declaration per assigned parameter, e.g. `float3 par03;`
    pub fn declarations(&self) -> String {
        self.parameters
            .iter()
            .filter_map(Parameter::declaration)
            .fold(String::new(), |mut out, line| {
                writeln!(out, "{line}").unwrap();
                out
            })
    }
}

fn transform_wrap(node: &Node, acc: &Expr) -> Result<Expr, CompileError> {
    match node.transform_params() {
        Some(t) => ModifierKind::Transform.apply(t, acc),
        None => Ok(acc.clone()),
    }
}

fn base_expression(node: &Node, helpers: &mut Vec<Helper>) -> Result<Expr, CompileError> {
    match &node.kind {
        NodeKind::Shape(kind) => {
            Ok(expr::template(kind.record().template)?.bind_params(node.own_params()))
        }
        NodeKind::Mixer { kind, children } => {
            let compiled = children
                .iter()
                .filter(|c| c.enabled)
                .map(|c| expression(c, helpers))
                .collect::<Result<Vec<_>, _>>()?;
            kind.fold_text(compiled, node.own_params())
        }
    }
}

/// Compile one node to an expression, pushing recurse helpers.
pub(crate) fn expression(node: &Node, helpers: &mut Vec<Helper>) -> Result<Expr, CompileError> {
    if !node.enabled {
        return Ok(Expr::Num(NO_GEOMETRY));
    }

    let mut base = base_expression(node, helpers)?;
    if node.transform_mode == TransformMode::ApplyBeforeModifiers {
        base = transform_wrap(node, &base)?;
    }

    let partition = node.modifiers.partition();
    let composed = match partition.recurse {
        Some(recurse) if !partition.targeted.is_empty() => {
            let name = recurse.helper_name().ok_or(CompileError::UnnamedHelper)?;
            let pos = Expr::var(POS_LOCAL);

            let input = partition
                .targeted
                .iter()
                .try_fold(Expr::Slot(Slot::Pos), |acc, m| m.apply_input(&acc))?;
            let body = apply_text(&partition.inner, base)?;
            let output = partition
                .targeted
                .iter()
                .try_fold(Expr::var(VALUE_LOCAL), |acc, m| m.apply_output(&acc))?;

            helpers.push(Helper {
                name: name.to_string(),
                iterations: Expr::Param(ParamRef::from(&recurse.params()[0])),
                input: input.substitute(Slot::Pos, &pos),
                body: body.substitute(Slot::Pos, &pos),
                output: output.substitute(Slot::Pos, &pos),
            });
            tracing::trace!("helper {name} loops {} modifier(s)", partition.targeted.len());

            let call = Expr::call(name, vec![Expr::Slot(Slot::Pos)]);
            apply_text(&partition.outer, call)?
        }
        _ => {
            let inner = apply_text(&partition.inner, base)?;
            apply_text(&partition.outer, inner)?
        }
    };

    if node.transform_mode == TransformMode::ApplyAfterModifiers {
        transform_wrap(node, &composed)
    } else {
        Ok(composed)
    }
}
