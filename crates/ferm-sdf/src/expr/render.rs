//! Expression → shader text
//!
//! Emits the minimum parentheses needed to reproduce the tree's grouping, so
//! re-parsing rendered text yields an equivalent tree.

// String writing is infallible
#![allow(clippy::unwrap_used)]

use super::{Expr, ParamRef};
use crate::error::CompileError;
use crate::param::ParamValue;
use std::fmt::Write;

/// How bound parameters appear in rendered text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamStyle {
    /// Shader identifier (`par03`), the value is bound per tick
    #[default]
    Identifier,
    /// Current value baked in as a literal
    Literal,
}

const PREC_UNARY: u8 = 3;
const PREC_ATOM: u8 = 4;

/// Shortest round-trip float form that always carries a decimal point or exponent.
///
/// NaN and infinities have no shader literal.
pub(crate) fn float_literal(v: f32) -> Result<String, CompileError> {
    if v.is_finite() {
        Ok(format!("{v:?}"))
    } else {
        Err(CompileError::NonFiniteLiteral(v))
    }
}

pub(crate) fn value_literal(value: &ParamValue) -> Result<String, CompileError> {
    let f = float_literal;
    Ok(match value {
        ParamValue::Float(v) => f(*v)?,
        ParamValue::Int(v) => v.to_string(),
        ParamValue::Axis(a) => a.index().to_string(),
        ParamValue::Vector2(v) => format!("float2({}, {})", f(v.x)?, f(v.y)?),
        ParamValue::Vector3(v) => format!("float3({}, {}, {})", f(v.x)?, f(v.y)?, f(v.z)?),
        ParamValue::Quaternion(q) => {
            format!("float4({}, {}, {}, {})", f(q.x)?, f(q.y)?, f(q.z)?, f(q.w)?)
        }
    })
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Binary { op, .. } => op.precedence(),
        Expr::Neg(_) => PREC_UNARY,
        Expr::Num(v) if v.is_sign_negative() => PREC_UNARY,
        Expr::Param(ParamRef { value, .. }) => match value {
            ParamValue::Float(v) if v.is_sign_negative() => PREC_UNARY,
            ParamValue::Int(v) if *v < 0 => PREC_UNARY,
            _ => PREC_ATOM,
        },
        _ => PREC_ATOM,
    }
}

struct Renderer {
    style: ParamStyle,
    out: String,
}

impl Renderer {
    fn grouped(&mut self, expr: &Expr, parens: bool) -> Result<(), CompileError> {
        if parens {
            self.out.push('(');
        }
        self.expr(expr)?;
        if parens {
            self.out.push(')');
        }
        Ok(())
    }

    fn param(&mut self, param: &ParamRef) -> Result<(), CompileError> {
        match (self.style, &param.id) {
            (ParamStyle::Identifier, Some(id)) => self.out.push_str(id),
            (ParamStyle::Identifier, None) => {
                return Err(CompileError::UnassignedIdentifier(param.name.to_string()));
            }
            (ParamStyle::Literal, _) => self.out.push_str(&value_literal(&param.value)?),
        }
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Num(v) => self.out.push_str(&float_literal(*v)?),
            Expr::Var(name) => self.out.push_str(name),
            Expr::Slot(slot) => write!(self.out, "{slot}").unwrap(),
            Expr::Param(param) => self.param(param)?,
            Expr::Call { name, args } => {
                self.out.push_str(name);
                self.out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(arg)?;
                }
                self.out.push(')');
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                self.grouped(lhs, precedence(lhs) < prec)?;
                write!(self.out, " {} ", op.symbol()).unwrap();
                self.grouped(rhs, precedence(rhs) <= prec)?;
            }
            Expr::Neg(inner) => {
                self.out.push('-');
                // `--x` would lex as a decrement
                self.grouped(inner, precedence(inner) <= PREC_UNARY)?;
            }
        }
        Ok(())
    }
}

impl Expr {
    /// Render to shader text.
    ///
    /// Fails for [`ParamStyle::Identifier`] when a bound parameter has no
    /// identifier yet, and for any number or literal value that is not finite.
    pub fn render(&self, style: ParamStyle) -> Result<String, CompileError> {
        let mut renderer = Renderer {
            style,
            out: String::new(),
        };
        renderer.expr(self)?;
        Ok(renderer.out)
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use crate::param::ParamTemplate;

    fn roundtrip(src: &str) -> String {
        parse(src).unwrap().render(ParamStyle::Literal).unwrap()
    }

    #[test]
    fn test_minimal_parentheses() {
        assert_eq!(roundtrip("(a + b) * c"), "(a + b) * c");
        assert_eq!(roundtrip("a + (b * c)"), "a + b * c");
        assert_eq!(roundtrip("a - (b - c)"), "a - (b - c)");
        assert_eq!(roundtrip("(a - b) - c"), "a - b - c");
        assert_eq!(roundtrip("-(-a)"), "-(-a)");
        assert_eq!(roundtrip("-(a + b)"), "-(a + b)");
        assert_eq!(roundtrip("max(-a, b)"), "max(-a, b)");
    }

    #[test]
    fn test_float_literals() {
        assert_eq!(float_literal(1e6).unwrap(), "1000000.0");
        assert_eq!(float_literal(1.0).unwrap(), "1.0");
        assert_eq!(float_literal(0.5).unwrap(), "0.5");
    }

    #[test]
    fn test_non_finite_values_do_not_render() {
        assert_eq!(
            float_literal(f32::INFINITY),
            Err(CompileError::NonFiniteLiteral(f32::INFINITY))
        );
        assert!(float_literal(f32::NAN).is_err());
        assert!(Expr::Num(f32::NEG_INFINITY).render(ParamStyle::Literal).is_err());

        let mut p = ParamTemplate::vec3("size", 1.0, 1.0, 1.0).instantiate();
        p.set_value(glam::Vec3::new(1.0, f32::NAN, 1.0)).unwrap();
        p.assign_identifier(0, 1);
        let e = parse("Box(@pos, @par0)").unwrap().bind_params(std::slice::from_ref(&p));
        assert!(matches!(
            e.render(ParamStyle::Literal),
            Err(CompileError::NonFiniteLiteral(v)) if v.is_nan()
        ));
        // Identifiers carry no value, so the bound name still renders
        assert_eq!(e.render(ParamStyle::Identifier).unwrap(), "Box(@pos, par0)");
    }

    #[test]
    fn test_param_styles() {
        let mut p = ParamTemplate::vec3("size", 1.0, 2.0, 0.5).instantiate();
        let unassigned = parse("Box(@pos, @par0)").unwrap().bind_params(std::slice::from_ref(&p));
        assert_eq!(
            unassigned.render(ParamStyle::Literal).unwrap(),
            "Box(@pos, float3(1.0, 2.0, 0.5))"
        );
        assert_eq!(
            unassigned.render(ParamStyle::Identifier),
            Err(CompileError::UnassignedIdentifier("size".into()))
        );

        p.assign_identifier(3, 12);
        let bound = parse("Box(@pos, @par0)").unwrap().bind_params(std::slice::from_ref(&p));
        assert_eq!(bound.render(ParamStyle::Identifier).unwrap(), "Box(@pos, par03)");
    }

    #[test]
    fn test_negative_parameter_keeps_grouping() {
        let mut p = ParamTemplate::float("amount", 0.5).instantiate();
        p.set_value(-0.25).unwrap();
        let e = parse("@fnc - @par0").unwrap().bind_params(std::slice::from_ref(&p));
        assert_eq!(e.render(ParamStyle::Literal).unwrap(), "@fnc - -0.25");
    }
}
