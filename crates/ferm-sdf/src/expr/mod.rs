//! Distance expression IR
//!
//! Templates such as `"Capsule(@pos, @par0, @par1)"` are parsed once into an
//! [`Expr`] tree. Composition then works on trees:
//!
//! - `@par<N>` slots are bound to the owning node's parameters,
//! - `@pos`, `@fnc`, `@in1` and `@in2` slots are replaced by other trees,
//! - the finished tree is rendered to shader text (see [`render`]).
//!
//! Substitution never re-scans the inserted tree, so a replacement that itself
//! contains the slot being replaced is inserted as-is.

mod parse;
mod render;

pub use parse::parse;
pub use render::ParamStyle;

use crate::error::CompileError;
use crate::param::{ParamValue, Parameter};
use std::fmt;

/// Template placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Sample position
    Pos,
    /// N-th parameter of the owning node
    Par(usize),
    /// Wrapped distance function (modifier post templates)
    Fnc,
    /// Left operand of a mixer
    In1,
    /// Right operand of a mixer
    In2,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pos => f.write_str("@pos"),
            Self::Par(n) => write!(f, "@par{n}"),
            Self::Fnc => f.write_str("@fnc"),
            Self::In1 => f.write_str("@in1"),
            Self::In2 => f.write_str("@in2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    pub(crate) fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }
}

/// Bound parameter reference
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRef {
    pub name: &'static str,
    pub id: Option<String>,
    pub value: ParamValue,
}

impl From<&Parameter> for ParamRef {
    fn from(p: &Parameter) -> Self {
        Self {
            name: p.name(),
            id: p.id().map(str::to_string),
            value: p.value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f32),
    Var(String),
    Slot(Slot),
    Param(ParamRef),
    Call { name: String, args: Vec<Expr> },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Neg(Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Rebuild the tree, replacing each slot for which `f` returns a tree.
    pub fn map_slots(&self, f: &mut impl FnMut(Slot) -> Option<Expr>) -> Expr {
        match self {
            Self::Slot(slot) => f(*slot).unwrap_or(Self::Slot(*slot)),
            Self::Num(_) | Self::Var(_) | Self::Param(_) => self.clone(),
            Self::Call { name, args } => Self::Call {
                name: name.clone(),
                args: args.iter().map(|a| a.map_slots(f)).collect(),
            },
            Self::Binary { op, lhs, rhs } => Self::Binary {
                op: *op,
                lhs: Box::new(lhs.map_slots(f)),
                rhs: Box::new(rhs.map_slots(f)),
            },
            Self::Neg(inner) => Self::Neg(Box::new(inner.map_slots(f))),
        }
    }

    /// Replace every occurrence of `slot` with `with`.
    pub fn substitute(&self, slot: Slot, with: &Expr) -> Expr {
        self.map_slots(&mut |s| (s == slot).then(|| with.clone()))
    }

    /// Replace `@par<N>` slots with references to `params[N]`.
    ///
    /// Out-of-range slots are left in place and reported by [`Expr::unresolved`].
    pub fn bind_params(&self, params: &[Parameter]) -> Expr {
        self.map_slots(&mut |s| match s {
            Slot::Par(n) => params.get(n).map(|p| Self::Param(p.into())),
            _ => None,
        })
    }

    fn visit(&self, f: &mut impl FnMut(&Expr)) {
        f(self);
        match self {
            Self::Call { args, .. } => args.iter().for_each(|a| a.visit(f)),
            Self::Binary { lhs, rhs, .. } => {
                lhs.visit(f);
                rhs.visit(f);
            }
            Self::Neg(inner) => inner.visit(f),
            Self::Num(_) | Self::Var(_) | Self::Slot(_) | Self::Param(_) => {}
        }
    }

    /// Placeholders other than `@pos` still present in the tree.
    pub fn unresolved(&self) -> Vec<Slot> {
        let mut slots = Vec::new();
        self.visit(&mut |e| match e {
            Self::Slot(s) if *s != Slot::Pos && !slots.contains(s) => slots.push(*s),
            _ => {}
        });
        slots
    }

    pub fn contains_slot(&self, slot: Slot) -> bool {
        let mut found = false;
        self.visit(&mut |e| found |= matches!(e, Self::Slot(s) if *s == slot));
        found
    }

    /// Fail with [`CompileError::UnresolvedPlaceholder`] if any placeholder
    /// besides `@pos` remains.
    pub fn ensure_resolved(&self) -> Result<(), CompileError> {
        match self.unresolved().first() {
            None => Ok(()),
            Some(slot) => {
                let context = self.render(ParamStyle::Literal).unwrap_or_default();
                tracing::error!("unresolved placeholder {} in '{}'", slot, context);
                Err(CompileError::UnresolvedPlaceholder {
                    slot: *slot,
                    context,
                })
            }
        }
    }
}

/// Parse a static library template.
pub(crate) fn template(source: &'static str) -> Result<Expr, CompileError> {
    parse(source).map_err(|source_err| {
        tracing::error!("library template '{}' failed to parse: {}", source, source_err);
        CompileError::Template {
            template: source,
            source: source_err,
        }
    })
}
