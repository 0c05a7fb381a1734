//! Error types for FERM

use crate::expr::Slot;
use crate::param::ParamType;
use thiserror::Error;

/// Errors raised when writing a parameter by name
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    /// No parameter with that name (names compare case-insensitively)
    #[error("no parameter named '{0}'")]
    NameNotFound(String),

    /// The value's type differs from the parameter's declared type
    #[error("parameter '{name}' expects {expected:?}, got {found:?}")]
    TypeMismatch {
        name: String,
        expected: ParamType,
        found: ParamType,
    },
}

/// Errors raised while parsing an expression template
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        offset: usize,
    },

    #[error("unknown placeholder '@{0}'")]
    UnknownSlot(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/// Errors raised while compiling a node tree to an expression.
///
/// Placeholder and template errors indicate a defect in the built-in
/// template library rather than bad user input; the other two mean
/// identifiers were not assigned before compiling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("placeholder {slot} left unresolved in '{context}'")]
    UnresolvedPlaceholder { slot: Slot, context: String },

    #[error("invalid template '{template}': {source}")]
    Template {
        template: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("parameter '{0}' has no identifier; assign identifiers before rendering")]
    UnassignedIdentifier(String),

    #[error("recurse modifier has no helper name; assign identifiers before compiling")]
    UnnamedHelper,

    #[error("{0} has no shader literal")]
    NonFiniteLiteral(f32),
}

/// Errors raised by the reference evaluator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("unbound variable '{0}'")]
    UnboundVariable(String),

    #[error("placeholder {0} cannot be evaluated")]
    UnresolvedSlot(Slot),

    #[error("'{function}' expects {expected} arguments, got {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {index} of '{function}' must be {expected}")]
    ArgumentType {
        function: String,
        index: usize,
        expected: &'static str,
    },

    #[error("operands of '{0}' have incompatible shapes")]
    Operand(char),

    #[error("expression does not produce a scalar distance")]
    NotScalar,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] CompileError),
}

/// A node, modifier or mixer kind name that is not in the library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {category} '{name}'")]
pub struct UnknownKind {
    pub category: &'static str,
    pub name: String,
}

/// Errors raised when editing a modifier stack
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("node already has a recurse modifier")]
    RecurseAlreadyAttached,
}

/// Errors raised when an edit does not fit the node's category
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("node is a mixer, not a shape")]
    NotAShape,

    #[error("node is a shape, not a mixer")]
    NotAMixer,

    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Errors raised while assembling shader source
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// The base template lacks a required `@marker`
    #[error("shader template has no '@{0}' marker")]
    MissingMarker(&'static str),

    #[error(transparent)]
    Compile(#[from] CompileError),
}
