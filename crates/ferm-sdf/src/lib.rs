//! FERM SDF - Symbolic signed-distance-field composition
//!
//! A scene is a tree of [`Node`]s: elementary shapes (primitives, 2D
//! primitives, fractals) and mixers combining child nodes, each carrying a
//! stack of [`Modifier`]s and at most one [`RecurseModifier`]. The same tree
//! has two backends:
//!
//! - **text**: [`compile`] produces one distance expression over `@pos`, plus
//!   recurse helper functions, ready for a raymarching shader;
//! - **numeric**: [`evaluate`] (or [`Sdf::distance`]) returns the distance at a
//!   point on the CPU.
//!
//! Both backends use the formulas in `ferm-math`, and the [`reference`]
//! interpreter evaluates compiled text so the two can be checked against each
//! other.
//!
//! ## Key Types
//!
//! - [`Node`] - Shape or mixer with its parameters and modifier stack
//! - [`Scene`] - Root nodes combined by union, with identifier layout
//! - [`Compiled`] - Expression, helpers and parameter declarations
//! - [`ShaderSource`] - Base template with refillable slots
//! - [`Caster`] - CPU probing and ray casting
//! - [`SharedScene`] - Scene behind a read/write lock for multi-threaded hosts
//!
//! ## Example
//!
//! ```rust
//! use ferm_sdf::{MixerKind, Node, ParamStyle, Primitive, Scene, TransformMode};
//! use glam::Vec3;
//!
//! let a = Node::shape(Primitive::Sphere).with_transform_mode(TransformMode::Ignore);
//! let b = Node::shape(Primitive::Box).with_transform_mode(TransformMode::Ignore);
//! let scene = Scene::new(vec![Node::mixer(MixerKind::Intersect, vec![a, b])]);
//!
//! let compiled = scene.compile()?;
//! assert_eq!(
//!     compiled.render(ParamStyle::Identifier)?,
//!     "Intersect(Sphere(@pos, par0), Box(@pos, par4))"
//! );
//! assert!(scene.evaluate(Vec3::ZERO) < 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod caster;
mod codegen;
mod cpu_eval;
mod driver;
mod error;
pub mod expr;
mod geometry;
mod library;
mod mixer;
mod modifier;
mod node;
pub mod param;
mod recurse;
pub mod reference;
mod shader;
mod shared;

pub use caster::{CastResult, Caster, DEFAULT_MAX_DISTANCE, MarchSettings};
pub use codegen::{Compiled, Helper};
pub use cpu_eval::Sdf;
pub use driver::{Scene, assign_identifiers, bind_parameters, compile, evaluate};
pub use error::{
    CompileError, EvalError, NodeError, ParamError, ParseError, ShaderError, StackError, UnknownKind,
};
pub use expr::{Expr, ParamStyle};
pub use geometry::Geometry;
pub use library::{Elementary, ElementaryKind, Fractal, Fractal2D, Primitive, Primitive2D};
pub use mixer::{MixerKind, MixerRecord};
pub use modifier::{Modifier, ModifierKind, ModifierRecord};
pub use node::{Node, NodeKind, TransformMode};
pub use param::{
    Axis, ParamTemplate, ParamType, ParamValue, Parameter, ParameterSink, ParamsExt, Uniquation,
};
pub use recurse::{ModifierStack, Partition, RecurseModifier, RecurseTarget, StackEntry};
pub use shader::{
    DEFAULT_NAME, DEFAULT_TEMPLATE, RenderMode, ShaderOptions, ShaderSource, StructureSignature,
    SuperSampling,
};
pub use shared::SharedScene;
