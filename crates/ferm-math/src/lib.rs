//! FERM Math - Single source of truth for distance-estimator formulas
//!
//! Every formula that appears in a compiled distance expression has exactly one
//! implementation here. The numeric backend of `ferm-sdf` calls these functions
//! directly, and the reference evaluator maps the callable names of a compiled
//! expression onto the same functions, so the two backends can only disagree
//! about *composition*, never about a formula.
//!
//! # Layout
//!
//! ```text
//! vector   →  small helpers (folds, repetition, complex multiply, lerp)
//! shapes   →  closed-form 3D primitives
//! planar   →  2D primitives extruded in the XZ plane
//! fractals →  escape-time and IFS distance estimators
//! warp     →  position transforms used by modifiers
//! blend    →  binary combinators used by mixers
//! ```
//!
//! # Example
//!
//! ```rust
//! use ferm_math::shapes::sphere;
//! use glam::Vec3;
//!
//! let d = sphere(Vec3::new(2.0, 0.0, 0.0), 1.0);
//! assert!((d - 1.0).abs() < 1e-6);
//! ```

// Formulas use standard single-letter mathematical notation
#![allow(clippy::many_single_char_names)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::unreadable_literal)]

pub mod blend;
pub mod fractals;
pub mod planar;
pub mod shapes;
pub mod vector;
pub mod warp;

/// Distance reported for "no geometry" (e.g. a mixer without children).
pub const NO_GEOMETRY: f32 = 1e6;
