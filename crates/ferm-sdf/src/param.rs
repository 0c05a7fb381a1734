//! Typed node parameters
//!
//! Every node type declares a static list of [`ParamTemplate`]s. A node owns a
//! cloned `Vec<Parameter>` built from that list ("uniquation"); values are
//! written by name with strict type checking, and each parameter receives a
//! stable shader identifier (`par03`) once the owning tree is laid out.
//!
//! ## Identifiers
//!
//! The identifier of parameter `i` out of `n` is `"par"` followed by `i`
//! zero-padded to `ceil(log10(n))` digits, so identifiers sort lexically in
//! allocation order:
//!
//! ```rust
//! use ferm_sdf::param::identifier;
//!
//! assert_eq!(identifier("par", 3, 12), "par03");
//! assert_eq!(identifier("par", 7, 8), "par7");
//! ```

use crate::error::ParamError;
use glam::{Quat, Vec2, Vec3};
use std::fmt;

/// Type tag of a parameter slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Float,
    Int,
    Vector3,
    Vector2,
    Quaternion,
    Axis,
}

impl ParamType {
    /// Type name used in shader declarations
    pub fn shader_type(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int | Self::Axis => "int",
            Self::Vector3 => "float3",
            Self::Vector2 => "float2",
            Self::Quaternion => "float4",
        }
    }
}

/// Principal axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> i32 {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// A parameter value; the variant is the type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Vector3(Vec3),
    Vector2(Vec2),
    Quaternion(Quat),
    Axis(Axis),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Float(_) => ParamType::Float,
            Self::Int(_) => ParamType::Int,
            Self::Vector3(_) => ParamType::Vector3,
            Self::Vector2(_) => ParamType::Vector2,
            Self::Quaternion(_) => ParamType::Quaternion,
            Self::Axis(_) => ParamType::Axis,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v as f32)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<Vec3> for ParamValue {
    fn from(v: Vec3) -> Self {
        Self::Vector3(v)
    }
}

impl From<Vec2> for ParamValue {
    fn from(v: Vec2) -> Self {
        Self::Vector2(v)
    }
}

impl From<Quat> for ParamValue {
    fn from(v: Quat) -> Self {
        Self::Quaternion(v)
    }
}

impl From<Axis> for ParamValue {
    fn from(v: Axis) -> Self {
        Self::Axis(v)
    }
}

/// Static default of a parameter, declared by a node type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamTemplate {
    pub name: &'static str,
    pub default: ParamValue,
}

impl ParamTemplate {
    pub const fn float(name: &'static str, v: f32) -> Self {
        Self { name, default: ParamValue::Float(v) }
    }

    pub const fn int(name: &'static str, v: i32) -> Self {
        Self { name, default: ParamValue::Int(v) }
    }

    pub const fn vec2(name: &'static str, x: f32, y: f32) -> Self {
        Self { name, default: ParamValue::Vector2(Vec2::new(x, y)) }
    }

    pub const fn vec3(name: &'static str, x: f32, y: f32, z: f32) -> Self {
        Self { name, default: ParamValue::Vector3(Vec3::new(x, y, z)) }
    }

    pub const fn quat(name: &'static str, q: Quat) -> Self {
        Self { name, default: ParamValue::Quaternion(q) }
    }

    /// Fresh owned copy holding the default value
    pub fn instantiate(&self) -> Parameter {
        Parameter {
            name: self.name,
            id: None,
            value: self.default,
        }
    }
}

/// An owned, typed parameter of one node instance
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: &'static str,
    id: Option<String>,
    value: ParamValue,
}

impl Parameter {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> ParamValue {
        self.value
    }

    pub fn param_type(&self) -> ParamType {
        self.value.param_type()
    }

    /// Shader identifier, once assigned
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Replace the value; the type must match exactly.
    pub fn set_value(&mut self, value: impl Into<ParamValue>) -> Result<(), ParamError> {
        let value = value.into();
        if value.param_type() != self.param_type() {
            return Err(ParamError::TypeMismatch {
                name: self.name.to_string(),
                expected: self.param_type(),
                found: value.param_type(),
            });
        }
        self.value = value;
        Ok(())
    }

    /// Assign the identifier for slot `index` of `count`.
    pub fn assign_identifier(&mut self, index: usize, count: usize) -> &str {
        self.id.insert(identifier("par", index, count))
    }

    pub(crate) fn clear_identifier(&mut self) {
        self.id = None;
    }

    /// Shader declaration, e.g. `float3 par03;`
    pub fn declaration(&self) -> Option<String> {
        self.id
            .as_ref()
            .map(|id| format!("{} {};", self.param_type().shader_type(), id))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} ({}) = {:?}", self.name, id, self.value),
            None => write!(f, "{} = {:?}", self.name, self.value),
        }
    }
}

/// `prefix` + `index` zero-padded to `ceil(log10(count))` digits.
pub fn identifier(prefix: &str, index: usize, count: usize) -> String {
    let width = count
        .saturating_sub(1)
        .checked_ilog10()
        .map_or(0, |digits| digits as usize + 1);
    format!("{prefix}{index:0width$}")
}

/// Result of re-cloning a parameter array from its templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniquation {
    /// No previous parameters: defaults were cloned
    Fresh,
    /// Type signatures matched slot for slot: old values were kept
    Preserved,
    /// Signatures differed: every value was reset to its default
    Reset,
}

/// Clone `templates` into an owned array, carrying values over from `old` when
/// both arrays have the same length and identical types in every slot.
pub fn uniquate(templates: &[ParamTemplate], old: &[Parameter]) -> (Vec<Parameter>, Uniquation) {
    let mut params: Vec<Parameter> = templates.iter().map(ParamTemplate::instantiate).collect();

    if old.is_empty() {
        return (params, Uniquation::Fresh);
    }

    let matches = old.len() == params.len()
        && old
            .iter()
            .zip(&params)
            .all(|(a, b)| a.param_type() == b.param_type());

    if !matches {
        tracing::warn!(
            "parameter layout changed ({} -> {} slots), values reset to defaults",
            old.len(),
            params.len()
        );
        return (params, Uniquation::Reset);
    }

    for (new, old) in params.iter_mut().zip(old) {
        new.value = old.value;
    }
    (params, Uniquation::Preserved)
}

/// Set a parameter by case-insensitive name.
pub fn set_by_name(
    params: &mut [Parameter],
    name: &str,
    value: impl Into<ParamValue>,
) -> Result<(), ParamError> {
    params
        .iter_mut()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ParamError::NameNotFound(name.to_string()))?
        .set_value(value)
}

/// Typed positional reads used by the numeric evaluators.
///
/// Arrays are always built from their templates, so a wrong type at an index
/// only happens for library defects; those read as zero.
pub trait ParamsExt {
    fn float(&self, index: usize) -> f32;
    fn int(&self, index: usize) -> i32;
    fn vec2(&self, index: usize) -> Vec2;
    fn vec3(&self, index: usize) -> Vec3;
    fn quat(&self, index: usize) -> Quat;
}

impl ParamsExt for [Parameter] {
    fn float(&self, index: usize) -> f32 {
        match self.get(index).map(Parameter::value) {
            Some(ParamValue::Float(v)) => v,
            _ => 0.0,
        }
    }

    fn int(&self, index: usize) -> i32 {
        match self.get(index).map(Parameter::value) {
            Some(ParamValue::Int(v)) => v,
            Some(ParamValue::Axis(a)) => a.index(),
            _ => 0,
        }
    }

    fn vec2(&self, index: usize) -> Vec2 {
        match self.get(index).map(Parameter::value) {
            Some(ParamValue::Vector2(v)) => v,
            _ => Vec2::ZERO,
        }
    }

    fn vec3(&self, index: usize) -> Vec3 {
        match self.get(index).map(Parameter::value) {
            Some(ParamValue::Vector3(v)) => v,
            _ => Vec3::ZERO,
        }
    }

    fn quat(&self, index: usize) -> Quat {
        match self.get(index).map(Parameter::value) {
            Some(ParamValue::Quaternion(q)) => q,
            _ => Quat::IDENTITY,
        }
    }
}

/// Receiver of per-tick parameter values, keyed by shader identifier
pub trait ParameterSink {
    fn bind(&mut self, id: &str, ty: ParamType, value: ParamValue);
}

impl<F: FnMut(&str, ParamType, ParamValue)> ParameterSink for F {
    fn bind(&mut self, id: &str, ty: ParamType, value: ParamValue) {
        self(id, ty, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPHERE: &[ParamTemplate] = &[ParamTemplate::float("radius", 1.0)];
    const BOX: &[ParamTemplate] = &[ParamTemplate::vec3("size", 1.0, 1.0, 1.0)];
    const TORUS: &[ParamTemplate] = &[
        ParamTemplate::float("radius", 1.0),
        ParamTemplate::float("thickness", 0.2),
    ];

    #[test]
    fn test_identifier_padding() {
        assert_eq!(identifier("par", 0, 1), "par0");
        assert_eq!(identifier("par", 9, 10), "par9");
        assert_eq!(identifier("par", 3, 12), "par03");
        assert_eq!(identifier("par", 10, 11), "par10");
        assert_eq!(identifier("hlp", 5, 100), "hlp05");
        assert_eq!(identifier("par", 45, 999), "par045");
    }

    #[test]
    fn test_identifiers_sort_in_allocation_order() {
        let ids: Vec<String> = (0..120).map(|i| identifier("par", i, 120)).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_set_value_rejects_other_types() {
        let mut p = SPHERE[0].instantiate();
        let err = p.set_value(Vec3::ONE).unwrap_err();
        assert!(matches!(err, ParamError::TypeMismatch { .. }));
        assert_eq!(p.value(), ParamValue::Float(1.0));

        // Int is not coerced to Float either
        assert!(p.set_value(2).is_err());
        assert_eq!(p.value(), ParamValue::Float(1.0));

        p.set_value(0.25).unwrap();
        assert_eq!(p.value(), ParamValue::Float(0.25));
    }

    #[test]
    fn test_set_by_name_is_case_insensitive() {
        let (mut params, _) = uniquate(TORUS, &[]);
        set_by_name(&mut params, "THICKNESS", 0.5).unwrap();
        assert_eq!(params.float(1), 0.5);

        let err = set_by_name(&mut params, "height", 0.5).unwrap_err();
        assert_eq!(err, ParamError::NameNotFound("height".into()));
    }

    #[test]
    fn test_uniquate_preserves_matching_signature() {
        let (mut old, outcome) = uniquate(SPHERE, &[]);
        assert_eq!(outcome, Uniquation::Fresh);
        old[0].set_value(3.0).unwrap();

        // Same signature under a different name still carries the value
        let plane = [ParamTemplate::float("thickness", 0.0)];
        let (new, outcome) = uniquate(&plane, &old);
        assert_eq!(outcome, Uniquation::Preserved);
        assert_eq!(new[0].name(), "thickness");
        assert_eq!(new.float(0), 3.0);
    }

    #[test]
    fn test_uniquate_resets_on_type_or_length_change() {
        let (mut old, _) = uniquate(SPHERE, &[]);
        old[0].set_value(3.0).unwrap();

        let (new, outcome) = uniquate(BOX, &old);
        assert_eq!(outcome, Uniquation::Reset);
        assert_eq!(new.vec3(0), Vec3::ONE);

        let (new, outcome) = uniquate(TORUS, &old);
        assert_eq!(outcome, Uniquation::Reset);
        assert_eq!(new.float(0), 1.0);
    }

    #[test]
    fn test_declaration_uses_shader_types() {
        let mut p = BOX[0].instantiate();
        assert_eq!(p.declaration(), None);
        p.assign_identifier(3, 12);
        assert_eq!(p.declaration().as_deref(), Some("float3 par03;"));

        let mut axis = Parameter {
            name: "axis",
            id: None,
            value: ParamValue::Axis(Axis::Y),
        };
        axis.assign_identifier(0, 1);
        assert_eq!(axis.declaration().as_deref(), Some("int par0;"));
    }
}
