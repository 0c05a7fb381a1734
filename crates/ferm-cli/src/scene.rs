//! JSON scene description
//!
//! ```json
//! {
//!   "roots": [
//!     {
//!       "mixer": "UnionSmooth",
//!       "params": { "strength": 0.3 },
//!       "children": [
//!         { "shape": "Sphere", "params": { "radius": 1.0 } },
//!         {
//!           "shape": "Box",
//!           "transform": { "position": [1.5, 0, 0] },
//!           "modifiers": [
//!             { "kind": "Twist", "params": { "Power": 2.0 } },
//!             { "recurse": "All", "iterations": 2 }
//!           ]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Parameter values are numbers, arrays of 2, 3 or 4 numbers (quaternions are
//! `[x, y, z, w]`), or an axis name. Each value must match the declared type
//! of the parameter it writes.

use anyhow::{Context, Result, bail};
use ferm_sdf::{
    Axis, ElementaryKind, MixerKind, Modifier, ModifierKind, Node, ParamError, ParamType,
    ParamValue, Parameter, RecurseModifier, RecurseTarget, Scene, TransformMode,
};
use glam::{Quat, Vec2, Vec3};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

type Params = BTreeMap<String, Value>;

fn enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    pub roots: Vec<NodeDesc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDesc {
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub mixer: Option<String>,
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub transform: Option<TransformDesc>,
    /// `before`, `after` or `ignore`
    #[serde(default)]
    pub transform_mode: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<ModifierDesc>,
    #[serde(default)]
    pub children: Vec<NodeDesc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformDesc {
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "identity")]
    pub rotation: [f32; 4],
    #[serde(default = "unit")]
    pub scale: f32,
}

fn identity() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ModifierDesc {
    Recurse {
        recurse: String,
        #[serde(default)]
        iterations: Option<i32>,
        #[serde(default = "enabled")]
        enabled: bool,
    },
    Modifier {
        kind: String,
        #[serde(default)]
        params: Params,
        #[serde(default = "enabled")]
        enabled: bool,
    },
}

/// Read and build a scene from a JSON file.
pub fn load(path: &Path) -> Result<Scene> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: SceneFile = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let scene = build(&file)?;
    tracing::info!("loaded {} root(s) from {}", scene.roots().len(), path.display());
    Ok(scene)
}

pub fn build(file: &SceneFile) -> Result<Scene> {
    let roots = file
        .roots
        .iter()
        .enumerate()
        .map(|(i, desc)| build_node(desc).with_context(|| format!("in root {i}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(Scene::new(roots))
}

fn build_node(desc: &NodeDesc) -> Result<Node> {
    let mut node = match (&desc.shape, &desc.mixer) {
        (Some(shape), None) => Node::shape(shape.parse::<ElementaryKind>()?),
        (None, Some(mixer)) => {
            let children = desc
                .children
                .iter()
                .enumerate()
                .map(|(i, c)| build_node(c).with_context(|| format!("in child {i}")))
                .collect::<Result<Vec<_>>>()?;
            Node::mixer(mixer.parse::<MixerKind>()?, children)
        }
        _ => bail!("a node needs exactly one of 'shape' or 'mixer'"),
    };
    if desc.shape.is_some() && !desc.children.is_empty() {
        bail!("shape nodes have no children");
    }

    node.enabled = desc.enabled;
    if let Some(mode) = &desc.transform_mode {
        node.transform_mode = transform_mode(mode)?;
    }
    if let Some(t) = &desc.transform {
        node.set_transform(
            Vec3::from_array(t.position),
            Quat::from_array(t.rotation).normalize(),
            t.scale,
        )?;
    }
    for (name, value) in &desc.params {
        let converted = convert(node.params(), name, value)?;
        node.set_param(name, converted)?;
    }

    for (i, m) in desc.modifiers.iter().enumerate() {
        push_modifier(&mut node, m).with_context(|| format!("in modifier {i}"))?;
    }
    Ok(node)
}

fn push_modifier(node: &mut Node, desc: &ModifierDesc) -> Result<()> {
    match desc {
        ModifierDesc::Recurse {
            recurse,
            iterations,
            enabled,
        } => {
            let mut r = RecurseModifier::new(recurse_target(recurse)?);
            if let Some(n) = iterations {
                r = r.with_iterations(*n);
            }
            r.enabled = *enabled;
            node.modifiers_mut().push_recurse(r)?;
        }
        ModifierDesc::Modifier {
            kind,
            params,
            enabled,
        } => {
            let mut m = Modifier::new(kind.parse::<ModifierKind>()?);
            for (name, value) in params {
                let converted = convert(m.params(), name, value)?;
                m.set_param(name, converted)?;
            }
            m.enabled = *enabled;
            node.modifiers_mut().push(m);
        }
    }
    Ok(())
}

fn transform_mode(s: &str) -> Result<TransformMode> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "before" | "applybeforemodifiers" => TransformMode::ApplyBeforeModifiers,
        "after" | "applyaftermodifiers" => TransformMode::ApplyAfterModifiers,
        "ignore" => TransformMode::Ignore,
        _ => bail!("unknown transform mode '{s}' (expected before, after or ignore)"),
    })
}

fn recurse_target(s: &str) -> Result<RecurseTarget> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "all" => RecurseTarget::All,
        "before" => RecurseTarget::Before,
        "after" => RecurseTarget::After,
        _ => bail!("unknown recurse target '{s}' (expected all, before or after)"),
    })
}

/// Convert a JSON value for parameter `name`.
///
/// The declared type decides between int and float for numbers. Strings are
/// axis names and only fit an Axis parameter; anything else is a type
/// mismatch. Arrays map to one type by length, so a wrong length surfaces as
/// a type mismatch when the value is written.
fn convert(params: &[Parameter], name: &str, value: &Value) -> Result<ParamValue> {
    let declared = params
        .iter()
        .find(|p| p.name().eq_ignore_ascii_case(name))
        .map(Parameter::param_type)
        .ok_or_else(|| ParamError::NameNotFound(name.to_string()))?;

    let v = match value {
        Value::Number(n) => match (declared, n.as_i64()) {
            (ParamType::Int, Some(i)) => ParamValue::Int(i32::try_from(i)?),
            _ => ParamValue::Float(number(n)?),
        },
        Value::Array(items) => {
            let xs = items
                .iter()
                .map(|v| match v {
                    Value::Number(n) => number(n),
                    _ => bail!("'{name}': vector components must be numbers"),
                })
                .collect::<Result<Vec<_>>>()?;
            match xs.as_slice() {
                [x, y] => ParamValue::Vector2(Vec2::new(*x, *y)),
                [x, y, z] => ParamValue::Vector3(Vec3::new(*x, *y, *z)),
                [x, y, z, w] => ParamValue::Quaternion(Quat::from_xyzw(*x, *y, *z, *w)),
                _ => bail!("'{name}': expected 2, 3 or 4 components, got {}", xs.len()),
            }
        }
        Value::String(s) if declared == ParamType::Axis => {
            ParamValue::Axis(axis(s).with_context(|| format!("'{name}'"))?)
        }
        Value::String(_) => {
            return Err(ParamError::TypeMismatch {
                name: name.to_string(),
                expected: declared,
                found: ParamType::Axis,
            }
            .into());
        }
        _ => bail!("'{name}': unsupported value {value}"),
    };
    Ok(v)
}

fn number(n: &serde_json::Number) -> Result<f32> {
    n.as_f64()
        .map(|f| f as f32)
        .with_context(|| format!("{n} is not representable"))
}

fn axis(s: &str) -> Result<Axis> {
    Ok(match s.to_ascii_uppercase().as_str() {
        "X" => Axis::X,
        "Y" => Axis::Y,
        "Z" => Axis::Z,
        _ => bail!("unknown axis '{s}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferm_sdf::{ParamStyle, ParamTemplate};

    fn parse(json: &str) -> Result<Scene> {
        let file: SceneFile = serde_json::from_str(json)?;
        build(&file)
    }

    #[test]
    fn test_build_nested_scene() {
        let scene = parse(
            r#"{
                "roots": [{
                    "mixer": "Union",
                    "children": [
                        { "shape": "Sphere", "params": { "radius": 2.0 },
                          "transform": { "position": [3, 0, 0] } },
                        { "shape": "Box", "transform_mode": "ignore",
                          "modifiers": [
                              { "kind": "Translate", "params": { "position": [0, 5, 0] } },
                              { "recurse": "All", "iterations": 0 }
                          ] }
                    ]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(scene.roots().len(), 1);
        assert_eq!(scene.roots()[0].children().len(), 2);
        // Sphere of radius 2 at x = 3
        assert!((scene.evaluate(Vec3::ZERO) - 1.0).abs() < 1e-5);

        let compiled = scene.compile().unwrap();
        assert_eq!(compiled.helpers.len(), 1);
        assert!(compiled.render(ParamStyle::Identifier).unwrap().starts_with("Union("));
    }

    #[test]
    fn test_int_and_vector_params() {
        let scene = parse(
            r#"{ "roots": [
                { "shape": "Julia", "params": { "iterations": 12, "c": [0.3, 0.5] } }
            ] }"#,
        )
        .unwrap();
        let params = scene.roots()[0].own_params();
        assert_eq!(params[0].value(), ParamValue::Int(12));
        assert_eq!(params[1].value(), ParamValue::Vector2(Vec2::new(0.3, 0.5)));
    }

    fn param_error(err: &anyhow::Error) -> Option<&ParamError> {
        err.chain().find_map(|e| e.downcast_ref::<ParamError>())
    }

    #[test]
    fn test_string_value_is_type_mismatch() {
        let node = Node::shape(ferm_sdf::Primitive::Sphere);
        for text in ["not-a-number", "Y"] {
            let err = convert(node.params(), "radius", &Value::from(text)).unwrap_err();
            assert_eq!(
                param_error(&err),
                Some(&ParamError::TypeMismatch {
                    name: "radius".to_string(),
                    expected: ParamType::Float,
                    found: ParamType::Axis,
                }),
                "{text}: {err:#}"
            );
        }

        let err = parse(
            r#"{ "roots": [{ "shape": "Sphere", "params": { "radius": "not-a-number" } }] }"#,
        )
        .unwrap_err();
        assert!(
            matches!(param_error(&err), Some(ParamError::TypeMismatch { expected: ParamType::Float, .. })),
            "{err:#}"
        );
        assert!(format!("{err:#}").contains("expects Float"), "{err:#}");
    }

    #[test]
    fn test_axis_names_fit_axis_params_only() {
        let params = [ParamTemplate {
            name: "axis",
            default: ParamValue::Axis(Axis::Y),
        }
        .instantiate()];

        assert_eq!(
            convert(&params, "axis", &Value::from("z")).unwrap(),
            ParamValue::Axis(Axis::Z)
        );
        let err = convert(&params, "axis", &Value::from("W")).unwrap_err();
        assert!(param_error(&err).is_none(), "{err:#}");
        assert!(format!("{err:#}").contains("unknown axis"), "{err:#}");
    }

    #[test]
    fn test_rejects_bad_nodes() {
        assert!(parse(r#"{ "roots": [{ "shape": "Blob" }] }"#).is_err());
        assert!(parse(r#"{ "roots": [{ "shape": "Sphere", "mixer": "Union" }] }"#).is_err());
        assert!(parse(r#"{ "roots": [{ "shape": "Sphere", "params": { "size": 1 } }] }"#).is_err());
        assert!(
            parse(
                r#"{ "roots": [{ "shape": "Sphere", "modifiers": [
                    { "recurse": "All" }, { "recurse": "After" }
                ] }] }"#
            )
            .is_err()
        );
    }

    #[test]
    fn test_disabled_root_is_skipped() {
        let scene = parse(
            r#"{ "roots": [
                { "shape": "Sphere", "enabled": false },
                { "shape": "Sphere", "transform": { "position": [4, 0, 0] } }
            ] }"#,
        )
        .unwrap();
        assert!((scene.evaluate(Vec3::ZERO) - 3.0).abs() < 1e-5);
    }
}
