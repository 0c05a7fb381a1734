//! Shader assembly
//!
//! A base template carries five markers, each alone on its line apart from
//! `@name`: `@name`, `@options`, `@parameters`, `@helpers` and `@function`.
//! [`ShaderSource::new`] fills the name once and turns the other markers into
//! refillable slots of the form
//!
//! ```text
//! //#function
//! ...content...
//! //#
//! ```
//!
//! so one source can be regenerated every time the scene structure changes.

use crate::codegen::Compiled;
use crate::error::ShaderError;
use crate::expr::{Expr, ParamStyle, Slot};
use crate::node::{Node, NodeKind};
use crate::recurse::StackEntry;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Bundled scene include: slots and the `DistanceFunction` wrapper only
pub const DEFAULT_TEMPLATE: &str = include_str!("shaders/scene.hlsl");

/// Name used by [`ShaderSource::assemble`]
pub const DEFAULT_NAME: &str = "FERM/Scene";

const NAME: &str = "name";
const OPTIONS: &str = "options";
const PARAMETERS: &str = "parameters";
const HELPERS: &str = "helpers";
const FUNCTION: &str = "function";
const SLOTS: [&str; 4] = [OPTIONS, PARAMETERS, HELPERS, FUNCTION];

/// Body used until a scene is compiled into the source
const PLACEHOLDER_FUNCTION: &str = "return Box(pos, float3(1, 1, 1));";

/// Output target of the generated shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    /// Opaque with raymarched depth
    #[default]
    Normal,
    /// Opaque without depth output
    Depthless,
    /// Misses draw the sky
    Skybox,
    /// Full 360° equirectangular capture
    Equirect360,
}

impl RenderMode {
    pub fn define(self) -> Option<&'static str> {
        match self {
            Self::Normal => Some("USE_RAYMARCHING_DEPTH"),
            Self::Depthless => None,
            Self::Skybox => Some("SKYBOX_MODE"),
            Self::Equirect360 => Some("EQUIRECT_360_MODE"),
        }
    }
}

/// Samples per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SuperSampling {
    #[default]
    None,
    X2,
    X4,
    X9,
    X16,
}

impl SuperSampling {
    pub fn samples(self) -> u32 {
        match self {
            Self::None => 1,
            Self::X2 => 2,
            Self::X4 => 4,
            Self::X9 => 9,
            Self::X16 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShaderOptions {
    pub mode: RenderMode,
    pub sampling: SuperSampling,
    /// How parameters appear in the generated code
    pub parameters: ParamStyle,
}

impl ShaderOptions {
    /// Preprocessor lines for the options slot
    pub fn defines(&self) -> String {
        let mut out = String::new();
        if let Some(define) = self.mode.define() {
            out.push_str(&format!("#define {define}\n"));
        }
        out.push_str(&format!("#define SUPERSAMPLING_{}X\n", self.sampling.samples()));
        out
    }
}

/// Generated shader text with refillable slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    text: String,
}

fn marker(name: &str) -> String {
    format!("@{name}")
}

fn slot_open(name: &str) -> String {
    format!("//#{name}\n")
}

const SLOT_CLOSE: &str = "//#";

/// Replace the line holding only `@name` with an empty slot.
fn make_slot(text: &str, name: &'static str) -> Result<String, ShaderError> {
    let marker = marker(name);
    let mut found = false;
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if !found && line.trim() == marker {
            out.push_str(&slot_open(name));
            out.push_str(SLOT_CLOSE);
            out.push('\n');
            found = true;
        } else {
            out.push_str(line);
        }
    }
    if found {
        Ok(out)
    } else {
        Err(ShaderError::MissingMarker(name))
    }
}

impl ShaderSource {
    /// Prepare `template`: fill the name and open every slot with defaults.
    pub fn new(name: &str, template: &str) -> Result<Self, ShaderError> {
        if !template.contains(&marker(NAME)) {
            return Err(ShaderError::MissingMarker(NAME));
        }
        let mut text = template.replace(&marker(NAME), name);
        for slot in SLOTS {
            text = make_slot(&text, slot)?;
        }

        let mut source = Self { text };
        source.fill_slot(FUNCTION, PLACEHOLDER_FUNCTION)?;
        source.fill_slot(OPTIONS, &ShaderOptions::default().defines())?;
        Ok(source)
    }

    /// Build a full shader from `base` in one step.
    pub fn assemble(base: &str, compiled: &Compiled, options: &ShaderOptions) -> Result<Self, ShaderError> {
        let mut source = Self::new(DEFAULT_NAME, base)?;
        source.fill(compiled, options)?;
        Ok(source)
    }

    /// Write a compiled scene and options into the slots.
    pub fn fill(&mut self, compiled: &Compiled, options: &ShaderOptions) -> Result<(), ShaderError> {
        let style = options.parameters;
        let parameters = match style {
            ParamStyle::Identifier => compiled.declarations(),
            ParamStyle::Literal => String::new(),
        };
        let body = compiled
            .expression
            .substitute(Slot::Pos, &Expr::var("pos"))
            .render(style)?;

        self.fill_slot(OPTIONS, &options.defines())?;
        self.fill_slot(PARAMETERS, &parameters)?;
        self.fill_slot(HELPERS, &compiled.helper_source(style)?)?;
        self.fill_slot(FUNCTION, &format!("return {body};"))?;
        tracing::debug!(
            "assembled shader: {} parameters, {} helpers",
            compiled.parameters.len(),
            compiled.helpers.len()
        );
        Ok(())
    }

    fn fill_slot(&mut self, name: &'static str, content: &str) -> Result<(), ShaderError> {
        let open = slot_open(name);
        let start = self.text.find(&open).ok_or(ShaderError::MissingMarker(name))? + open.len();
        let end = self.text[start..]
            .find(SLOT_CLOSE)
            .ok_or(ShaderError::MissingMarker(name))?
            + start;

        let mut content = content.to_string();
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        self.text.replace_range(start..end, &content);
        Ok(())
    }

    /// Current content of slot `name`, if the source has it
    pub fn slot(&self, name: &str) -> Option<&str> {
        let open = slot_open(name);
        let start = self.text.find(&open)? + open.len();
        let end = self.text[start..].find(SLOT_CLOSE)? + start;
        Some(&self.text[start..end])
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Hash of a scene's enabled structure: kinds, modes and enabled flags, but
/// no parameter values. A change means the shader must be regenerated;
/// value edits only need re-binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructureSignature {
    last: Option<u64>,
}

fn hash_node(node: &Node, h: &mut impl Hasher) {
    node.enabled.hash(h);
    if !node.enabled {
        return;
    }
    node.transform_mode.hash(h);
    match node.kind() {
        NodeKind::Shape(kind) => {
            0u8.hash(h);
            kind.hash(h);
        }
        NodeKind::Mixer { kind, .. } => {
            1u8.hash(h);
            kind.hash(h);
        }
    }
    for entry in node.modifiers().entries() {
        entry.is_enabled().hash(h);
        match entry {
            StackEntry::Modifier(m) => m.kind().hash(h),
            StackEntry::Recurse(r) => r.target().hash(h),
        }
    }
    node.children().len().hash(h);
    for child in node.children() {
        hash_node(child, h);
    }
}

impl StructureSignature {
    pub fn compute(roots: &[Node]) -> u64 {
        let mut h = DefaultHasher::new();
        roots.len().hash(&mut h);
        for root in roots {
            hash_node(root, &mut h);
        }
        h.finish()
    }

    /// Record the signature of `roots`; true when it differs from the last one.
    pub fn update(&mut self, roots: &[Node]) -> bool {
        let signature = Self::compute(roots);
        let changed = self.last != Some(signature);
        self.last = Some(signature);
        if changed {
            tracing::debug!("scene structure changed, shader needs regeneration");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Scene;
    use crate::library::Primitive;
    use crate::modifier::{Modifier, ModifierKind};
    use crate::recurse::{RecurseModifier, RecurseTarget};

    #[test]
    fn test_defines() {
        let options = ShaderOptions::default();
        assert_eq!(options.defines(), "#define USE_RAYMARCHING_DEPTH\n#define SUPERSAMPLING_1X\n");

        let options = ShaderOptions {
            mode: RenderMode::Depthless,
            sampling: SuperSampling::X9,
            ..ShaderOptions::default()
        };
        assert_eq!(options.defines(), "#define SUPERSAMPLING_9X\n");
    }

    #[test]
    fn test_new_source_has_defaults() {
        let source = ShaderSource::new("Test/Shape", DEFAULT_TEMPLATE).unwrap();
        assert!(source.text().starts_with("// Scene distance function \"Test/Shape\""));
        assert!(!source.text().contains("#include"));
        assert!(!source.text().contains('@'));
        assert_eq!(source.slot(FUNCTION), Some("return Box(pos, float3(1, 1, 1));\n"));
        assert_eq!(source.slot(HELPERS), Some(""));
    }

    #[test]
    fn test_assemble_fills_every_slot() {
        let scene = Scene::new(vec![
            Node::shape(Primitive::Sphere)
                .with_modifier(Modifier::new(ModifierKind::Translate))
                .with_recurse(RecurseModifier::new(RecurseTarget::All).with_iterations(2))
                .unwrap(),
        ]);
        let compiled = scene.compile().unwrap();
        let source = ShaderSource::assemble(DEFAULT_TEMPLATE, &compiled, &ShaderOptions::default()).unwrap();

        assert_eq!(source.slot(FUNCTION), Some("return hlp0(pos);\n"));
        assert!(source.slot(HELPERS).unwrap().starts_with("inline float hlp0(float3 pos) {"));
        assert!(source.slot(PARAMETERS).unwrap().contains("float4 par2;"));
        assert!(source.slot(OPTIONS).unwrap().contains("USE_RAYMARCHING_DEPTH"));
    }

    #[test]
    fn test_refill_replaces_previous_content() {
        let mut source = ShaderSource::new("Test", DEFAULT_TEMPLATE).unwrap();
        let a = Scene::new(vec![Node::shape(Primitive::Sphere)]).compile().unwrap();
        let b = Scene::new(vec![Node::shape(Primitive::Box)]).compile().unwrap();

        source.fill(&a, &ShaderOptions::default()).unwrap();
        source.fill(&b, &ShaderOptions::default()).unwrap();
        let function = source.slot(FUNCTION).unwrap();
        assert!(function.contains("Box("));
        assert!(!function.contains("Sphere("));
    }

    #[test]
    fn test_missing_marker() {
        assert_eq!(
            ShaderSource::new("x", "// \"@name\""),
            Err(ShaderError::MissingMarker(OPTIONS))
        );
        assert_eq!(ShaderSource::new("x", ""), Err(ShaderError::MissingMarker(NAME)));
    }

    #[test]
    fn test_signature_ignores_values() {
        let mut signature = StructureSignature::default();
        let mut scene = Scene::new(vec![Node::shape(Primitive::Sphere)]);
        assert!(signature.update(scene.roots()));
        assert!(!signature.update(scene.roots()));

        scene.edit(|roots| roots[0].set_param("radius", 3.0)).unwrap();
        assert!(!signature.update(scene.roots()));

        scene.edit(|roots| roots[0].enabled = false);
        assert!(signature.update(scene.roots()));

        scene.edit(|roots| {
            roots[0].enabled = true;
            roots[0].modifiers_mut().push(Modifier::new(ModifierKind::Twist));
        });
        assert!(signature.update(scene.roots()));
    }
}
