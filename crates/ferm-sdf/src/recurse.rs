//! Recurse modifier and the modifier stack
//!
//! A node owns a [`ModifierStack`]: plain modifiers in attachment order, plus
//! at most one [`RecurseModifier`]. The recurse entry splits the active
//! modifiers into three groups:
//!
//! | target   | iterated (targeted)      | outside the loop          | inside the loop          |
//! |----------|--------------------------|---------------------------|--------------------------|
//! | `All`    | every active modifier    |                           |                          |
//! | `Before` | attached before recurse  | attached after (`outer`)  |                          |
//! | `After`  | attached after recurse   |                           | attached before (`inner`)|
//!
//! Numerically the composition is
//! `outer.post ∘ targeted.postⁿ ∘ inner.post ∘ f ∘ inner.pre ∘ targeted.preⁿ ∘ outer.pre`.
//! Inside the loop the targeted post transforms see the final recursed
//! position.

use crate::error::{ParamError, StackError};
use crate::geometry::Geometry;
use crate::modifier::{Modifier, apply_numeric};
use crate::param::{ParamTemplate, ParamValue, Parameter, ParamsExt, identifier, set_by_name, uniquate};
use glam::Vec3;

static ITERATIONS: [ParamTemplate; 1] = [ParamTemplate::int("Iterations", 1)];

/// Which sibling modifiers a recurse modifier iterates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecurseTarget {
    #[default]
    All,
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurseModifier {
    target: RecurseTarget,
    params: Vec<Parameter>,
    helper: Option<String>,
    pub enabled: bool,
}

impl RecurseModifier {
    pub fn new(target: RecurseTarget) -> Self {
        let (params, _) = uniquate(&ITERATIONS, &[]);
        Self {
            target,
            params,
            helper: None,
            enabled: true,
        }
    }

    /// Builder setting the iteration count
    pub fn with_iterations(mut self, n: i32) -> Self {
        // Single Int slot; the write cannot mismatch
        let _ = self.params[0].set_value(n);
        self
    }

    pub fn target(&self) -> RecurseTarget {
        self.target
    }

    pub fn set_target(&mut self, target: RecurseTarget) {
        self.target = target;
    }

    /// Loop count; negative counts run zero times.
    pub fn iterations(&self) -> usize {
        usize::try_from(self.params.int(0)).unwrap_or(0)
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut [Parameter] {
        &mut self.params
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<(), ParamError> {
        set_by_name(&mut self.params, name, value)
    }

    /// Name of the generated helper function, once assigned
    pub fn helper_name(&self) -> Option<&str> {
        self.helper.as_deref()
    }

    pub(crate) fn assign_helper(&mut self, index: usize, count: usize) {
        self.helper = Some(identifier("hlp", index, count));
    }

    pub(crate) fn clear_helper(&mut self) {
        self.helper = None;
    }
}

/// One entry of a modifier stack
#[derive(Debug, Clone, PartialEq)]
pub enum StackEntry {
    Modifier(Modifier),
    Recurse(RecurseModifier),
}

impl StackEntry {
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Modifier(m) => m.enabled,
            Self::Recurse(r) => r.enabled,
        }
    }
}

/// Modifiers split around the active recurse modifier
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub outer: Vec<&'a Modifier>,
    pub targeted: Vec<&'a Modifier>,
    pub inner: Vec<&'a Modifier>,
    pub recurse: Option<&'a RecurseModifier>,
}

impl Partition<'_> {
    /// Numeric composition around `f`
    pub fn evaluate(&self, p: Vec3, f: impl FnOnce(Vec3) -> f32) -> f32 {
        let Some(recurse) = self.recurse else {
            return apply_numeric(&self.inner, p, f);
        };
        let n = recurse.iterations();

        apply_numeric(&self.outer, p, |q| {
            let mut q = q;
            for _ in 0..n {
                q = self.targeted.iter().rev().fold(q, |q, m| m.pre(q));
            }
            let mut value = apply_numeric(&self.inner, q, f);
            for _ in 0..n {
                value = self.targeted.iter().fold(value, |v, m| m.post(v, q));
            }
            value
        })
    }
}

/// Ordered modifiers of one node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModifierStack {
    entries: Vec<StackEntry>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: Modifier) {
        self.entries.push(StackEntry::Modifier(modifier));
    }

    /// Attach the recurse modifier at the current end of the stack.
    pub fn push_recurse(&mut self, recurse: RecurseModifier) -> Result<(), StackError> {
        if self.recurse().is_some() {
            return Err(StackError::RecurseAlreadyAttached);
        }
        self.entries.push(StackEntry::Recurse(recurse));
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<StackEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [StackEntry] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `index`-th plain modifier, counting only plain modifiers
    pub fn modifier_mut(&mut self, index: usize) -> Option<&mut Modifier> {
        self.entries
            .iter_mut()
            .filter_map(|e| match e {
                StackEntry::Modifier(m) => Some(m),
                StackEntry::Recurse(_) => None,
            })
            .nth(index)
    }

    pub fn recurse(&self) -> Option<&RecurseModifier> {
        self.entries.iter().find_map(|e| match e {
            StackEntry::Recurse(r) => Some(r),
            StackEntry::Modifier(_) => None,
        })
    }

    pub fn recurse_mut(&mut self) -> Option<&mut RecurseModifier> {
        self.entries.iter_mut().find_map(|e| match e {
            StackEntry::Recurse(r) => Some(r),
            StackEntry::Modifier(_) => None,
        })
    }

    /// Split the active modifiers around the active recurse modifier.
    ///
    /// Without an active recurse modifier every active modifier is `inner`.
    pub fn partition(&self) -> Partition<'_> {
        let mut partition = Partition::default();
        let mut seen_recurse = false;

        let active_recurse = self.recurse().filter(|r| r.enabled);
        partition.recurse = active_recurse;

        for entry in self.entries.iter().filter(|e| e.is_enabled()) {
            let modifier = match entry {
                StackEntry::Recurse(_) => {
                    seen_recurse = true;
                    continue;
                }
                StackEntry::Modifier(m) => m,
            };
            let Some(recurse) = active_recurse else {
                partition.inner.push(modifier);
                continue;
            };
            let group = match (recurse.target, seen_recurse) {
                (RecurseTarget::All, _) | (RecurseTarget::Before, false) | (RecurseTarget::After, true) => {
                    &mut partition.targeted
                }
                (RecurseTarget::Before, true) => &mut partition.outer,
                (RecurseTarget::After, false) => &mut partition.inner,
            };
            group.push(modifier);
        }
        partition
    }

    /// Geometry of `base` after every active entry of the stack
    pub fn geometry(&self, base: Geometry) -> Geometry {
        let modified = self
            .entries
            .iter()
            .filter_map(|e| match e {
                StackEntry::Modifier(m) if m.enabled => Some(m.geometry()),
                _ => None,
            })
            .fold(base, Geometry::modified_by);

        match self.recurse() {
            Some(r) if r.enabled => modified.recursed(),
            _ => modified,
        }
    }
}
