//! Cross-thread scene handle
//!
//! Many readers compile or sample concurrently; an edit takes the write lock,
//! runs, and re-assigns identifiers before the lock is released, so no reader
//! ever sees a half-laid-out tree.

use crate::codegen::Compiled;
use crate::cpu_eval::Sdf;
use crate::driver::Scene;
use crate::error::CompileError;
use crate::node::Node;
use crate::param::ParameterSink;
use glam::Vec3;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SharedScene {
    inner: Arc<RwLock<Scene>>,
}

impl SharedScene {
    pub fn new(scene: Scene) -> Self {
        Self {
            inner: Arc::new(RwLock::new(scene)),
        }
    }

    /// Run `f` with exclusive access to the roots.
    pub fn edit<R>(&self, f: impl FnOnce(&mut Vec<Node>) -> R) -> R {
        self.inner.write().edit(f)
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&Scene) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn compile(&self) -> Result<Compiled, CompileError> {
        self.inner.read().compile()
    }

    pub fn evaluate(&self, p: Vec3) -> f32 {
        self.inner.read().evaluate(p)
    }

    pub fn evaluate_many(&self, points: &[Vec3]) -> Vec<f32> {
        self.inner.read().evaluate_many(points)
    }

    pub fn bind_parameters(&self, sink: &mut impl ParameterSink) {
        self.inner.read().bind_parameters(sink);
    }

    /// Copy of the current scene
    pub fn snapshot(&self) -> Scene {
        self.inner.read().clone()
    }
}

impl Sdf for SharedScene {
    fn distance(&self, p: Vec3) -> f32 {
        self.evaluate(p)
    }
}
