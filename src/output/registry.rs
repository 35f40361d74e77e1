//! The output registry: a concurrent collection of destinations with fan-out
//! semantics.
//!
//! The registry is an explicit value owned by the spout and passed by
//! reference into the workers, so independent spouts (e.g. in tests) never
//! share destination state. Structural changes (register/unregister) take the
//! exclusive lock; traversals (`for_all`, `write`) take the shared lock, so a
//! write never races with a concurrent deactivation of the same destination.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::output::{combine_errors, Output, OutputError, OutputId, OutputKind};

type OutputMap = HashMap<OutputKind, HashMap<OutputId, Arc<dyn Output>>>;

#[derive(Default)]
pub struct Registry {
    outputs: RwLock<OutputMap>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of registered outputs across all kinds.
    pub async fn size(&self) -> usize {
        let guard = self.outputs.read().await;
        guard.values().map(HashMap::len).sum()
    }

    /// Register a destination. Registration never implicitly activates;
    /// activation is the caller's responsibility. Fails with
    /// [`OutputError::Duplicate`] when an output with the same computed
    /// identity already exists under that kind.
    pub async fn register(&self, output: Arc<dyn Output>) -> Result<(), OutputError> {
        let id = output.id();
        let kind = output.kind();

        let mut guard = self.outputs.write().await;
        let by_id = guard.entry(kind).or_default();
        if by_id.contains_key(&id) {
            return Err(OutputError::Duplicate(id));
        }

        debug!(%id, %kind, "registering output");
        by_id.insert(id, output);
        Ok(())
    }

    /// Deactivate and remove a destination. Fails with
    /// [`OutputError::NotFound`] when absent. A deactivation failure is
    /// returned without removing the entry, so the close can be retried.
    pub async fn unregister(&self, output: &dyn Output) -> Result<(), OutputError> {
        let id = output.id();
        let kind = output.kind();

        let mut guard = self.outputs.write().await;
        let registered = guard
            .get(&kind)
            .and_then(|by_id| by_id.get(&id))
            .cloned()
            .ok_or_else(|| OutputError::NotFound(id.clone()))?;

        registered.deactivate().await?;

        debug!(%id, %kind, "unregistering output");
        if let Some(by_id) = guard.get_mut(&kind) {
            by_id.remove(&id);
            if by_id.is_empty() {
                guard.remove(&kind);
            }
        }
        Ok(())
    }

    /// Look up a destination by identity.
    pub async fn get(&self, id: &OutputId) -> Result<Arc<dyn Output>, OutputError> {
        let guard = self.outputs.read().await;
        guard
            .values()
            .find_map(|by_id| by_id.get(id))
            .cloned()
            .ok_or_else(|| OutputError::NotFound(id.clone()))
    }

    /// Apply an operation to every registered output matching the predicate.
    /// Individual failures are collected and folded into one combined error
    /// instead of failing fast, so one bad destination does not block the
    /// healthy ones.
    pub async fn for_each<F, Fut, P>(&self, apply: F, predicate: P) -> Result<(), OutputError>
    where
        F: Fn(Arc<dyn Output>) -> Fut,
        Fut: Future<Output = Result<(), OutputError>>,
        P: Fn(&dyn Output) -> bool,
    {
        let guard = self.outputs.read().await;
        if guard.is_empty() {
            return Err(OutputError::EmptyRegistry);
        }

        let mut errs = Vec::new();
        for by_id in guard.values() {
            for output in by_id.values() {
                if !predicate(output.as_ref()) {
                    continue;
                }
                if let Err(e) = apply(Arc::clone(output)).await {
                    errs.push(e);
                }
            }
        }
        combine_errors(errs)
    }

    /// Apply an operation to every registered output.
    pub async fn for_all<F, Fut>(&self, apply: F) -> Result<(), OutputError>
    where
        F: Fn(Arc<dyn Output>) -> Fut,
        Fut: Future<Output = Result<(), OutputError>>,
    {
        self.for_each(apply, |_| true).await
    }

    /// Fan one rendered event out to every registered output.
    pub async fn write(&self, payload: &[u8]) -> Result<(), OutputError> {
        self.for_all(|output| async move {
            let n = output.write(payload).await?;
            debug!(id = %output.id(), bytes = n, "wrote event");
            Ok(())
        })
        .await
    }
}
