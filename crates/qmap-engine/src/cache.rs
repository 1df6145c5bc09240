//! Compiled transformations and the per-mapper cache that owns them.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};

use qmap_model::{Value, ValueError};

use crate::exec::Program;
use crate::{Binding, Expr, TypePair, Var};

/// A compiled mapping for one type pair: the IR it was built from plus an
/// executable program. Immutable and shareable across threads.
pub struct Transformation {
    pair: TypePair,
    body: Expr,
    program: Program,
}

impl Transformation {
    pub(crate) fn new(pair: TypePair, body: Expr, program: Program) -> Self {
        Self {
            pair,
            body,
            program,
        }
    }

    pub fn pair(&self) -> &TypePair {
        &self.pair
    }

    /// The construction expression over [`Var::SOURCE`].
    pub fn body(&self) -> &Expr {
        &self.body
    }

    /// Constructor used to create destination instances, if any.
    pub fn constructor(&self) -> Option<&str> {
        match &self.body {
            Expr::Construct { constructor, .. } => constructor.as_deref(),
            _ => None,
        }
    }

    pub fn constructor_args(&self) -> &[Expr] {
        match &self.body {
            Expr::Construct { args, .. } => args,
            _ => &[],
        }
    }

    /// Member assignments applied after construction, in order.
    pub fn bindings(&self) -> &[Binding] {
        match &self.body {
            Expr::Construct { bindings, .. } => bindings,
            _ => &[],
        }
    }

    /// Run on one source instance. A null source maps to null.
    pub fn apply(&self, source: &Value) -> Result<Value, ValueError> {
        if source.is_null() {
            return Ok(Value::Null);
        }
        (self.program)(Var::SOURCE, source)
    }
}

impl fmt::Debug for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformation")
            .field("pair", &self.pair)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Cache entry; created before its transformation so recursive pairs can
/// refer to it while it is still compiling.
pub(crate) struct Slot {
    pair: TypePair,
    compiled: OnceLock<Arc<Transformation>>,
}

impl Slot {
    pub(crate) fn pair(&self) -> &TypePair {
        &self.pair
    }

    pub(crate) fn get(&self) -> Option<&Arc<Transformation>> {
        self.compiled.get()
    }

    pub(crate) fn fill(&self, transformation: Arc<Transformation>) -> Arc<Transformation> {
        Arc::clone(self.compiled.get_or_init(|| transformation))
    }
}

/// Transformations keyed by type pair.
///
/// Lookups take a read lock; compilation is serialized by `compile_lock`
/// so each pair compiles at most once.
pub(crate) struct TransformationCache {
    slots: RwLock<HashMap<TypePair, Arc<Slot>>>,
    compile_lock: Mutex<()>,
    next_var: AtomicU32,
}

impl TransformationCache {
    pub(crate) fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            compile_lock: Mutex::new(()),
            next_var: AtomicU32::new(Var::SOURCE.id() + 1),
        }
    }

    pub(crate) fn compiled(&self, pair: &TypePair) -> Option<Arc<Transformation>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(pair).and_then(|slot| slot.get().cloned())
    }

    pub(crate) fn compiled_count(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.get().is_some()).count()
    }

    /// Existing slot for `pair`, or a new empty one recorded in `created`.
    pub(crate) fn slot(&self, pair: &TypePair, created: &mut Vec<TypePair>) -> Arc<Slot> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(pair.clone()).or_insert_with(|| {
            created.push(pair.clone());
            Arc::new(Slot {
                pair: pair.clone(),
                compiled: OnceLock::new(),
            })
        }))
    }

    /// Drop slots created by a failed compilation.
    pub(crate) fn discard(&self, created: &[TypePair]) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        for pair in created {
            slots.remove(pair);
        }
    }

    pub(crate) fn lock_compilation(&self) -> MutexGuard<'_, ()> {
        self.compile_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn fresh_var(&self) -> Var {
        Var::element(self.next_var.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for TransformationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformationCache")
            .field("compiled", &self.compiled_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_created_once_and_discardable() {
        let cache = TransformationCache::new();
        let pair = TypePair::new("Person", "PersonDto");
        let mut created = Vec::new();
        let first = cache.slot(&pair, &mut created);
        let second = cache.slot(&pair, &mut created);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(created, vec![pair.clone()]);
        assert_eq!(first.pair(), &pair);

        cache.discard(&created);
        let mut again = Vec::new();
        let third = cache.slot(&pair, &mut again);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.compiled_count(), 0);
    }

    #[test]
    fn element_variables_are_unique() {
        let cache = TransformationCache::new();
        let a = cache.fresh_var();
        let b = cache.fresh_var();
        assert_ne!(a, b);
        assert_ne!(a, Var::SOURCE);
    }
}
