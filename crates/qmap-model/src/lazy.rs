//! Deferred sequences.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{Reflect, Value, ValueError};

/// One deferred stage: maps an upstream element, or drops it with `Ok(None)`.
pub type LazyStep = Arc<dyn Fn(&Value) -> Result<Option<Value>, ValueError> + Send + Sync>;

/// A sequence whose stages run only when it is iterated.
///
/// Cloning is cheap; the upstream elements are shared. Every iteration
/// re-runs the stages, so a lazy sequence is consumed as often as it is read.
#[derive(Clone)]
pub struct LazySeq {
    upstream: Upstream,
    step: Option<LazyStep>,
}

#[derive(Clone)]
enum Upstream {
    Items(Arc<[Value]>),
    Chained(Box<LazySeq>),
}

impl LazySeq {
    pub fn from_items(items: Vec<Value>) -> Self {
        Self {
            upstream: Upstream::Items(items.into()),
            step: None,
        }
    }

    pub fn empty() -> Self {
        Self::from_items(Vec::new())
    }

    /// Append a stage.
    #[must_use]
    pub fn filter_map(self, step: LazyStep) -> Self {
        if self.step.is_none() {
            return Self {
                upstream: self.upstream,
                step: Some(step),
            };
        }
        Self {
            upstream: Upstream::Chained(Box::new(self)),
            step: Some(step),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Result<Value, ValueError>> + '_> {
        let upstream: Box<dyn Iterator<Item = Result<Value, ValueError>> + '_> =
            match &self.upstream {
                Upstream::Items(items) => Box::new(items.iter().cloned().map(Ok)),
                Upstream::Chained(inner) => inner.iter(),
            };
        match &self.step {
            None => upstream,
            Some(step) => Box::new(upstream.filter_map(move |item| match item {
                Ok(value) => step(&value).transpose(),
                Err(err) => Some(Err(err)),
            })),
        }
    }

    /// Run every stage and collect the results.
    pub fn force(&self) -> Result<Vec<Value>, ValueError> {
        self.iter().collect()
    }
}

impl Default for LazySeq {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for LazySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stages = usize::from(self.step.is_some());
        let mut upstream = &self.upstream;
        while let Upstream::Chained(inner) = upstream {
            stages += usize::from(inner.step.is_some());
            upstream = &inner.upstream;
        }
        let len = match upstream {
            Upstream::Items(items) => items.len(),
            Upstream::Chained(_) => 0,
        };
        f.debug_struct("LazySeq")
            .field("upstream_len", &len)
            .field("stages", &stages)
            .finish()
    }
}

/// Typed view over a [`LazySeq`], the Rust shape of a lazy sequence member.
pub struct Lazy<T> {
    seq: LazySeq,
    _element: PhantomData<fn() -> T>,
}

impl<T: Reflect> Lazy<T> {
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_seq(LazySeq::from_items(
            items.iter().map(Reflect::to_value).collect(),
        ))
    }

    pub fn from_seq(seq: LazySeq) -> Self {
        Self {
            seq,
            _element: PhantomData,
        }
    }

    pub fn as_seq(&self) -> &LazySeq {
        &self.seq
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<T, ValueError>> + '_ {
        self.seq.iter().map(|item| item.and_then(T::from_value))
    }

    pub fn to_vec(&self) -> Result<Vec<T>, ValueError> {
        self.iter().collect()
    }
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq.clone(),
            _element: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Lazy").field(&self.seq).finish()
    }
}
